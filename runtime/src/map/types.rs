//! Typed records for the four administrative levels and the maps built from them.
//!
//! Field names on the wire are fixed by the upstream API (`talukNamee`,
//! `hoblicode`, ...). Each record keeps the object it was decoded from,
//! keys in arrival order, and serializes back to exactly that object; the
//! code and name are validated on decode and exposed through accessors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;

/// A level code as the API sent it: either a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Code {
    Text(String),
    Number(Number),
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Text(s) => f.write_str(s),
            Code::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Code {
    fn from(s: &str) -> Self {
        Code::Text(s.to_string())
    }
}

impl From<Code> for Value {
    fn from(code: Code) -> Self {
        match code {
            Code::Text(s) => Value::String(s),
            Code::Number(n) => Value::Number(n),
        }
    }
}

/// An upstream record without the fields its level requires.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("`{0}` is missing or not a string or number")]
    Code(&'static str),
    #[error("`{0}` is missing or not a string")]
    Name(&'static str),
}

fn code_field(fields: &Map<String, Value>, key: &'static str) -> Result<Code, RecordError> {
    match fields.get(key) {
        Some(Value::String(s)) => Ok(Code::Text(s.clone())),
        Some(Value::Number(n)) => Ok(Code::Number(n.clone())),
        _ => Err(RecordError::Code(key)),
    }
}

fn name_field(fields: &Map<String, Value>, key: &'static str) -> Result<String, RecordError> {
    match fields.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(RecordError::Name(key)),
    }
}

/// A district from the fixed enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct District {
    pub code: String,
    pub name: String,
}

impl District {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

/// A taluka record returned by `GetTalukaAsync`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Taluka {
    code: Code,
    name: String,
    fields: Map<String, Value>,
}

impl Taluka {
    pub const CODE_FIELD: &'static str = "talukCode";
    pub const NAME_FIELD: &'static str = "talukNamee";

    pub fn new(code: impl Into<Code>, name: &str) -> Self {
        let code = code.into();
        let mut fields = Map::new();
        fields.insert(Self::CODE_FIELD.into(), code.clone().into());
        fields.insert(Self::NAME_FIELD.into(), Value::String(name.to_string()));
        Self {
            code,
            name: name.to_string(),
            fields,
        }
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full upstream object.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Map<String, Value>> for Taluka {
    type Error = RecordError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            code: code_field(&fields, Self::CODE_FIELD)?,
            name: name_field(&fields, Self::NAME_FIELD)?,
            fields,
        })
    }
}

impl Serialize for Taluka {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// A hobli record returned by `GetHobliAsync`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Hobli {
    code: Code,
    name: String,
    fields: Map<String, Value>,
}

impl Hobli {
    pub const CODE_FIELD: &'static str = "hoblicode";
    pub const NAME_FIELD: &'static str = "hoblinamee";

    pub fn new(code: impl Into<Code>, name: &str) -> Self {
        let code = code.into();
        let mut fields = Map::new();
        fields.insert(Self::CODE_FIELD.into(), code.clone().into());
        fields.insert(Self::NAME_FIELD.into(), Value::String(name.to_string()));
        Self {
            code,
            name: name.to_string(),
            fields,
        }
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Map<String, Value>> for Hobli {
    type Error = RecordError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            code: code_field(&fields, Self::CODE_FIELD)?,
            name: name_field(&fields, Self::NAME_FIELD)?,
            fields,
        })
    }
}

impl Serialize for Hobli {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// A village record returned by `GetVillageAsync`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Village {
    name: String,
    fields: Map<String, Value>,
}

impl Village {
    pub const NAME_FIELD: &'static str = "villageName";

    pub fn new(name: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(Self::NAME_FIELD.into(), Value::String(name.to_string()));
        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Map<String, Value>> for Village {
    type Error = RecordError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            name: name_field(&fields, Self::NAME_FIELD)?,
            fields,
        })
    }
}

impl Serialize for Village {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// A record that is both fetched by code and joined by name downstream.
pub trait Coded {
    fn code(&self) -> &Code;
    fn name(&self) -> &str;
}

impl Coded for Taluka {
    fn code(&self) -> &Code {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Coded for Hobli {
    fn code(&self) -> &Code {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// District name -> talukas, in district enumeration order.
pub type DistrictTalukas = IndexMap<String, Vec<Taluka>>;

/// Taluka name -> hoblis.
pub type TalukHoblis = IndexMap<String, Vec<Hobli>>;

/// Hobli name -> villages.
pub type HobliVillages = IndexMap<String, Vec<Village>>;

/// One row of the reverse mapping: a village and every ancestor above it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VillageRecord {
    pub village: String,
    #[serde(rename = "hoblinamee")]
    pub hobli: String,
    #[serde(rename = "talukNamee")]
    pub taluka: String,
    #[serde(rename = "districtNamee")]
    pub district: String,
}

/// Flat reverse mapping in first-discovery order.
pub type VillageMapping = Vec<VillageRecord>;
