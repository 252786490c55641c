//! Administrative hierarchy data model: typed level records, the nested maps
//! built by the fetch stages, and the code index that links stages together.

pub mod index;
pub mod types;
