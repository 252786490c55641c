//! Code -> name indexing between fetch stages.
//!
//! Each stage fetches children per *code* but stores them per *name*. The
//! index built here is the first of those two steps: it collapses every
//! record reachable from the previous stage into one entry per code, so a
//! code listed under two parents is fetched once.

use crate::map::types::Coded;
use indexmap::IndexMap;
use tracing::warn;

/// Deduplicated code -> name index in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeIndex {
    entries: IndexMap<String, String>,
}

impl CodeIndex {
    /// Build an index from every record under every parent.
    ///
    /// On a code collision the later name wins but the entry keeps the
    /// position of the first occurrence. Names are the downstream join key,
    /// so a name claimed by two different codes is reported.
    pub fn build<'a, T, I>(level: &str, records: I) -> Self
    where
        T: Coded + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut entries: IndexMap<String, String> = IndexMap::new();
        let mut owners: IndexMap<String, String> = IndexMap::new();

        for record in records {
            let code = record.code().to_string();
            let name = record.name().to_string();

            if let Some(previous) = entries.get(&code) {
                if *previous != name {
                    warn!(
                        level, %code, previous = %previous, current = %name,
                        "code maps to two names; keeping the later one"
                    );
                }
            }
            if let Some(owner) = owners.get(&name) {
                if *owner != code {
                    warn!(
                        level, %name, first = %owner, second = %code,
                        "name shared by two codes; their children will merge"
                    );
                }
            } else {
                owners.insert(name.clone(), code.clone());
            }

            entries.insert(code, name);
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(code, name)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::types::Taluka;

    fn taluka(code: &str, name: &str) -> Taluka {
        Taluka::new(code, name)
    }

    #[test]
    fn test_dedup_by_code() {
        let a = vec![taluka("T1", "Anekal"), taluka("T2", "Hoskote")];
        let b = vec![taluka("T1", "Anekal"), taluka("T3", "Devanahalli")];

        let index = CodeIndex::build("taluka", a.iter().chain(b.iter()));
        let pairs: Vec<_> = index.iter().collect();
        assert_eq!(
            pairs,
            vec![("T1", "Anekal"), ("T2", "Hoskote"), ("T3", "Devanahalli")]
        );
    }

    #[test]
    fn test_code_collision_last_writer_wins_first_position() {
        let records = vec![
            taluka("T1", "Old"),
            taluka("T2", "Other"),
            taluka("T1", "New"),
        ];

        let index = CodeIndex::build("taluka", &records);
        let pairs: Vec<_> = index.iter().collect();
        assert_eq!(pairs, vec![("T1", "New"), ("T2", "Other")]);
    }

    #[test]
    fn test_empty() {
        let records: Vec<Taluka> = Vec::new();
        let index = CodeIndex::build("taluka", &records);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }
}
