//! Content digests of the output files for change detection.

use crate::store::OUTPUT_FILES;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::path::Path;

/// SHA-256 of a file's raw bytes as lowercase hex, or `None` if it does not exist.
pub fn file_digest(path: &Path) -> Result<Option<String>> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            Ok(Some(hex::encode(hasher.finalize())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to hash {}", path.display())),
    }
}

/// Digests of every tracked output file at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    digests: IndexMap<&'static str, Option<String>>,
}

impl Snapshot {
    /// Hash every output file under `dir`.
    pub fn capture(dir: &Path) -> Result<Self> {
        let mut digests = IndexMap::with_capacity(OUTPUT_FILES.len());
        for name in OUTPUT_FILES {
            digests.insert(name, file_digest(&dir.join(name))?);
        }
        Ok(Self { digests })
    }

    pub fn digest(&self, file: &str) -> Option<&str> {
        self.digests.get(file).and_then(|d| d.as_deref())
    }

    /// Files whose digest differs between `self` (before) and `after`.
    pub fn changed_files(&self, after: &Snapshot) -> Vec<&'static str> {
        OUTPUT_FILES
            .into_iter()
            .filter(|name| self.digests.get(name) != after.digests.get(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_of_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(file_digest(&dir.path().join("nope.json")).unwrap(), None);
    }

    #[test]
    fn test_digest_known_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remap.json");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            file_digest(&path).unwrap().as_deref(),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn test_identical_rewrite_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        for name in OUTPUT_FILES {
            std::fs::write(dir.path().join(name), b"[]").unwrap();
        }
        let before = Snapshot::capture(dir.path()).unwrap();
        for name in OUTPUT_FILES {
            std::fs::write(dir.path().join(name), b"[]").unwrap();
        }
        let after = Snapshot::capture(dir.path()).unwrap();

        assert!(before.changed_files(&after).is_empty());
    }

    #[test]
    fn test_each_file_detected_independently() {
        for target in OUTPUT_FILES {
            let dir = tempfile::tempdir().unwrap();
            for name in OUTPUT_FILES {
                std::fs::write(dir.path().join(name), b"{}").unwrap();
            }
            let before = Snapshot::capture(dir.path()).unwrap();
            std::fs::write(dir.path().join(target), b"{\"changed\": true}").unwrap();
            let after = Snapshot::capture(dir.path()).unwrap();

            assert_eq!(before.changed_files(&after), vec![target]);
        }
    }

    #[test]
    fn test_new_file_counts_as_change() {
        let dir = tempfile::tempdir().unwrap();
        let before = Snapshot::capture(dir.path()).unwrap();
        assert_eq!(before.digest("remap.json"), None);

        std::fs::write(dir.path().join("remap.json"), b"[]").unwrap();
        let after = Snapshot::capture(dir.path()).unwrap();
        assert_eq!(before.changed_files(&after), vec!["remap.json"]);
    }
}
