//! Hash-to-path dictionaries
//!
//! Unpacking recovers file names by looking archive hashes up in a
//! dictionary of known paths. Dictionaries are loaded from line-oriented
//! text files; a multi-dictionary file separates groups with `#` lines.

use crate::error::HashError;
use crate::hasher::{hash_path, normalize_path};
use crate::Result;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// A collision-checked reverse map from path hash to normalized path.
///
/// Insertion order is preserved for [`values`][Self::values] and
/// [`hashes`][Self::hashes] so a loaded dictionary can be written back out
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct HashDictionary {
    bit64: bool,
    entries: BTreeMap<u64, String>,
    order: Vec<u64>,
}

impl HashDictionary {
    /// Create an empty dictionary for the given hash width.
    pub fn new(bit64: bool) -> Self {
        Self {
            bit64,
            entries: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    /// Load a dictionary from a file with one path per line.
    ///
    /// Blank lines are ignored. A single colliding or duplicate line aborts
    /// the whole load.
    pub fn from_path(path: &Path, bit64: bool) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut dictionary = Self::new(bit64);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            dictionary.add(&line)?;
        }
        debug!("Loaded {} dictionary entries from {:?}", dictionary.len(), path);
        Ok(dictionary)
    }

    /// Load a multi-dictionary file.
    ///
    /// Every line starting with `terminator` opens a new sub-dictionary;
    /// blank lines are ignored; all other lines are added to the current
    /// sub-dictionary.
    pub fn from_multi(path: &Path, bit64: bool, terminator: &str) -> Result<Vec<Self>> {
        let reader = BufReader::new(File::open(path)?);
        let mut groups = Vec::new();
        let mut current = Self::new(bit64);
        for line in reader.lines() {
            let line = line?;
            if line.starts_with(terminator) {
                if !current.is_empty() {
                    groups.push(current);
                }
                current = Self::new(bit64);
            } else if !line.trim().is_empty() {
                current.add(&line)?;
            }
        }
        if !current.is_empty() {
            groups.push(current);
        }
        debug!("Loaded {} dictionary groups from {:?}", groups.len(), path);
        Ok(groups)
    }

    /// Whether this dictionary hashes with the 64-bit polynomial.
    pub fn bit64(&self) -> bool {
        self.bit64
    }

    /// Add a path, rejecting duplicates and hash collisions.
    pub fn add(&mut self, path: &str) -> Result<()> {
        let normalized = normalize_path(path);
        let hash = hash_path(&normalized, self.bit64);
        if let Some(existing) = self.entries.get(&hash) {
            if *existing == normalized {
                return Err(HashError::DuplicateValue(normalized));
            }
            return Err(HashError::HashCollision {
                hash,
                existing: existing.clone(),
                candidate: normalized,
            });
        }
        self.entries.insert(hash, normalized);
        self.order.push(hash);
        Ok(())
    }

    /// Add a path, returning whether it was inserted.
    pub fn try_add(&mut self, path: &str) -> bool {
        self.add(path).is_ok()
    }

    /// Remove the entry with the given hash.
    pub fn remove_by_hash(&mut self, hash: u64) -> Option<String> {
        let removed = self.entries.remove(&hash);
        if removed.is_some() {
            self.order.retain(|&h| h != hash);
        }
        removed
    }

    /// Remove the entry with the given path.
    pub fn remove_by_path(&mut self, path: &str) -> Option<String> {
        let hash = hash_path(path, self.bit64);
        match self.entries.get(&hash) {
            Some(existing) if *existing == normalize_path(path) => self.remove_by_hash(hash),
            _ => None,
        }
    }

    /// Whether an entry exists for the given hash.
    pub fn contains_hash(&self, hash: u64) -> bool {
        self.entries.contains_key(&hash)
    }

    /// Whether the given path is present.
    pub fn contains_path(&self, path: &str) -> bool {
        let hash = hash_path(path, self.bit64);
        self.entries
            .get(&hash)
            .is_some_and(|existing| *existing == normalize_path(path))
    }

    /// Look up the path for a hash.
    pub fn get(&self, hash: u64) -> Option<&str> {
        self.entries.get(&hash).map(|s| s.as_str())
    }

    /// All paths in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|hash| self.entries[hash].as_str())
    }

    /// All hashes in insertion order.
    pub fn hashes(&self) -> impl Iterator<Item = u64> + '_ {
        self.order.iter().copied()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether two paths would occupy the same slot.
    ///
    /// Paths that normalize to the same string trivially do; distinct paths
    /// collide iff their hashes are equal.
    pub fn collides(&self, a: &str, b: &str) -> bool {
        if normalize_path(a) == normalize_path(b) {
            return true;
        }
        hash_path(a, self.bit64) == hash_path(b, self.bit64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_add_then_get() {
        let mut dictionary = HashDictionary::new(false);
        dictionary.add("/chr/c0000.bnd").unwrap();
        let hash = hash_path("/chr/c0000.bnd", false);
        assert_eq!(dictionary.get(hash), Some("/chr/c0000.bnd"));
        assert!(dictionary.contains_hash(hash));
        assert!(dictionary.contains_path("CHR\\c0000.BND"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut dictionary = HashDictionary::new(false);
        dictionary.add("/a/b").unwrap();
        let err = dictionary.add("A\\B").unwrap_err();
        assert!(matches!(err, HashError::DuplicateValue(_)));
        assert_eq!(dictionary.len(), 1);
    }

    #[test]
    fn test_collision_rejected_without_mutation() {
        // With prime 37, the byte pairs ('a', 'b') and ('b', '=') fold to
        // the same value: 37*97 + 98 == 37*98 + 61. So "/ab" and "/b="
        // share a 32-bit hash.
        let target = hash_path("/ab", false);
        assert_eq!(target, hash_path("/b=", false));

        let mut dictionary = HashDictionary::new(false);
        dictionary.add("/ab").unwrap();
        let err = dictionary.add("/b=").unwrap_err();
        match &err {
            HashError::HashCollision {
                hash,
                existing,
                candidate,
            } => {
                assert_eq!(*hash, target);
                let message = err.to_string();
                assert!(message.contains(existing));
                assert!(message.contains(candidate));
            }
            other => panic!("expected HashCollision, got {other:?}"),
        }
        assert_eq!(dictionary.len(), 1);
        assert_eq!(dictionary.get(target), Some("/ab"));
    }

    #[test]
    fn test_try_add() {
        let mut dictionary = HashDictionary::new(true);
        assert!(dictionary.try_add("/a"));
        assert!(!dictionary.try_add("/a"));
        assert_eq!(dictionary.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut dictionary = HashDictionary::new(false);
        dictionary.add("/a").unwrap();
        dictionary.add("/b").unwrap();
        assert_eq!(dictionary.remove_by_path("/a"), Some("/a".to_string()));
        assert_eq!(dictionary.remove_by_path("/a"), None);
        let hash = hash_path("/b", false);
        assert_eq!(dictionary.remove_by_hash(hash), Some("/b".to_string()));
        assert!(dictionary.is_empty());
    }

    #[test]
    fn test_collides() {
        let dictionary = HashDictionary::new(false);
        assert!(dictionary.collides("/a/b", "A\\B"));
        assert!(!dictionary.collides("/a/b", "/a/c"));
    }

    #[test]
    fn test_from_path_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let lines = ["/chr/c0000.bnd", "/map/m10.msb", "/sound/main.fsb"];
        for line in &lines {
            writeln!(file, "{line}").unwrap();
        }
        writeln!(file).unwrap();
        file.flush().unwrap();

        let dictionary = HashDictionary::from_path(file.path(), false).unwrap();
        let values: Vec<&str> = dictionary.values().collect();
        assert_eq!(values, lines);
    }

    #[test]
    fn test_from_multi() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# group one").unwrap();
        writeln!(file, "/a").unwrap();
        writeln!(file, "/b").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "# group two").unwrap();
        writeln!(file, "/c").unwrap();
        file.flush().unwrap();

        let groups = HashDictionary::from_multi(file.path(), false, "#").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
        assert!(groups[1].contains_path("/c"));
    }
}
