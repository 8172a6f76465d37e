//! In-memory archive model
//!
//! A [`Binder`] owns an ordered list of [`EntryHeader`]s plus the format
//! knobs packing and unpacking need. Entries are created either by
//! scanning a directory tree (pack side) or from a parsed BHD5 header
//! (unpack side); afterwards they are only mutated by selection.

use crate::check::ensure_directory;
use crate::error::ArchiveError;
use crate::Result;
use binder_crypto::EntryAesKey;
use binder_formats::bhd5::{Bhd5, ShaHash};
use binder_hash::{normalize_path, BucketInfo, HashDictionary};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory entries whose names could not be recovered are placed in.
pub const UNKNOWN_DIRECTORY: &str = "_unknown";

/// One archive entry.
///
/// At pack time `path` is the on-disk source path; at unpack time it is
/// the archive-internal path (or `_unknown/<hash>` when no dictionary
/// entry matched).
#[derive(Debug, Clone)]
pub struct EntryHeader {
    pub path: String,
    pub offset: i64,
    pub unpadded_size: i64,
    pub padded_size: i32,
    pub sha_hash: Option<ShaHash>,
    pub aes_key: Option<EntryAesKey>,
    pub name_is_hash: bool,
    pub ignore: bool,
}

impl EntryHeader {
    /// A pack-time entry for an on-disk file.
    pub fn from_file(path: &Path) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
            offset: 0,
            unpadded_size: 0,
            padded_size: 0,
            sha_hash: None,
            aes_key: None,
            name_is_hash: false,
            ignore: false,
        }
    }

    /// How many bytes to read for this entry. Encrypted entries are read
    /// at their padded length (the cipher covers the padding) as long as
    /// the padded length is not smaller than the unpadded one.
    pub fn read_length(&self) -> i64 {
        if self.aes_key.is_some() && self.padded_size as i64 >= self.unpadded_size {
            self.padded_size as i64
        } else {
            self.unpadded_size
        }
    }
}

/// An archive in memory.
#[derive(Debug, Clone)]
pub struct Binder {
    pub version: String,
    pub big_endian: bool,
    pub root_directory: PathBuf,
    pub bucket_info: Option<BucketInfo>,
    pub skip_unknown_files: bool,
    pub skip_existing_files: bool,
    pub entries: Vec<EntryHeader>,
}

impl Default for Binder {
    fn default() -> Self {
        Self {
            version: "07D7R6".to_string(),
            big_endian: false,
            root_directory: PathBuf::new(),
            bucket_info: None,
            skip_unknown_files: false,
            skip_existing_files: false,
            entries: Vec::new(),
        }
    }
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a binder over a list of on-disk files.
    pub fn from_files(
        root_directory: impl Into<PathBuf>,
        files: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        let mut binder = Self::new();
        binder.root_directory = root_directory.into();
        binder.entries = files
            .into_iter()
            .map(|path| EntryHeader::from_file(&path))
            .collect();
        binder
    }

    /// Build a binder by scanning a directory tree.
    pub fn from_directory(root_directory: &Path) -> Result<Self> {
        ensure_directory("root_directory", root_directory)?;
        let mut files = Vec::new();
        collect_files(root_directory, None, &mut files)?;
        debug!("Scanned {} files under {:?}", files.len(), root_directory);
        Ok(Self::from_files(root_directory, files))
    }

    /// Build a binder from a directory of named files plus a directory of
    /// hash-named files (the layout an earlier unpack produced). Entries
    /// from the second directory are flagged as hash-named.
    pub fn from_directories(files_directory: &Path, hashed_directory: &Path) -> Result<Self> {
        ensure_directory("files_directory", files_directory)?;
        ensure_directory("hashed_directory", hashed_directory)?;

        let mut files = Vec::new();
        collect_files(files_directory, Some(hashed_directory), &mut files)?;
        let mut binder = Self::from_files(files_directory, files);

        let mut hashed = Vec::new();
        collect_files(hashed_directory, None, &mut hashed)?;
        for path in hashed {
            let mut entry = EntryHeader::from_file(&path);
            entry.name_is_hash = true;
            binder.entries.push(entry);
        }
        Ok(binder)
    }

    /// Build a binder from a parsed BHD5 header, resolving entry names
    /// through a dictionary. Unresolved hashes materialize under
    /// `_unknown/<decimal hash>`.
    pub fn from_bhd5(header: &Bhd5, dictionary: Option<&HashDictionary>) -> Self {
        let mut binder = Self::new();
        binder.big_endian = header.big_endian;
        binder.entries = header
            .entries()
            .map(|entry| {
                let resolved = dictionary.and_then(|d| d.get(entry.path_hash));
                let (path, name_is_hash) = match resolved {
                    Some(path) => (path.to_string(), false),
                    None => (
                        format!("{UNKNOWN_DIRECTORY}/{}", entry.path_hash),
                        true,
                    ),
                };
                EntryHeader {
                    path,
                    offset: entry.offset,
                    unpadded_size: entry.unpadded_size,
                    padded_size: entry.padded_size,
                    sha_hash: entry.sha_hash.clone(),
                    aes_key: entry.aes_key.clone(),
                    name_is_hash,
                    ignore: false,
                }
            })
            .collect();
        debug!(
            "Resolved {}/{} entry names",
            binder.entries.iter().filter(|e| !e.name_is_hash).count(),
            binder.entries.len()
        );
        binder
    }

    /// Keep only the listed paths: every entry whose path is not in
    /// `selected` has its ignore flag set.
    pub fn set_selected<S: AsRef<str>>(&mut self, selected: &[S]) {
        let wanted: HashSet<String> = selected
            .iter()
            .map(|path| normalize_path(path.as_ref()))
            .collect();
        for entry in &mut self.entries {
            entry.ignore = !wanted.contains(&normalize_path(&entry.path));
        }
    }

    /// `true` if the binder has nothing to unpack: no entries, or every
    /// entry ignored.
    pub fn all_ignored(&self) -> bool {
        self.entries.iter().all(|entry| entry.ignore)
    }

    /// The archive-internal path of a pack-time entry: its on-disk path
    /// relative to the root directory, normalized.
    pub(crate) fn relative_archive_path(&self, entry: &EntryHeader) -> Result<String> {
        let path = Path::new(&entry.path);
        let relative = path
            .strip_prefix(&self.root_directory)
            .map_err(|_| ArchiveError::Rooted {
                param: "entry.path",
                path: path.to_path_buf(),
            })?;
        Ok(normalize_path(&relative.to_string_lossy()))
    }
}

/// Recursively collect regular files, sorted by name at each level so the
/// resulting entry order is stable across platforms.
fn collect_files(dir: &Path, skip: Option<&Path>, files: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut children: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    children.sort();
    for child in children {
        if skip.is_some_and(|s| child == s) {
            continue;
        }
        if child.is_dir() {
            collect_files(&child, skip, files)?;
        } else {
            files.push(child);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use binder_formats::bhd5::Bhd5Entry;
    use binder_formats::GameVersion;

    fn header_with_hashes(hashes: &[u64]) -> Bhd5 {
        let mut header = Bhd5::with_buckets(GameVersion::DarkSouls1, 1);
        for &hash in hashes {
            header.buckets[0].push(Bhd5Entry {
                path_hash: hash,
                padded_size: 16,
                unpadded_size: 16,
                offset: 0,
                sha_hash: None,
                aes_key: None,
            });
        }
        header
    }

    #[test]
    fn test_unknown_entries_use_decimal_hash_names() {
        let header = header_with_hashes(&[0x1234ABCD]);
        let binder = Binder::from_bhd5(&header, None);
        assert_eq!(binder.entries[0].path, "_unknown/305441741");
        assert!(binder.entries[0].name_is_hash);
    }

    #[test]
    fn test_dictionary_resolves_names() {
        let mut dictionary = HashDictionary::new(false);
        dictionary.add("/chr/c0000.bnd").unwrap();
        let hash = binder_hash::hash_path("/chr/c0000.bnd", false);

        let header = header_with_hashes(&[hash, 42]);
        let binder = Binder::from_bhd5(&header, Some(&dictionary));
        assert_eq!(binder.entries[0].path, "/chr/c0000.bnd");
        assert!(!binder.entries[0].name_is_hash);
        assert_eq!(binder.entries[1].path, "_unknown/42");
        assert!(binder.entries[1].name_is_hash);
    }

    #[test]
    fn test_set_selected() {
        let header = header_with_hashes(&[1, 2]);
        let mut binder = Binder::from_bhd5(&header, None);
        binder.entries[0].path = "/a".into();
        binder.entries[1].path = "/b".into();

        binder.set_selected(&["/B"]);
        assert!(binder.entries[0].ignore);
        assert!(!binder.entries[1].ignore);
        assert!(!binder.all_ignored());

        binder.set_selected(&[] as &[&str]);
        assert!(binder.all_ignored());
    }

    #[test]
    fn test_all_ignored_on_empty() {
        assert!(Binder::new().all_ignored());
    }

    #[test]
    fn test_read_length_rules() {
        let mut entry = EntryHeader::from_file(Path::new("x"));
        entry.unpadded_size = 100;
        entry.padded_size = 112;
        assert_eq!(entry.read_length(), 100);

        entry.aes_key = Some(EntryAesKey::new([0; 16], Vec::new()));
        assert_eq!(entry.read_length(), 112);

        // A padded size smaller than the unpadded one is not trusted.
        entry.padded_size = 64;
        assert_eq!(entry.read_length(), 100);
    }

    #[test]
    fn test_relative_archive_path() {
        let mut binder = Binder::new();
        binder.root_directory = PathBuf::from("/tmp/pack");
        let entry = EntryHeader::from_file(Path::new("/tmp/pack/Chr/C0000.BND"));
        assert_eq!(
            binder.relative_archive_path(&entry).unwrap(),
            "/chr/c0000.bnd"
        );

        let stranger = EntryHeader::from_file(Path::new("/elsewhere/file.bin"));
        assert!(matches!(
            binder.relative_archive_path(&stranger),
            Err(ArchiveError::Rooted { .. })
        ));
    }
}
