//! An in-memory package index.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::Arc;

use crate::core::{FileError, Result, utils};
use crate::vfs::package_fs::{PackageEntry, PackageIndex};

#[derive(Debug, Clone)]
enum Slot {
    Dir,
    File(Arc<[u8]>),
}

/// Files and directories kept in process, keyed by canonical path.
///
/// ### Invariants
///
/// 1. **Parent consistency**: every ancestor of a stored path is stored as a directory.
/// 2. **Directory keys**: directory keys end with `/`; the root is never stored.
///
/// Useful for embedded assets and as a test double wherever a [`PackageIndex`] is expected.
///
/// ### Example
///
/// ```
/// use std::sync::Arc;
/// use vfs_handle::{FileBackend, MapIndex, PackageHandle};
///
/// let mut index = MapIndex::new();
/// index.insert_file("docs/note.txt", b"Hello".to_vec());
///
/// let root = PackageHandle::root(Arc::new(index));
/// assert!(root.child("docs").is_directory());
/// assert_eq!(root.child("docs/note.txt").length(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapIndex {
    slots: BTreeMap<String, Slot>,
}

impl MapIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a file, replacing any previous content, and creates its parent directories.
    pub fn insert_file<C: Into<Arc<[u8]>>>(&mut self, path: &str, content: C) {
        let path = utils::trim_dir(&utils::normalize(path)).to_string();
        if path.is_empty() {
            return;
        }
        self.insert_parents(&path);
        self.slots.insert(path, Slot::File(content.into()));
    }

    /// Stores a directory and its parents.
    pub fn insert_dir(&mut self, path: &str) {
        let path = utils::as_dir(&utils::normalize(path));
        if path.is_empty() {
            return;
        }
        self.insert_parents(&path);
        self.slots.insert(path, Slot::Dir);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn insert_parents(&mut self, path: &str) {
        let mut current = utils::parent(path);
        while let Some(dir) = current.filter(|d| !utils::is_root(d)) {
            self.slots.entry(dir.to_string()).or_insert(Slot::Dir);
            current = utils::parent(dir);
        }
    }

    fn to_entry(path: &str, slot: &Slot) -> PackageEntry {
        match slot {
            Slot::Dir => PackageEntry::dir(path),
            Slot::File(content) => PackageEntry::file(path, content.len() as u64),
        }
    }
}

impl PackageIndex for MapIndex {
    fn entry(&self, path: &str) -> Option<PackageEntry> {
        let path = utils::normalize(path);
        self.slots
            .get(&path)
            .map(|slot| Self::to_entry(&path, slot))
    }

    fn entries_at(&self, dir: &str) -> Vec<PackageEntry> {
        let dir = utils::as_dir(&utils::normalize(dir));
        self.slots
            .range(dir.clone()..)
            .take_while(|(path, _)| path.starts_with(&dir))
            .filter(|(path, _)| utils::parent(path) == Some(dir.as_str()))
            .map(|(path, slot)| Self::to_entry(path, slot))
            .collect()
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        let path = utils::normalize(path);
        match self.slots.get(&path) {
            Some(Slot::File(content)) => Ok(Box::new(Cursor::new(Arc::clone(content)))),
            Some(Slot::Dir) => Err(FileError::NotReadable(path)),
            None => Err(FileError::NotFound(path)),
        }
    }
}
