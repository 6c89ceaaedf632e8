//! Handles over an expansion package, resolved against a [`PackageIndex`] on every call.

use std::fmt::Debug;
use std::io::Read;
use std::sync::Arc;

use crate::core::{FileBackend, FileError, Result, utils};
use crate::vfs::entry::EntryType;
use crate::Handle;

/// What a package index knows about one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    pub path: String,
    pub entry_type: EntryType,
    pub length: u64,
}

impl PackageEntry {
    pub fn file<S: Into<String>>(path: S, length: u64) -> Self {
        Self {
            path: path.into(),
            entry_type: EntryType::File,
            length,
        }
    }

    pub fn dir<S: Into<String>>(path: S) -> Self {
        Self {
            path: utils::as_dir(&path.into()),
            entry_type: EntryType::Directory,
            length: 0,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }
}

/// Lookup service behind [`PackageHandle`].
///
/// Paths are canonical (see [`utils::normalize`]): directories are queried with a trailing `/`
/// and the root is `""`.
pub trait PackageIndex: Send + Sync + Debug {
    /// The entry stored at exactly `path`.
    fn entry(&self, path: &str) -> Option<PackageEntry>;

    /// Immediate children of the directory `dir`.
    fn entries_at(&self, dir: &str) -> Vec<PackageEntry>;

    /// Opens the content of the file at `path`.
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>>;
}

/// A path inside an expansion package.
///
/// Nothing is cached: `exists`, `length` and `is_directory` ask the index each time. Unlike
/// archive handles no missing directories are synthesized, so a path is only a directory if
/// the index lists it as one or has entries below it.
#[derive(Debug, Clone)]
pub struct PackageHandle {
    index: Arc<dyn PackageIndex>,
    path: String,
}

impl PackageHandle {
    /// A handle for `path`. A directory named without its trailing slash is switched to the
    /// directory form.
    pub fn new(index: Arc<dyn PackageIndex>, path: &str) -> Self {
        let mut path = utils::normalize(path);
        if !utils::is_root(&path) && !utils::is_dir_path(&path) && index.entry(&path).is_none() {
            let dir = utils::as_dir(&path);
            if index.entry(&dir).is_some() || !index.entries_at(&dir).is_empty() {
                path = dir;
            }
        }
        Self { index, path }
    }

    pub fn root(index: Arc<dyn PackageIndex>) -> Self {
        Self::new(index, "")
    }

    pub fn index(&self) -> &Arc<dyn PackageIndex> {
        &self.index
    }

    pub fn is_root(&self) -> bool {
        utils::is_root(&self.path)
    }

    fn at(&self, path: &str) -> Handle {
        Handle::Package(Self::new(Arc::clone(&self.index), path))
    }

    fn knows_dir(&self, dir: &str) -> bool {
        self.index.entry(dir).is_some_and(|e| e.is_dir()) || !self.index.entries_at(dir).is_empty()
    }
}

impl FileBackend for PackageHandle {
    fn path(&self) -> &str {
        &self.path
    }

    fn name(&self) -> &str {
        utils::name(&self.path)
    }

    fn exists(&self) -> bool {
        self.is_root() || self.index.entry(&self.path).is_some() || self.knows_dir(&self.path)
    }

    fn is_directory(&self) -> bool {
        if self.is_root() {
            return true;
        }
        match self.index.entry(&self.path) {
            Some(entry) => entry.is_dir(),
            None => utils::is_dir_path(&self.path) && self.knows_dir(&self.path),
        }
    }

    fn length(&self) -> u64 {
        match self.index.entry(&self.path) {
            Some(entry) if !entry.is_dir() => entry.length,
            _ => 0,
        }
    }

    fn read(&self) -> Result<Box<dyn Read + Send>> {
        if self.is_directory() {
            return Err(FileError::NotReadable(self.path.clone()));
        }
        if self.index.entry(&self.path).is_none() {
            return Err(FileError::NotFound(self.path.clone()));
        }
        self.index.open(&self.path)
    }

    fn list(&self) -> Result<Vec<Handle>> {
        if !self.is_directory() {
            return Ok(Vec::new());
        }
        Ok(self
            .index
            .entries_at(&utils::as_dir(&self.path))
            .iter()
            .map(|entry| self.at(&entry.path))
            .collect())
    }

    fn child(&self, name: &str) -> Handle {
        self.at(&utils::join(&self.path, name))
    }

    /// The nearest enclosing directory the index knows, the root if there is none.
    fn parent(&self) -> Option<Handle> {
        let mut dir = utils::parent(&self.path)?;
        while !utils::is_root(dir) && !self.knows_dir(dir) {
            dir = utils::parent(dir).unwrap_or("");
        }
        Some(self.at(dir))
    }

    fn sibling(&self, name: &str) -> Result<Handle> {
        match utils::parent(&self.path) {
            Some(dir) => Ok(self.at(&utils::join(dir, name))),
            None => Err(FileError::RootHasNoSibling),
        }
    }

    /// Packages are read-only.
    fn delete(&self) -> bool {
        false
    }
}
