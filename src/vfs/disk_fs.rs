//! Handles over the host filesystem.
//!
//! ### Key Features:
//! - **Kind-based roots**: a relative path is resolved against the base directory its
//!   [`FileKind`] maps to in [`FilesConfig`]; absolute handles use the path as-is.
//! - **Internal fallback**: internal files missing from the internal root are looked up in the
//!   classpath root.
//! - **No cached state**: every query goes to the host filesystem.
//! - **Read-only kinds**: classpath and internal handles never write or delete.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::FilesConfig;
use crate::core::{FileBackend, FileError, Result, utils};
use crate::Handle;

/// How a disk path is rooted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Read-only resources next to the executable.
    Classpath,
    /// Read-only application files, falling back to the classpath.
    Internal,
    /// Relative to the user-writable external storage.
    External,
    /// A host path used as-is.
    Absolute,
    /// Relative to application-private storage.
    Local,
}

impl FileKind {
    pub fn is_read_only(self) -> bool {
        matches!(self, FileKind::Classpath | FileKind::Internal)
    }
}

/// A file or directory on the host filesystem.
///
/// ### Example:
/// ```no_run
/// use std::sync::Arc;
/// use vfs_handle::{DiskHandle, FileBackend, FileKind, FilesConfig};
///
/// let config = Arc::new(FilesConfig::rooted_at("/tmp/game"));
/// let save = DiskHandle::new("saves/slot1.dat", FileKind::Local, config);
/// assert_eq!(save.file(), std::path::Path::new("/tmp/game/saves/slot1.dat"));
/// ```
#[derive(Debug, Clone)]
pub struct DiskHandle {
    file: PathBuf, // normalized, relative unless kind is Absolute
    path: String,  // `file` with `/` separators
    kind: FileKind,
    config: Arc<FilesConfig>,
}

impl DiskHandle {
    pub fn new<P: AsRef<Path>>(path: P, kind: FileKind, config: Arc<FilesConfig>) -> Self {
        let mut file = utils::normalize_host(path);
        if kind != FileKind::Absolute && file.has_root() {
            // relative kinds never escape their base directory through a leading separator
            file = file
                .components()
                .filter(|c| matches!(c, std::path::Component::Normal(_)))
                .collect();
        }
        let path = utils::to_slash(&file);
        Self {
            file,
            path,
            kind,
            config,
        }
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn config(&self) -> &Arc<FilesConfig> {
        &self.config
    }

    /// The host location this handle resolves to.
    pub fn file(&self) -> PathBuf {
        match self.kind {
            FileKind::Absolute => self.file.clone(),
            FileKind::External => self.config.external_path().join(&self.file),
            FileKind::Local => self.config.local_path().join(&self.file),
            FileKind::Classpath => self.config.classpath_path().join(&self.file),
            FileKind::Internal => {
                let internal = self.config.internal_path().join(&self.file);
                if internal.exists() {
                    return internal;
                }
                let classpath = self.config.classpath_path().join(&self.file);
                if classpath.exists() { classpath } else { internal }
            }
        }
    }

    fn with_path<P: AsRef<Path>>(&self, path: P) -> Handle {
        Handle::Disk(Self::new(path, self.kind, Arc::clone(&self.config)))
    }

    fn is_root(&self) -> bool {
        self.file.parent().is_none()
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.kind.is_read_only() {
            return Err(FileError::ReadOnly(self.path.clone()));
        }
        Ok(())
    }

    /// Creates this directory and all missing parents.
    pub fn mkdirs(&self) -> Result<()> {
        self.ensure_writable()?;
        std::fs::create_dir_all(self.file()).map_err(|e| FileError::io(&self.path, e))
    }

    /// Writes `content`, replacing the file or appending to it. Missing parents are created.
    pub fn write_bytes(&self, content: &[u8], append: bool) -> Result<()> {
        self.ensure_writable()?;
        let host = self.file();
        if host.is_dir() {
            return Err(FileError::io(&self.path, io::ErrorKind::IsADirectory.into()));
        }
        let io_err = |e: io::Error| FileError::io(&self.path, e);
        if let Some(parent) = host.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&host)
            .map_err(io_err)?;
        file.write_all(content).map_err(io_err)
    }

    /// Removes this directory with all its content.
    pub fn delete_directory(&self) -> bool {
        if self.kind.is_read_only() || !self.is_directory() {
            return false;
        }
        utils::rm_on_host(self.file()).is_ok()
    }
}

impl FileBackend for DiskHandle {
    fn path(&self) -> &str {
        &self.path
    }

    fn name(&self) -> &str {
        self.file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("")
    }

    fn exists(&self) -> bool {
        self.file().exists()
    }

    fn is_directory(&self) -> bool {
        self.file().is_dir()
    }

    fn length(&self) -> u64 {
        match std::fs::metadata(self.file()) {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => 0,
        }
    }

    fn read(&self) -> Result<Box<dyn Read + Send>> {
        let host = self.file();
        if host.is_dir() {
            return Err(FileError::NotReadable(self.path.clone()));
        }
        match File::open(&host) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FileError::NotFound(self.path.clone()))
            }
            Err(e) => Err(FileError::io(&self.path, e)),
        }
    }

    /// A fresh host listing; order follows the host filesystem.
    fn list(&self) -> Result<Vec<Handle>> {
        let host = self.file();
        if !host.is_dir() {
            return Ok(Vec::new());
        }
        let io_err = |e: io::Error| FileError::io(&self.path, e);
        let mut children = Vec::new();
        for entry in std::fs::read_dir(&host).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            children.push(self.with_path(self.file.join(entry.file_name())));
        }
        Ok(children)
    }

    fn child(&self, name: &str) -> Handle {
        if self.file.as_os_str().is_empty() {
            return self.with_path(name);
        }
        self.with_path(self.file.join(name))
    }

    /// A bare absolute name such as `a.txt` has the filesystem root as its parent.
    fn parent(&self) -> Option<Handle> {
        let parent = self.file.parent()?;
        if parent.as_os_str().is_empty() && self.kind == FileKind::Absolute {
            return Some(self.with_path("/"));
        }
        Some(self.with_path(parent))
    }

    fn sibling(&self, name: &str) -> Result<Handle> {
        if self.is_root() {
            return Err(FileError::RootHasNoSibling);
        }
        match self.file.parent() {
            Some(parent) => Ok(self.with_path(parent.join(name))),
            None => Err(FileError::RootHasNoSibling),
        }
    }

    /// Removes a file or an empty directory. Read-only kinds are never deleted.
    fn delete(&self) -> bool {
        if self.kind.is_read_only() {
            return false;
        }
        let host = self.file();
        if host.is_dir() {
            std::fs::remove_dir(host).is_ok()
        } else {
            std::fs::remove_file(host).is_ok()
        }
    }
}
