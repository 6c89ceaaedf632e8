//! Entry point that hands out handles by [`FileKind`].

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::FilesConfig;
use crate::core::{FileBackend, Result};
use crate::vfs::{DiskHandle, FileKind, Handle, PackageHandle, PackageIndex, ZipResourceIndex};

/// Creates handles for every kind of storage an application uses.
///
/// ### Example
/// ```no_run
/// use vfs_handle::{FileBackend, Files, FilesConfig};
///
/// let files = Files::new(FilesConfig::default());
/// let settings = files.local("settings.json");
/// if settings.exists() {
///     println!("{}", settings.read_string().unwrap());
/// }
/// let sprites = files.archive("sprites.zip", vfs_handle::FileKind::Internal).unwrap();
/// println!("{} sprites", sprites.list().unwrap().len());
/// ```
#[derive(Debug, Clone)]
pub struct Files {
    config: Arc<FilesConfig>,
    expansion: Option<Arc<dyn PackageIndex>>,
}

impl Default for Files {
    fn default() -> Self {
        Self::new(FilesConfig::default())
    }
}

impl Files {
    pub fn new(config: FilesConfig) -> Self {
        Self {
            config: Arc::new(config),
            expansion: None,
        }
    }

    /// Uses `index` as the expansion package consulted by [`Files::internal`].
    pub fn with_expansion(mut self, index: Arc<dyn PackageIndex>) -> Self {
        self.expansion = Some(index);
        self
    }

    /// Indexes the expansion files named by the configuration.
    ///
    /// Returns `false` if no expansion is configured, and `NotFound` if one is configured but
    /// none of its files exist.
    pub fn load_expansion(&mut self) -> Result<bool> {
        let Some(expansion) = self.config.expansion() else {
            return Ok(false);
        };
        let index = ZipResourceIndex::from_expansion(expansion)?;
        debug!(
            package = expansion.package_name(),
            files = index.packages().len(),
            "expansion loaded"
        );
        self.expansion = Some(Arc::new(index));
        Ok(true)
    }

    pub fn config(&self) -> &FilesConfig {
        &self.config
    }

    pub fn has_expansion(&self) -> bool {
        self.expansion.is_some()
    }

    pub fn get(&self, path: &str, kind: FileKind) -> Handle {
        match kind {
            FileKind::Internal => self.internal(path),
            _ => self.disk(path, kind),
        }
    }

    pub fn classpath(&self, path: &str) -> Handle {
        self.disk(path, FileKind::Classpath)
    }

    /// An expansion package entry if the loaded index knows `path`, a disk handle otherwise.
    pub fn internal(&self, path: &str) -> Handle {
        if let Some(handle) = self.expansion(path).filter(|h| h.exists()) {
            return handle;
        }
        self.disk(path, FileKind::Internal)
    }

    pub fn external(&self, path: &str) -> Handle {
        self.disk(path, FileKind::External)
    }

    pub fn absolute(&self, path: &str) -> Handle {
        self.disk(path, FileKind::Absolute)
    }

    pub fn local(&self, path: &str) -> Handle {
        self.disk(path, FileKind::Local)
    }

    /// Opens the zip at `path` and returns its root.
    pub fn archive(&self, path: &str, kind: FileKind) -> Result<Handle> {
        self.disk(path, kind).open_archive()
    }

    /// A handle inside the loaded expansion package.
    pub fn expansion(&self, path: &str) -> Option<Handle> {
        self.expansion
            .as_ref()
            .map(|index| Handle::Package(PackageHandle::new(Arc::clone(index), path)))
    }

    pub fn external_storage_path(&self) -> &Path {
        self.config.external_path()
    }

    pub fn local_storage_path(&self) -> &Path {
        self.config.local_path()
    }

    pub fn is_external_storage_available(&self) -> bool {
        self.config.external_path().is_dir()
    }

    pub fn is_local_storage_available(&self) -> bool {
        self.config.local_path().is_dir()
    }

    fn disk(&self, path: &str, kind: FileKind) -> Handle {
        Handle::Disk(DiskHandle::new(path, kind, Arc::clone(&self.config)))
    }
}
