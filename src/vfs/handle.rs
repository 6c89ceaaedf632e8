use std::io::Read;

use crate::core::{ArchiveError, FileBackend, FileError, Result, utils};
use crate::vfs::archive::ArchiveHandle;
use crate::vfs::disk_fs::DiskHandle;
use crate::vfs::package_fs::PackageHandle;

const READ_HINT_LIMIT: u64 = 64 * 1024;

/// A file or directory in any backend.
///
/// Handles are cheap to clone. Navigation (`child`, `parent`, `sibling`) always stays inside
/// the backend the handle came from.
#[derive(Debug, Clone)]
pub enum Handle {
    Disk(DiskHandle),
    Archive(ArchiveHandle),
    Package(PackageHandle),
}

macro_rules! dispatch {
    ($self:ident, $h:ident => $body:expr) => {
        match $self {
            Handle::Disk($h) => $body,
            Handle::Archive($h) => $body,
            Handle::Package($h) => $body,
        }
    };
}

impl FileBackend for Handle {
    fn path(&self) -> &str {
        dispatch!(self, h => h.path())
    }

    fn name(&self) -> &str {
        dispatch!(self, h => h.name())
    }

    fn exists(&self) -> bool {
        dispatch!(self, h => h.exists())
    }

    fn is_directory(&self) -> bool {
        dispatch!(self, h => h.is_directory())
    }

    fn length(&self) -> u64 {
        dispatch!(self, h => h.length())
    }

    fn read(&self) -> Result<Box<dyn Read + Send>> {
        dispatch!(self, h => h.read())
    }

    fn list(&self) -> Result<Vec<Handle>> {
        dispatch!(self, h => h.list())
    }

    fn child(&self, name: &str) -> Handle {
        dispatch!(self, h => h.child(name))
    }

    fn parent(&self) -> Option<Handle> {
        dispatch!(self, h => h.parent())
    }

    fn sibling(&self, name: &str) -> Result<Handle> {
        dispatch!(self, h => h.sibling(name))
    }

    fn delete(&self) -> bool {
        dispatch!(self, h => h.delete())
    }
}

impl Handle {
    /// Reads the whole content into memory.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        let mut stream = self.read()?;
        // the declared length only sizes the first allocation
        let hint = self.length().min(READ_HINT_LIMIT) as usize;
        let mut content = Vec::with_capacity(hint);
        stream
            .read_to_end(&mut content)
            .map_err(|e| FileError::from_io(self.path(), e))?;
        Ok(content)
    }

    /// Reads the whole content as UTF-8, replacing invalid sequences.
    pub fn read_string(&self) -> Result<String> {
        let bytes = self.read_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Children accepted by `filter`.
    pub fn list_by<F>(&self, mut filter: F) -> Result<Vec<Handle>>
    where
        F: FnMut(&Handle) -> bool,
    {
        let mut children = self.list()?;
        children.retain(|child| filter(child));
        Ok(children)
    }

    /// Children whose name ends with `suffix`, such as `".png"`.
    pub fn list_with_suffix(&self, suffix: &str) -> Result<Vec<Handle>> {
        self.list_by(|child| child.name().ends_with(suffix))
    }

    pub fn extension(&self) -> &str {
        utils::extension(self.path())
    }

    pub fn name_without_extension(&self) -> &str {
        utils::name_without_extension(self.path())
    }

    /// Like [`FileBackend::child`] but fails with `NotFound` for a name that does not exist.
    pub fn child_existing(&self, name: &str) -> Result<Handle> {
        let child = self.child(name);
        if child.exists() {
            Ok(child)
        } else {
            Err(FileError::NotFound(child.path().to_string()))
        }
    }

    /// Like [`FileBackend::parent`] but fails with `RootHasNoParent` at the root.
    pub fn parent_checked(&self) -> Result<Handle> {
        self.parent().ok_or(FileError::RootHasNoParent)
    }

    /// Opens this disk file as a zip archive and returns the archive's root.
    ///
    /// Only disk handles can be opened; an archive nested in another container fails with
    /// `OpenFailed`.
    pub fn open_archive(&self) -> Result<Handle> {
        match self {
            Handle::Disk(disk) => Ok(Handle::Archive(ArchiveHandle::open(disk.file())?)),
            other => Err(FileError::OpenFailed {
                path: other.path().into(),
                source: ArchiveError::NotOnDisk(other.path().to_string()),
            }),
        }
    }

    pub fn as_disk(&self) -> Option<&DiskHandle> {
        match self {
            Handle::Disk(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_archive(&self) -> Option<&ArchiveHandle> {
        match self {
            Handle::Archive(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_package(&self) -> Option<&PackageHandle> {
        match self {
            Handle::Package(h) => Some(h),
            _ => None,
        }
    }
}

impl From<DiskHandle> for Handle {
    fn from(handle: DiskHandle) -> Self {
        Handle::Disk(handle)
    }
}

impl From<ArchiveHandle> for Handle {
    fn from(handle: ArchiveHandle) -> Self {
        Handle::Archive(handle)
    }
}

impl From<PackageHandle> for Handle {
    fn from(handle: PackageHandle) -> Self {
        Handle::Package(handle)
    }
}
