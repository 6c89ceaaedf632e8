use std::io::Read;

pub mod error;
pub mod utils;

pub use error::{ArchiveError, FileError};

use crate::Handle;

pub type Result<T> = std::result::Result<T, FileError>;

/// Capabilities shared by every storage backend.
///
/// Navigation never fails on a missing name: `child()` hands back a handle whose `exists()` is
/// `false`, so callers can probe without matching on errors. Only `sibling()` and `read()`
/// report failures.
pub trait FileBackend {
    /// Slash-separated path of this handle inside its backend.
    fn path(&self) -> &str;

    /// Last path segment, without a trailing separator.
    fn name(&self) -> &str;

    fn exists(&self) -> bool;

    fn is_directory(&self) -> bool;

    /// Uncompressed size in bytes, `0` for directories and missing handles.
    fn length(&self) -> u64;

    /// Opens a lazy stream over the content.
    fn read(&self) -> Result<Box<dyn Read + Send>>;

    /// Immediate children. Files and missing handles list as empty.
    fn list(&self) -> Result<Vec<Handle>>;

    fn child(&self, name: &str) -> Handle;

    /// Returns `None` for the root.
    fn parent(&self) -> Option<Handle>;

    fn sibling(&self, name: &str) -> Result<Handle>;

    /// Returns `true` if the backend removed or released something.
    fn delete(&self) -> bool;
}
