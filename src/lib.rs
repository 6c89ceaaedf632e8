//! Uniform file handles over local disk, zip archives and expansion packages.
//!
//! ### Overview
//!
//! `vfs-handle` lets application code treat a file the same way wherever it lives: on the host
//! filesystem, inside a zip/jar archive, or inside an expansion package. Every backend
//! implements the [`FileBackend`] trait and every handle is a [`Handle`].
//!
//! Archives and packages only list flat entry paths. When an archive is opened its entries are
//! turned into a tree once, with missing parent directories synthesized, so that `list()`,
//! `parent()` and `child()` behave the way they do on disk.
//!
//! **Key ideas**:
//! - **One API**: disk, archive and package handles answer the same queries.
//! - **Probing never fails**: `child()` of an unknown name returns a handle that does not
//!   exist instead of an error.
//! - **Lazy reads**: `read()` returns a stream that decompresses on demand.
//! - **Explicit lifetime**: deleting an archive's root handle closes the archive; later reads
//!   through any of its handles fail with [`FileError::UseAfterClose`].
//!
//! ```no_run
//! use vfs_handle::{FileBackend, FileKind, Files, FilesConfig};
//!
//! let files = Files::new(FilesConfig::default());
//! let root = files.archive("assets.zip", FileKind::Internal).unwrap();
//! let atlas = root.child("textures").child("atlas.png");
//! if atlas.exists() {
//!     let bytes = atlas.read_bytes().unwrap();
//!     println!("{} bytes", bytes.len());
//! }
//! root.delete();
//! ```

mod config;
mod core;
mod files;
mod vfs;

#[cfg(test)]
mod test_utils;

pub use config::{ExpansionConfig, FilesConfig};
pub use self::core::{ArchiveError, FileBackend, FileError, Result, utils};
pub use files::Files;
pub use vfs::{
    ArchiveHandle, ArchiveSession, Compression, DiskHandle, Entry, EntryLocation, EntryType,
    FileKind, Handle, MapIndex, Node, NodeId, NodeTable, PackageEntry, PackageHandle,
    PackageIndex, ZipResourceIndex,
};
