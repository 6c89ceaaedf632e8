mod archive;
mod disk_fs;
mod entry;
mod handle;
mod map_index;
mod package_fs;
mod stream;
mod zip_resource;

pub use archive::{ArchiveHandle, ArchiveSession, Node, NodeId, NodeTable};
pub use disk_fs::{DiskHandle, FileKind};
pub use entry::{Compression, Entry, EntryLocation, EntryType};
pub use handle::Handle;
pub use map_index::MapIndex;
pub use package_fs::{PackageEntry, PackageHandle, PackageIndex};
pub use zip_resource::ZipResourceIndex;
