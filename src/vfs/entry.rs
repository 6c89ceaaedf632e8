use zip::CompressionMethod;

use crate::core::utils;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntryType {
    File,
    Directory,
}

/// How the bytes of an entry are stored inside its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compression {
    Stored,
    Deflated,
    Unsupported(String),
}

impl From<CompressionMethod> for Compression {
    fn from(method: CompressionMethod) -> Self {
        match method {
            CompressionMethod::Stored => Compression::Stored,
            CompressionMethod::Deflated => Compression::Deflated,
            other => Compression::Unsupported(format!("{other:?}")),
        }
    }
}

/// Byte range of an entry's data inside its container file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation {
    pub data_offset: u64,
    pub compressed_size: u64,
    pub size: u64,
    pub compression: Compression,
    /// CRC-32 of the decoded content; `None` skips verification.
    pub crc32: Option<u32>,
}

impl EntryLocation {
    /// An uncompressed range of `size` bytes starting at `data_offset`.
    pub fn stored(data_offset: u64, size: u64) -> Self {
        Self {
            data_offset,
            compressed_size: size,
            size,
            compression: Compression::Stored,
            crc32: None,
        }
    }
}

/// One record of an archive's central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    entry_type: EntryType,
    location: EntryLocation,
}

impl Entry {
    /// A raw name ending in `/` is always a directory, whatever `entry_type` says.
    pub fn new<S: Into<String>>(name: S, entry_type: EntryType, location: EntryLocation) -> Entry {
        let name = name.into();
        let entry_type = if utils::is_dir_path(&name) || name.ends_with('\\') {
            EntryType::Directory
        } else {
            entry_type
        };
        Entry {
            name,
            entry_type,
            location,
        }
    }

    /// Name exactly as the archive reports it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized name; directories end with `/`.
    pub fn canonical_path(&self) -> String {
        let path = utils::normalize(&self.name);
        if self.is_dir() {
            utils::as_dir(&path)
        } else {
            path
        }
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    /// Uncompressed size.
    pub fn size(&self) -> u64 {
        self.location.size
    }

    pub fn location(&self) -> &EntryLocation {
        &self.location
    }
}
