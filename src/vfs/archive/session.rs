use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};
use zip::ZipArchive;

use crate::core::{ArchiveError, FileError, Result};
use crate::vfs::archive::tree::NodeTable;
use crate::vfs::entry::{Compression, Entry, EntryLocation, EntryType};
use crate::vfs::stream::{self, SessionReader};

/// An opened archive: the backing file plus the node table parsed from it.
///
/// Exactly one session exists per opened archive and every handle derived from it shares it
/// through an `Arc`. The table stays readable for as long as a handle lives; the file is
/// released by [`ArchiveSession::close`], after which reads fail with `UseAfterClose`.
#[derive(Debug)]
pub struct ArchiveSession {
    source: PathBuf,
    file: Mutex<Option<File>>,
    table: NodeTable,
}

impl ArchiveSession {
    /// Opens the zip file at `path` and builds its node table.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Self>> {
        let source = path.as_ref().to_path_buf();
        let open_failed = |source_err: ArchiveError| FileError::OpenFailed {
            path: source.clone(),
            source: source_err,
        };

        let file = File::open(&source).map_err(|e| open_failed(e.into()))?;
        let entries = scan_entries(BufReader::new(&file)).map_err(&open_failed)?;
        let entry_count = entries.len();
        let table = NodeTable::build(entries).map_err(&open_failed)?;

        debug!(
            archive = %source.display(),
            entries = entry_count,
            nodes = table.len(),
            "opened archive"
        );
        Ok(Arc::new(Self {
            source,
            file: Mutex::new(Some(file)),
            table,
        }))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn table(&self) -> &NodeTable {
        &self.table
    }

    pub fn is_closed(&self) -> bool {
        self.file.lock().is_none()
    }

    /// Releases the archive file. Closing twice reports `CloseFailed`.
    pub fn close(&self) -> Result<()> {
        match self.file.lock().take() {
            Some(file) => {
                drop(file);
                debug!(archive = %self.source.display(), "closed archive");
                Ok(())
            }
            None => Err(FileError::CloseFailed(self.source.clone())),
        }
    }

    /// Opens a decoding stream over the entry at `location`.
    pub(crate) fn open_entry(
        self: &Arc<Self>,
        path: &str,
        location: &EntryLocation,
    ) -> Result<Box<dyn Read + Send>> {
        if self.is_closed() {
            return Err(FileError::UseAfterClose(self.source.clone()));
        }
        stream::decode(SessionReader::new(Arc::clone(self), location), path, location)
    }

    /// Reads raw archive bytes at `offset` under the session lock.
    pub(crate) fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut guard = self.file.lock();
        let file = guard
            .as_mut()
            .ok_or_else(|| io::Error::from(FileError::UseAfterClose(self.source.clone())))?;
        file.seek(SeekFrom::Start(offset))?;
        let n = file.read(buf)?;
        trace!(offset, n, "archive read");
        Ok(n)
    }
}

/// Lists the central directory of a zip in archive order.
pub(crate) fn scan_entries<R: Read + Seek>(reader: R) -> std::result::Result<Vec<Entry>, ArchiveError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut entries = Vec::with_capacity(archive.len());
    for idx in 0..archive.len() {
        let file = archive.by_index_raw(idx)?;
        let entry_type = if file.is_dir() {
            EntryType::Directory
        } else {
            EntryType::File
        };
        let compression = if file.encrypted() {
            Compression::Unsupported("encrypted".to_string())
        } else {
            file.compression().into()
        };
        let location = EntryLocation {
            data_offset: file.data_start(),
            compressed_size: file.compressed_size(),
            size: file.size(),
            compression,
            crc32: Some(file.crc32()),
        };
        entries.push(Entry::new(file.name(), entry_type, location));
    }
    Ok(entries)
}
