//! Readers that turn an entry's raw byte range into its decoded content.

use std::io::{self, Read};
use std::sync::Arc;

use flate2::CrcReader;
use flate2::read::DeflateDecoder;

use crate::core::{FileError, Result};
use crate::vfs::archive::ArchiveSession;
use crate::vfs::entry::{Compression, EntryLocation};

/// Wraps the compressed bytes of an entry in the decoder its compression method needs.
/// The decoded stream stops after `location.size` bytes and, when the location carries a
/// CRC-32, fails at end of stream if the content does not match it.
pub(crate) fn decode<R>(raw: R, path: &str, location: &EntryLocation) -> Result<Box<dyn Read + Send>>
where
    R: Read + Send + 'static,
{
    let decoded: Box<dyn Read + Send> = match &location.compression {
        Compression::Stored => Box::new(raw.take(location.size)),
        Compression::Deflated => Box::new(DeflateDecoder::new(raw).take(location.size)),
        Compression::Unsupported(method) => {
            return Err(FileError::UnsupportedCompression {
                path: path.to_string(),
                method: method.clone(),
            });
        }
    };
    Ok(match location.crc32 {
        Some(expected) => Box::new(Verified {
            inner: CrcReader::new(decoded),
            expected,
            path: path.to_string(),
        }),
        None => decoded,
    })
}

/// Checks the CRC-32 of everything read once the inner stream is exhausted.
struct Verified<R> {
    inner: CrcReader<R>,
    expected: u32,
    path: String,
}

impl<R: Read> Read for Verified<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 && !buf.is_empty() && self.inner.crc().sum() != self.expected {
            return Err(FileError::ChecksumMismatch(self.path.clone()).into());
        }
        Ok(n)
    }
}

/// Raw bytes of one entry, fetched from the session's shared file on every call.
///
/// Each read seeks under the session lock, so several readers over the same session can be
/// interleaved. Once the session is closed every further read fails with `UseAfterClose`.
pub(crate) struct SessionReader {
    session: Arc<ArchiveSession>,
    offset: u64,
    remaining: u64,
}

impl SessionReader {
    pub(crate) fn new(session: Arc<ArchiveSession>, location: &EntryLocation) -> Self {
        Self {
            session,
            offset: location.data_offset,
            remaining: location.compressed_size,
        }
    }
}

impl Read for SessionReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let len = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let n = self.session.read_at(self.offset, &mut buf[..len])?;
        self.offset += n as u64;
        self.remaining -= n as u64;
        Ok(n)
    }
}
