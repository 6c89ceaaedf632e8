use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by handles and the archive session.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot open archive {}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },

    #[error("{0} is a directory")]
    NotReadable(String),

    #[error("{0} does not exist")]
    NotFound(String),

    #[error("cannot get the sibling of the root")]
    RootHasNoSibling,

    #[error("the root has no parent")]
    RootHasNoParent,

    #[error("archive {} is closed", .0.display())]
    UseAfterClose(PathBuf),

    #[error("failed to close archive {}", .0.display())]
    CloseFailed(PathBuf),

    #[error("{path}: unsupported compression method {method}")]
    UnsupportedCompression { path: String, method: String },

    #[error("{0}: checksum mismatch")]
    ChecksumMismatch(String),

    #[error("{0} is read-only")]
    ReadOnly(String),

    #[error("i/o error on {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Recovers a `FileError` that travelled through an `io::Error` (e.g. from a stream whose
    /// session closed mid-read). Any other I/O error is wrapped as `Io`.
    pub fn from_io(path: impl Into<String>, err: io::Error) -> Self {
        if err.get_ref().is_none() {
            return Self::io(path, err);
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<FileError>()) {
            Some(Ok(file_error)) => *file_error,
            Some(Err(other)) => Self::io(path, io::Error::new(kind, other)),
            None => Self::io(path, io::Error::from(kind)),
        }
    }
}

impl From<FileError> for io::Error {
    fn from(err: FileError) -> Self {
        match err {
            FileError::Io { source, .. } => source,
            other => io::Error::other(other),
        }
    }
}

/// Failures while parsing an archive into a node table.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error("duplicate entry `{0}`")]
    DuplicateEntry(String),

    #[error("{0} is not stored on the host filesystem")]
    NotOnDisk(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_recovers_wrapped_error() {
        let wrapped: io::Error = FileError::UseAfterClose(PathBuf::from("a.zip")).into();
        let recovered = FileError::from_io("x", wrapped);
        assert!(matches!(recovered, FileError::UseAfterClose(p) if p == PathBuf::from("a.zip")));
    }

    #[test]
    fn test_from_io_wraps_plain_error() {
        let plain = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let err = FileError::from_io("x.txt", plain);
        assert!(matches!(err, FileError::Io { ref path, .. } if path == "x.txt"));
    }

    #[test]
    fn test_io_variant_unwraps_to_source() {
        let err = FileError::io("x", io::Error::new(io::ErrorKind::NotFound, "gone"));
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
    }
}
