//! Zip fixtures for unit tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::unstable::write::FileOptionsExt;
use zip::write::SimpleFileOptions;

pub(crate) struct Fixture<'a> {
    name: &'a str,
    content: Option<&'a [u8]>,
    method: CompressionMethod,
    password: Option<&'a [u8]>,
}

impl<'a> Fixture<'a> {
    pub(crate) fn file(name: &'a str, content: &'a [u8]) -> Self {
        Self::compressed(name, content, CompressionMethod::Stored)
    }

    pub(crate) fn compressed(name: &'a str, content: &'a [u8], method: CompressionMethod) -> Self {
        Self {
            name,
            content: Some(content),
            method,
            password: None,
        }
    }

    /// A stored file protected with ZipCrypto.
    pub(crate) fn encrypted(name: &'a str, content: &'a [u8], password: &'a [u8]) -> Self {
        Self {
            password: Some(password),
            ..Self::file(name, content)
        }
    }

    pub(crate) fn dir(name: &'a str) -> Self {
        Self {
            name,
            content: None,
            method: CompressionMethod::Stored,
            password: None,
        }
    }
}

/// Writes `entries` in order into `dir/name` and returns the archive path.
pub(crate) fn write_zip(dir: &Path, name: &str, entries: &[Fixture<'_>]) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    let mut writer = ZipWriter::new(File::create(&path)?);
    for entry in entries {
        let mut options = SimpleFileOptions::default().compression_method(entry.method);
        if let Some(password) = entry.password {
            options = options.with_deprecated_encryption(password);
        }
        match entry.content {
            Some(content) => {
                writer.start_file(entry.name, options)?;
                writer.write_all(content)?;
            }
            None => writer.add_directory(entry.name, options)?,
        }
    }
    writer.finish()?;
    Ok(path)
}

/// Overwrites the first occurrence of `needle` in the file at `path` with `replacement`.
pub(crate) fn corrupt(path: &Path, needle: &[u8], replacement: &[u8]) -> anyhow::Result<()> {
    let mut bytes = std::fs::read(path)?;
    let at = bytes
        .windows(needle.len())
        .position(|window| window == needle)
        .ok_or_else(|| anyhow::anyhow!("{} not found in {}", String::from_utf8_lossy(needle), path.display()))?;
    bytes[at..at + replacement.len()].copy_from_slice(replacement);
    std::fs::write(path, bytes)?;
    Ok(())
}
