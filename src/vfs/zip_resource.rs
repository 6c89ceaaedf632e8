//! A package index over one or more zip files, such as the main and patch expansion files.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::config::ExpansionConfig;
use crate::core::{ArchiveError, FileError, Result, utils};
use crate::vfs::archive::scan_entries;
use crate::vfs::entry::EntryLocation;
use crate::vfs::package_fs::{PackageEntry, PackageIndex};
use crate::vfs::stream;

#[derive(Debug, Clone)]
struct Resource {
    package: usize,
    location: EntryLocation,
}

/// Entries of several zip packages merged into one namespace.
///
/// Packages are added in order and a later package replaces the files of earlier ones path by
/// path, so a patch file overrides the main file. Only metadata is kept in memory: `open`
/// reopens the owning package and streams the entry's byte range.
#[derive(Debug, Default)]
pub struct ZipResourceIndex {
    packages: Vec<PathBuf>,
    files: HashMap<String, Resource>,
    dirs: IndexMap<String, IndexSet<String>>, // dir path -> child paths, in archive order
}

impl ZipResourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes the existing expansion files of `config`, main before patch.
    pub fn from_expansion(config: &ExpansionConfig) -> Result<Self> {
        let mut index = Self::new();
        for file in config.expansion_files() {
            if file.is_file() {
                index.add_package(&file)?;
            } else {
                trace!(package = %file.display(), "expansion file not present");
            }
        }
        if index.packages.is_empty() {
            return Err(FileError::NotFound(utils::to_slash(config.obb_dir())));
        }
        Ok(index)
    }

    /// Adds the entries of the zip at `path`, overriding files already indexed.
    pub fn add_package<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let open_failed = |source: ArchiveError| FileError::OpenFailed {
            path: path.clone(),
            source,
        };
        let file = File::open(&path).map_err(|e| open_failed(e.into()))?;
        let entries = scan_entries(BufReader::new(file)).map_err(&open_failed)?;

        let package = self.packages.len();
        let mut overridden = 0usize;
        for entry in &entries {
            let canonical = entry.canonical_path();
            if utils::is_root(&canonical) {
                continue;
            }
            self.link(&canonical);
            if entry.is_dir() {
                self.dirs.entry(canonical).or_default();
            } else {
                let resource = Resource {
                    package,
                    location: entry.location().clone(),
                };
                if self.files.insert(canonical, resource).is_some() {
                    overridden += 1;
                }
            }
        }
        debug!(
            package = %path.display(),
            entries = entries.len(),
            overridden,
            "indexed expansion package"
        );
        self.packages.push(path);
        Ok(())
    }

    pub fn packages(&self) -> &[PathBuf] {
        &self.packages
    }

    /// Records `path` below its parent and every ancestor below its own parent.
    fn link(&mut self, path: &str) {
        let mut child = path.to_string();
        while let Some(parent) = utils::parent(&child).map(str::to_string) {
            let known = self.dirs.contains_key(&parent);
            self.dirs.entry(parent.clone()).or_default().insert(child);
            if known || utils::is_root(&parent) {
                break;
            }
            child = parent;
        }
    }

    fn describe(&self, path: &str) -> Option<PackageEntry> {
        if let Some(resource) = self.files.get(path) {
            return Some(PackageEntry::file(path, resource.location.size));
        }
        if utils::is_dir_path(path) && self.dirs.contains_key(path) {
            return Some(PackageEntry::dir(path));
        }
        None
    }
}

impl PackageIndex for ZipResourceIndex {
    fn entry(&self, path: &str) -> Option<PackageEntry> {
        let path = utils::normalize(path);
        if utils::is_root(&path) {
            return None;
        }
        self.describe(&path)
    }

    fn entries_at(&self, dir: &str) -> Vec<PackageEntry> {
        let dir = utils::as_dir(&utils::normalize(dir));
        self.dirs
            .get(&dir)
            .map(|children| children.iter().filter_map(|c| self.describe(c)).collect())
            .unwrap_or_default()
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        let path = utils::normalize(path);
        let resource = self
            .files
            .get(&path)
            .ok_or_else(|| FileError::NotFound(path.clone()))?;
        let package = &self.packages[resource.package];
        let location = &resource.location;
        trace!(package = %package.display(), %path, offset = location.data_offset, "open resource");

        let mut file = File::open(package).map_err(|e| FileError::io(&path, e))?;
        file.seek(SeekFrom::Start(location.data_offset))
            .map_err(|e| FileError::io(&path, e))?;
        stream::decode(BufReader::new(file).take(location.compressed_size), &path, location)
    }
}
