//! Base directories used to resolve relative file kinds.

use std::path::{Path, PathBuf};

/// Where relative [`FileKind`](crate::FileKind)s are rooted on the host.
///
/// * `external`: user-writable storage, the home directory by default.
/// * `local`: application-private storage, the working directory by default.
/// * `internal`: read-only application files, the working directory by default.
/// * `classpath`: read-only resources shipped next to the executable.
///
/// An optional [`ExpansionConfig`] names the expansion packages consulted for internal files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesConfig {
    external_path: PathBuf,
    local_path: PathBuf,
    internal_path: PathBuf,
    classpath_path: PathBuf,
    expansion: Option<ExpansionConfig>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| cwd.clone());
        Self {
            external_path: dirs::home_dir().unwrap_or_else(|| cwd.clone()),
            local_path: cwd.clone(),
            internal_path: cwd,
            classpath_path: exe_dir,
            expansion: None,
        }
    }
}

impl FilesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roots every relative kind at `root`. Handy for tests and sandboxes.
    pub fn rooted_at<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            external_path: root.clone(),
            local_path: root.clone(),
            internal_path: root.clone(),
            classpath_path: root,
            expansion: None,
        }
    }

    pub fn with_external_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.external_path = path.into();
        self
    }

    pub fn with_local_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.local_path = path.into();
        self
    }

    pub fn with_internal_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.internal_path = path.into();
        self
    }

    pub fn with_classpath_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.classpath_path = path.into();
        self
    }

    pub fn with_expansion(mut self, expansion: ExpansionConfig) -> Self {
        self.expansion = Some(expansion);
        self
    }

    pub fn external_path(&self) -> &Path {
        &self.external_path
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn internal_path(&self) -> &Path {
        &self.internal_path
    }

    pub fn classpath_path(&self) -> &Path {
        &self.classpath_path
    }

    pub fn expansion(&self) -> Option<&ExpansionConfig> {
        self.expansion.as_ref()
    }
}

/// Identifies the main and patch expansion packages of an application.
///
/// Packages live at `<storage>/Android/obb/<package>/<kind>.<version>.<package>.obb`. A version
/// of `0` means the package is not shipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionConfig {
    package_name: String,
    main_version: u32,
    patch_version: u32,
    storage_dir: PathBuf,
}

impl ExpansionConfig {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(
        package_name: S,
        main_version: u32,
        patch_version: u32,
        storage_dir: P,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            main_version,
            patch_version,
            storage_dir: storage_dir.into(),
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn obb_dir(&self) -> PathBuf {
        self.storage_dir
            .join("Android")
            .join("obb")
            .join(&self.package_name)
    }

    /// Candidate package files, main before patch, whether or not they exist.
    pub fn expansion_files(&self) -> Vec<PathBuf> {
        let dir = self.obb_dir();
        [("main", self.main_version), ("patch", self.patch_version)]
            .into_iter()
            .filter(|&(_, version)| version > 0)
            .map(|(kind, version)| dir.join(format!("{kind}.{version}.{}.obb", self.package_name)))
            .collect()
    }
}
