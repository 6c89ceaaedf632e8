//! Path helpers shared by every backend.
//!
//! Archive and package paths are `/`-separated strings relative to the backend root. A path
//! ending in `/` names a directory. The root is the empty string; a lone `/` is accepted as an
//! alias and normalizes to `""`.

use std::path::{Component, Path, PathBuf};

pub const SEPARATOR: char = '/';

/// Canonical form of a raw archive-style path.
///
/// Backslashes become `/`, repeated separators collapse, leading separators and `.` segments
/// are dropped, `..` pops the previous segment. One trailing `/` is kept if the raw path had
/// one, so `a//b/` becomes `a/b/` and `\a\b.txt` becomes `a/b.txt`.
pub fn normalize(raw: &str) -> String {
    let is_dir = raw.ends_with(['/', '\\']);
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    let mut out = segments.join("/");
    if is_dir && !out.is_empty() {
        out.push(SEPARATOR);
    }
    out
}

/// `""` and `"/"` both denote the root.
pub fn is_root(path: &str) -> bool {
    path.is_empty() || path == "/"
}

pub fn is_dir_path(path: &str) -> bool {
    path.ends_with(SEPARATOR)
}

/// Directory form of `path`: exactly one trailing separator, root stays `""`.
pub fn as_dir(path: &str) -> String {
    if is_root(path) {
        String::new()
    } else if is_dir_path(path) {
        path.to_string()
    } else {
        format!("{path}{SEPARATOR}")
    }
}

pub fn trim_dir(path: &str) -> &str {
    path.strip_suffix(SEPARATOR).unwrap_or(path)
}

/// Last segment without a trailing separator. The root's name is `""`.
pub fn name(path: &str) -> &str {
    let trimmed = trim_dir(path);
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Text after the last `.` of the name, `""` if there is none.
pub fn extension(path: &str) -> &str {
    let name = name(path);
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => "",
    }
}

pub fn name_without_extension(path: &str) -> &str {
    let name = name(path);
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Directory form of the enclosing directory: `a/b/c.txt` → `a/b/`, `a/` → `""`.
/// `None` only for the root.
pub fn parent(path: &str) -> Option<&str> {
    if is_root(path) {
        return None;
    }
    let trimmed = trim_dir(path);
    Some(match trimmed.rfind(SEPARATOR) {
        Some(idx) => &trimmed[..=idx],
        None => "",
    })
}

/// Appends `name` below `dir` and normalizes the result.
pub fn join(dir: &str, name: &str) -> String {
    normalize(&format!("{dir}{SEPARATOR}{name}"))
}

/// Number of segments; the root has depth 0.
pub fn depth(path: &str) -> usize {
    trim_dir(path).split(SEPARATOR).filter(|s| !s.is_empty()).count()
}

/// Compares two raw paths by their canonical form, so the root aliases match.
pub fn same_path(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Resolves `.` and `..` components of a host path without touching the filesystem.
pub fn normalize_host<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(parent) = result.parent() {
                    result = parent.to_path_buf();
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// Host path rendered with `/` separators.
pub fn to_slash<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Removes a file, or a directory with all its content.
pub fn rm_on_host<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}
