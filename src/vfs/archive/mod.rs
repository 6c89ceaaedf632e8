//! Handles over the content of a zip/jar archive.

mod session;
mod tree;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tracing::error;

pub use session::ArchiveSession;
pub(crate) use session::scan_entries;
pub use tree::{Node, NodeId, NodeTable};

use crate::core::{FileBackend, FileError, Result, utils};
use crate::Handle;

#[derive(Debug, Clone)]
enum Target {
    Node(NodeId),
    /// A probe for a name the table does not contain.
    Missing { parent: NodeId, path: String },
}

/// A node of an opened archive, or a probe below one.
///
/// All handles of one archive share its [`ArchiveSession`]. Deleting the root handle closes
/// the archive file for all of them.
///
/// ### Example
/// ```no_run
/// use vfs_handle::{ArchiveHandle, FileBackend};
///
/// let root = ArchiveHandle::open("assets.zip").unwrap();
/// for child in root.list().unwrap() {
///     println!("{} ({} bytes)", child.path(), child.length());
/// }
/// let missing = root.child("not-there.png");
/// assert!(!missing.exists());
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveHandle {
    session: Arc<ArchiveSession>,
    target: Target,
}

impl ArchiveHandle {
    /// Opens the zip at `path` and returns the handle of its root.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let session = ArchiveSession::open(path)?;
        Ok(Self::root_of(session))
    }

    pub fn root_of(session: Arc<ArchiveSession>) -> Self {
        Self {
            session,
            target: Target::Node(NodeId::ROOT),
        }
    }

    pub fn session(&self) -> &Arc<ArchiveSession> {
        &self.session
    }

    /// `None` for probes of missing names.
    pub fn node_id(&self) -> Option<NodeId> {
        match self.target {
            Target::Node(id) => Some(id),
            Target::Missing { .. } => None,
        }
    }

    pub fn node(&self) -> Option<&Node> {
        self.node_id().map(|id| self.session.table().node(id))
    }

    pub fn is_root(&self) -> bool {
        self.node_id() == Some(NodeId::ROOT)
    }

    /// `false` for synthesized directories and probes.
    pub fn is_real(&self) -> bool {
        self.node().is_some_and(Node::is_real)
    }

    fn at(&self, id: NodeId) -> Handle {
        Handle::Archive(Self {
            session: Arc::clone(&self.session),
            target: Target::Node(id),
        })
    }

    fn missing(&self, parent: NodeId, path: String) -> Handle {
        Handle::Archive(Self {
            session: Arc::clone(&self.session),
            target: Target::Missing { parent, path },
        })
    }
}

impl FileBackend for ArchiveHandle {
    fn path(&self) -> &str {
        match &self.target {
            Target::Node(id) => self.session.table().node(*id).path(),
            Target::Missing { path, .. } => path,
        }
    }

    fn name(&self) -> &str {
        utils::name(self.path())
    }

    /// Every node in the table exists by construction; probes never do.
    fn exists(&self) -> bool {
        self.node_id().is_some()
    }

    fn is_directory(&self) -> bool {
        self.node().is_some_and(Node::is_dir)
    }

    fn length(&self) -> u64 {
        self.node().map_or(0, Node::length)
    }

    fn read(&self) -> Result<Box<dyn Read + Send>> {
        let node = self
            .node()
            .ok_or_else(|| FileError::NotFound(self.path().to_string()))?;
        match node.entry() {
            Some(entry) if entry.is_file() => self.session.open_entry(node.path(), entry.location()),
            _ => Err(FileError::NotReadable(node.path().to_string())),
        }
    }

    /// Children in the order the archive listed them.
    fn list(&self) -> Result<Vec<Handle>> {
        Ok(self
            .node()
            .map(|node| node.children().iter().map(|&id| self.at(id)).collect())
            .unwrap_or_default())
    }

    /// A file `a` shadowed by a directory `a/` resolves its children below the directory.
    fn child(&self, name: &str) -> Handle {
        match &self.target {
            Target::Node(id) => {
                let table = self.session.table();
                let dir = if table.node(*id).is_dir() {
                    *id
                } else {
                    match table.lookup(&utils::as_dir(self.path())) {
                        Some(dir) => dir,
                        None => return self.missing(*id, utils::join(self.path(), name)),
                    }
                };
                match table.find_child(dir, name) {
                    Some(found) => self.at(found),
                    None => self.missing(dir, utils::join(table.node(dir).path(), name)),
                }
            }
            Target::Missing { parent, path } => self.missing(*parent, utils::join(path, name)),
        }
    }

    fn parent(&self) -> Option<Handle> {
        match &self.target {
            Target::Node(id) => self
                .session
                .table()
                .node(*id)
                .parent()
                .map(|parent| self.at(parent)),
            Target::Missing { parent, .. } => Some(self.at(*parent)),
        }
    }

    fn sibling(&self, name: &str) -> Result<Handle> {
        match self.parent() {
            Some(parent) => Ok(parent.child(name)),
            None => Err(FileError::RootHasNoSibling),
        }
    }

    /// Deleting the root closes the archive; entries inside an archive cannot be deleted.
    fn delete(&self) -> bool {
        if !self.is_root() {
            return false;
        }
        match self.session.close() {
            Ok(()) => true,
            Err(err) => {
                error!(%err, "archive close failed");
                false
            }
        }
    }
}
