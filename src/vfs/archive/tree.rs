//! Builds a navigable tree out of the flat entry list of an archive.
//!
//! Zip central directories only name files (and sometimes directories); nothing guarantees that
//! `a/` is listed just because `a/b/c.txt` is. [`NodeTable::build`] synthesizes every implied
//! ancestor directory, links each node to its nearest enclosing directory, and freezes the
//! result. Nodes live in an arena and refer to each other by [`NodeId`].

use std::collections::HashMap;

use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::core::ArchiveError;
use crate::core::utils;
use crate::vfs::entry::Entry;

/// Index of a node inside its [`NodeTable`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A real archive entry or a synthesized directory.
#[derive(Debug, Clone)]
pub struct Node {
    path: String,
    entry: Option<Entry>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Canonical path; directories end with `/`, the root is `""`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        utils::name(&self.path)
    }

    pub fn entry(&self) -> Option<&Entry> {
        self.entry.as_ref()
    }

    /// `false` for synthesized directories.
    pub fn is_real(&self) -> bool {
        self.entry.is_some()
    }

    pub fn is_dir(&self) -> bool {
        self.entry.as_ref().is_none_or(Entry::is_dir)
    }

    pub fn length(&self) -> u64 {
        match &self.entry {
            Some(entry) if entry.is_file() => entry.size(),
            _ => 0,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Immutable arena of archive nodes keyed by canonical path.
#[derive(Debug, Clone)]
pub struct NodeTable {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
}

impl NodeTable {
    /// Builds the tree from entries in central-directory order.
    ///
    /// Every ancestor directory implied by an entry path gets a node, real or synthesized. An
    /// entry named `/` (or normalizing to the empty path) binds to the root. Two entries with
    /// the same canonical path are rejected.
    pub fn build(entries: Vec<Entry>) -> std::result::Result<Self, ArchiveError> {
        let mut real: HashMap<String, Entry> = HashMap::with_capacity(entries.len());
        let mut paths: IndexSet<String> = IndexSet::with_capacity(entries.len());

        for entry in entries {
            let path = entry.canonical_path();
            if real.contains_key(&path) {
                return Err(ArchiveError::DuplicateEntry(path));
            }
            paths.insert(path.clone());

            let mut ancestor = utils::parent(&path);
            while let Some(dir) = ancestor.filter(|dir| !utils::is_root(dir)) {
                // ancestors of an already known directory are known too
                if !paths.insert(dir.to_string()) {
                    break;
                }
                ancestor = utils::parent(dir);
            }

            real.insert(path, entry);
        }

        // the root is always node 0, whether or not the archive lists it
        paths.shift_remove("");
        let mut nodes = Vec::with_capacity(paths.len() + 1);
        let mut index = HashMap::with_capacity(paths.len() + 1);
        nodes.push(Node {
            path: String::new(),
            entry: real.remove(""),
            parent: None,
            children: Vec::new(),
        });
        index.insert(String::new(), NodeId::ROOT);

        let mut synthesized = 0usize;
        for path in paths {
            let entry = real.remove(&path);
            if entry.is_none() {
                synthesized += 1;
                trace!(%path, "synthesized directory");
            }
            index.insert(path.clone(), NodeId(nodes.len()));
            nodes.push(Node {
                path,
                entry,
                parent: None,
                children: Vec::new(),
            });
        }

        let mut table = NodeTable { nodes, index };
        table.link();

        debug!(
            nodes = table.nodes.len(),
            synthesized, "built archive node table"
        );
        Ok(table)
    }

    /// Assigns every node its nearest enclosing directory and fills the children lists.
    fn link(&mut self) {
        let parents: Vec<NodeId> = (1..self.nodes.len())
            .map(|idx| self.enclosing_dir(&self.nodes[idx].path))
            .collect();

        for (idx, parent) in parents.into_iter().enumerate() {
            let id = NodeId(idx + 1);
            self.nodes[id.0].parent = Some(parent);
            self.nodes[parent.0].children.push(id);
        }
    }

    fn enclosing_dir(&self, path: &str) -> NodeId {
        let mut ancestor = utils::parent(path);
        while let Some(dir) = ancestor.filter(|dir| !utils::is_root(dir)) {
            if let Some(&id) = self.index.get(dir) {
                if self.nodes[id.0].is_dir() {
                    return id;
                }
            }
            ancestor = utils::parent(dir);
        }
        NodeId::ROOT
    }

    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Ids are only handed out by this table, so lookups by id never miss.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(idx, node)| (NodeId(idx), node))
    }

    /// Finds a node by raw path. A path without a trailing slash matches a file first and then
    /// a directory of the same name; with a trailing slash only directories match.
    pub fn lookup(&self, raw: &str) -> Option<NodeId> {
        let path = utils::normalize(raw);
        if utils::is_root(&path) {
            return Some(NodeId::ROOT);
        }
        if let Some(&id) = self.index.get(&path) {
            return Some(id);
        }
        if utils::is_dir_path(&path) {
            return None;
        }
        self.index.get(&utils::as_dir(&path)).copied()
    }

    /// Resolves `name` (possibly nested) below the directory `dir`.
    pub fn find_child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        let node = self.node(dir);
        if !node.is_dir() {
            return None;
        }
        self.lookup(&utils::join(&node.path, name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;
    use crate::vfs::entry::{EntryLocation, EntryType};

    fn entry(name: &str) -> Entry {
        let entry_type = if name.ends_with('/') {
            EntryType::Directory
        } else {
            EntryType::File
        };
        Entry::new(name, entry_type, EntryLocation::stored(0, name.len() as u64))
    }

    fn build(names: &[&str]) -> NodeTable {
        NodeTable::build(names.iter().map(|n| entry(n)).collect()).unwrap()
    }

    fn paths(table: &NodeTable) -> BTreeSet<String> {
        table.iter().map(|(_, n)| n.path().to_string()).collect()
    }

    fn child_paths(table: &NodeTable, id: NodeId) -> BTreeSet<String> {
        table
            .node(id)
            .children()
            .iter()
            .map(|&c| table.node(c).path().to_string())
            .collect()
    }

    /// (path, is_dir, is_real, parent path) for every node.
    fn shape(table: &NodeTable) -> BTreeSet<(String, bool, bool, Option<String>)> {
        table
            .iter()
            .map(|(_, n)| {
                (
                    n.path().to_string(),
                    n.is_dir(),
                    n.is_real(),
                    n.parent().map(|p| table.node(p).path().to_string()),
                )
            })
            .collect()
    }

    mod build {
        use super::*;

        #[test]
        fn test_single_nested_entry_synthesizes_two_dirs() {
            let table = build(&["a/b/c.txt"]);

            assert_eq!(table.len(), 4);
            let expected: BTreeSet<String> = ["", "a/", "a/b/", "a/b/c.txt"]
                .iter()
                .map(|s| s.to_string())
                .collect();
            assert_eq!(paths(&table), expected);

            let synthesized: Vec<_> = table
                .iter()
                .filter(|(id, n)| *id != NodeId::ROOT && !n.is_real())
                .map(|(_, n)| n.path().to_string())
                .collect();
            assert_eq!(synthesized.len(), 2);
            assert!(synthesized.contains(&"a/".to_string()));
            assert!(synthesized.contains(&"a/b/".to_string()));
        }

        #[test]
        fn test_mixed_scenario() {
            let table = build(&["x/", "x/y.txt", "z.txt"]);

            assert_eq!(
                child_paths(&table, NodeId::ROOT),
                ["x/", "z.txt"].iter().map(|s| s.to_string()).collect()
            );
            let x = table.lookup("x").unwrap();
            assert!(table.node(x).is_dir());
            assert!(table.node(x).is_real());
            assert_eq!(table.node(x).children().len(), 1);
            let y = table.node(x).children()[0];
            assert_eq!(table.node(y).name(), "y.txt");
            assert!(!table.node(y).is_dir());
        }

        #[test]
        fn test_flat_archive_is_single_level() {
            let table = build(&["a.txt", "b.txt", "c.png"]);
            assert_eq!(table.root().children().len(), 3);
            for (id, node) in table.iter().skip(1) {
                assert_eq!(node.parent(), Some(NodeId::ROOT), "{id:?}");
            }
        }

        #[test]
        fn test_empty_archive_has_only_root() {
            let table = build(&[]);
            assert!(table.is_empty());
            assert!(table.root().is_dir());
            assert!(table.root().children().is_empty());
        }

        #[test]
        fn test_root_entry_binds_to_root() {
            let table = build(&["/", "a.txt"]);
            assert_eq!(table.len(), 2);
            assert!(table.root().is_real());
            assert!(table.root().is_dir());
            assert_eq!(table.lookup("/"), Some(NodeId::ROOT));
            assert_eq!(table.lookup(""), Some(NodeId::ROOT));
        }

        #[test]
        fn test_file_and_dir_with_same_name() {
            let table = build(&["a", "a/", "a/inner.txt"]);

            let file = table.lookup("a").unwrap();
            let dir = table.lookup("a/").unwrap();
            assert_ne!(file, dir);
            assert!(!table.node(file).is_dir());
            assert!(table.node(dir).is_dir());

            let inner = table.lookup("a/inner.txt").unwrap();
            assert_eq!(table.node(inner).parent(), Some(dir));
            assert!(table.node(file).children().is_empty());
        }

        #[test]
        fn test_duplicate_entries_rejected() {
            let result = NodeTable::build(vec![entry("a/b.txt"), entry("a//b.txt")]);
            assert!(matches!(result, Err(ArchiveError::DuplicateEntry(p)) if p == "a/b.txt"));
        }

        #[test]
        fn test_explicit_dir_listed_after_its_children() {
            let table = build(&["d/e/f.txt", "d/"]);
            let d = table.lookup("d/").unwrap();
            assert!(table.node(d).is_real());
            let e = table.lookup("d/e/").unwrap();
            assert!(!table.node(e).is_real());
            assert_eq!(table.node(e).parent(), Some(d));
        }

        #[test]
        fn test_children_keep_construction_order() {
            let table = build(&["m.txt", "b.txt", "k/", "a.txt"]);
            let names: Vec<_> = table
                .root()
                .children()
                .iter()
                .map(|&c| table.node(c).name())
                .collect();
            assert_eq!(names, vec!["m.txt", "b.txt", "k", "a.txt"]);
        }
    }

    mod lookup {
        use super::*;

        #[test]
        fn test_lookup_dir_without_slash() {
            let table = build(&["x/y.txt"]);
            let x = table.lookup("x").unwrap();
            assert_eq!(table.node(x).path(), "x/");
            assert_eq!(table.lookup("x/"), Some(x));
            assert_eq!(table.lookup("/x//"), Some(x));
        }

        #[test]
        fn test_lookup_trailing_slash_skips_files() {
            let table = build(&["f.txt"]);
            assert!(table.lookup("f.txt").is_some());
            assert!(table.lookup("f.txt/").is_none());
        }

        #[test]
        fn test_find_child_nested_name() {
            let table = build(&["x/y/z.txt"]);
            let found = table.find_child(NodeId::ROOT, "x/y/z.txt").unwrap();
            assert_eq!(table.node(found).path(), "x/y/z.txt");
            assert!(table.find_child(NodeId::ROOT, "missing").is_none());
        }

        #[test]
        fn test_find_child_of_file_is_none() {
            let table = build(&["f.txt"]);
            let f = table.lookup("f.txt").unwrap();
            assert!(table.find_child(f, "anything").is_none());
        }
    }

    mod properties {
        use super::*;

        fn arb_names() -> impl Strategy<Value = Vec<String>> {
            prop::collection::btree_set(
                (prop::collection::vec("[a-d]{1,2}", 1..5), any::<bool>()).prop_map(
                    |(segments, dir)| {
                        let mut name = segments.join("/");
                        if dir {
                            name.push('/');
                        }
                        name
                    },
                ),
                1..24,
            )
            .prop_map(|set| set.into_iter().collect())
        }

        fn build_owned(names: &[String]) -> NodeTable {
            NodeTable::build(names.iter().map(|n| entry(n)).collect()).unwrap()
        }

        proptest! {
            #[test]
            fn prop_no_orphans(names in arb_names()) {
                let table = build_owned(&names);
                for (_, node) in table.iter() {
                    let mut ancestor = utils::parent(node.path());
                    while let Some(dir) = ancestor {
                        prop_assert!(table.lookup(dir).is_some(), "missing ancestor {dir}");
                        ancestor = utils::parent(dir);
                    }
                }
                for name in &names {
                    prop_assert!(table.lookup(name).is_some());
                }
            }

            #[test]
            fn prop_parent_child_consistency(names in arb_names()) {
                let table = build_owned(&names);
                prop_assert!(table.root().parent().is_none());
                for (id, node) in table.iter().skip(1) {
                    let parent = node.parent();
                    prop_assert!(parent.is_some());
                    let parent = parent.unwrap();
                    prop_assert!(table.node(parent).is_dir());
                    let occurrences = table
                        .node(parent)
                        .children()
                        .iter()
                        .filter(|&&c| c == id)
                        .count();
                    prop_assert_eq!(occurrences, 1);
                    prop_assert_eq!(
                        utils::depth(table.node(parent).path()) + 1,
                        utils::depth(node.path())
                    );
                }
                let linked: usize = table.iter().map(|(_, n)| n.children().len()).sum();
                prop_assert_eq!(linked, table.len() - 1);
            }

            #[test]
            fn prop_permutation_builds_same_shape(
                (names, shuffled) in arb_names()
                    .prop_flat_map(|n| (Just(n.clone()), Just(n).prop_shuffle()))
            ) {
                let first = build_owned(&names);
                let second = build_owned(&shuffled);
                prop_assert_eq!(shape(&first), shape(&second));
            }
        }
    }
}
