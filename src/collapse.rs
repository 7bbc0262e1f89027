//! Session-lifetime set of collapsed folder paths.
//!
//! Mutated only by user interaction (toggle, focus, clear); the transform
//! engine reads it but never writes. Callers re-render after any mutation.

use std::collections::BTreeSet;

use crate::model::DisplayNode;

#[derive(Debug, Clone, Default)]
pub struct CollapseSet {
    paths: BTreeSet<String>,
}

impl CollapseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Flip membership of a single path.
    pub fn toggle(&mut self, path: &str) {
        if !self.paths.remove(path) {
            self.paths.insert(path.to_string());
        }
    }

    /// Drill into one folder: collapse every sibling folder, expand self.
    /// The root has no parent and cannot be focused.
    pub fn focus<'a>(&mut self, siblings: impl IntoIterator<Item = &'a DisplayNode>, path: &str) {
        for sibling in siblings {
            if sibling.is_folder() && sibling.path != path {
                self.paths.insert(sibling.path.clone());
            }
        }
        self.paths.remove(path);
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GitStatus, NodeKind};

    fn display(name: &str, path: &str, kind: NodeKind) -> DisplayNode {
        DisplayNode {
            name: name.to_string(),
            kind,
            path: path.to_string(),
            value: 1,
            git_status: GitStatus::Clean,
            git_code: None,
            last_modified: None,
            aggregate_status: GitStatus::Clean,
            collapsed_status: None,
            children: Vec::new(),
        }
    }

    #[test]
    fn toggle_flips_membership() {
        let mut set = CollapseSet::new();
        assert!(!set.contains("src"));

        set.toggle("src");
        assert!(set.contains("src"));

        set.toggle("src");
        assert!(!set.contains("src"));
    }

    #[test]
    fn focus_collapses_sibling_folders_and_expands_self() {
        let siblings = vec![
            display("src", "src", NodeKind::Folder),
            display("docs", "docs", NodeKind::Folder),
            display("tests", "tests", NodeKind::Folder),
            display("README.md", "README.md", NodeKind::File),
        ];

        let mut set = CollapseSet::new();
        set.toggle("src"); // previously collapsed, focusing must expand it
        set.focus(siblings.iter(), "src");

        assert!(!set.contains("src"));
        assert!(set.contains("docs"));
        assert!(set.contains("tests"));
        // Sibling files are never collapsed.
        assert!(!set.contains("README.md"));
    }

    #[test]
    fn clear_empties_set() {
        let mut set = CollapseSet::new();
        set.toggle("a");
        set.toggle("b");
        set.clear();
        assert!(set.is_empty());
    }
}
