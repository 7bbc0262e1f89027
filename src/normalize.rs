//! Tree normalization: stable path identity and per-subtree aggregate status.

use crate::model::{GitStatus, RawNode};

/// Join a parent path and a node name. The root's own path is the empty
/// string, so its children start their paths from just their name.
pub fn node_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Whether this node or anything under it changed.
///
/// Returns `Clean` only if the node and every descendant is clean; otherwise
/// the first non-clean status found in pre-order (self first, then children
/// in order). This is deliberately not a severity-ranked merge: a `Deleted`
/// child found after a `Modified` one leaves the aggregate `Modified`.
pub fn aggregate_status(node: &RawNode) -> GitStatus {
    if !node.git_status.is_clean() {
        return node.git_status;
    }
    for child in &node.children {
        let status = aggregate_status(child);
        if !status.is_clean() {
            return status;
        }
    }
    GitStatus::Clean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_join() {
        assert_eq!(node_path("", "src"), "src");
        assert_eq!(node_path("src", "main.rs"), "src/main.rs");
        assert_eq!(node_path("src/bin", "tui.rs"), "src/bin/tui.rs");
    }

    #[test]
    fn clean_iff_whole_subtree_clean() {
        let tree = RawNode::folder(
            "root",
            vec![
                RawNode::folder("a", vec![RawNode::file("x.js", 10)]),
                RawNode::file("y.js", 20),
            ],
        );
        assert_eq!(aggregate_status(&tree), GitStatus::Clean);

        let dirty = RawNode::folder(
            "root",
            vec![RawNode::folder(
                "a",
                vec![RawNode::file("x.js", 10).with_status(GitStatus::Untracked, "??")],
            )],
        );
        assert_eq!(aggregate_status(&dirty), GitStatus::Untracked);
    }

    #[test]
    fn first_found_wins_over_severity() {
        // A deleted child after a modified one must not override the aggregate.
        let tree = RawNode::folder(
            "root",
            vec![
                RawNode::file("m.js", 10).with_status(GitStatus::Modified, " M"),
                RawNode::file("d.js", 10).with_status(GitStatus::Deleted, "D "),
            ],
        );
        assert_eq!(aggregate_status(&tree), GitStatus::Modified);
    }

    #[test]
    fn own_status_beats_children() {
        let mut folder = RawNode::folder(
            "root",
            vec![RawNode::file("c.js", 10).with_status(GitStatus::Modified, " M")],
        );
        folder.git_status = GitStatus::Created;
        assert_eq!(aggregate_status(&folder), GitStatus::Created);
    }
}
