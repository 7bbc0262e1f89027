//! Core data model: the scanner-produced raw tree, the transformed display
//! tree, and the view configuration that drives the transform.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Git change state of a single node. Unknown or absent statuses default to
/// `Clean` so malformed input never breaks the render path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitStatus {
    #[default]
    Clean,
    Modified,
    Created,
    Deleted,
    Untracked,
}

impl GitStatus {
    pub fn is_clean(self) -> bool {
        matches!(self, GitStatus::Clean)
    }

    pub fn label(self) -> &'static str {
        match self {
            GitStatus::Clean => "clean",
            GitStatus::Modified => "modified",
            GitStatus::Created => "created",
            GitStatus::Deleted => "deleted",
            GitStatus::Untracked => "untracked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

fn default_node_value() -> u64 {
    1
}

/// Scanner-produced tree node, pre-transform. Both providers (local walk and
/// GitHub listing) emit this exact shape; the transform never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default = "default_node_value")]
    pub value: u64,
    #[serde(default)]
    pub git_status: GitStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    /// Always serialized, even when empty: consumers rely on the error tree
    /// carrying an explicit `children: []`.
    #[serde(default)]
    pub children: Vec<RawNode>,
    /// Only present on degenerate error trees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RawNode {
    pub fn file(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            value,
            git_status: GitStatus::Clean,
            git_code: None,
            last_modified: None,
            children: Vec::new(),
            message: None,
        }
    }

    pub fn folder(name: impl Into<String>, children: Vec<RawNode>) -> Self {
        let value = children.iter().map(|c| c.value).sum();
        Self {
            name: name.into(),
            kind: NodeKind::Folder,
            value,
            git_status: GitStatus::Clean,
            git_code: None,
            last_modified: None,
            children,
            message: None,
        }
    }

    /// Degenerate tree returned for any scan failure so the front end always
    /// has something renderable.
    pub fn error_tree(message: impl Into<String>) -> Self {
        Self {
            name: "error".to_string(),
            kind: NodeKind::Folder,
            value: 0,
            git_status: GitStatus::Clean,
            git_code: None,
            last_modified: None,
            children: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn with_status(mut self, status: GitStatus, code: &str) -> Self {
        self.git_status = status;
        self.git_code = Some(code.to_string());
        self
    }
}

/// Post-transform node, ready for layout. Built fresh per transform call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Ancestor names joined by `/`, root excluded; root's own path is the
    /// empty string. The cross-render identity key.
    pub path: String,
    pub value: u64,
    pub git_status: GitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    pub aggregate_status: GitStatus,
    /// Set only on collapsed folders; drives the collapsed color treatment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed_status: Option<GitStatus>,
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed_status.is_some()
    }
}

/// File path -> change count over a trailing day window.
pub type ActivityMap = BTreeMap<String, u64>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    pub msg: String,
    pub author: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    pub file: String,
    pub added: u64,
    pub removed: u64,
}

/// How file leaves are weighted in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMode {
    /// Byte-proportional, with a visibility floor for changed files.
    Size,
    /// Uniform weight, changed files inflated 5x.
    #[default]
    Count,
    /// Weight by edit frequency over a trailing window.
    Activity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Alpha,
    Size,
}

/// Per-transform-call view configuration. Not persisted.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub mode: SizeMode,
    pub hide_clean: bool,
    pub show_unstaged: bool,
    pub collapse_clean: bool,
    pub sort: SortMode,
    pub folders_first: bool,
    pub activity: Option<ActivityMap>,
}

impl ViewOptions {
    /// Defaults matching the interactive front end: uniform sizing, unstaged
    /// changes visible, folders first, alphabetical sort.
    pub fn new() -> Self {
        Self {
            mode: SizeMode::Count,
            hide_clean: false,
            show_unstaged: true,
            collapse_clean: false,
            sort: SortMode::Alpha,
            folders_first: true,
            activity: None,
        }
    }
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_deserializes_lowercase_and_defaults_clean() {
        let node: RawNode =
            serde_json::from_str(r#"{"name":"a.js","type":"file","git_status":"modified"}"#)
                .unwrap();
        assert_eq!(node.git_status, GitStatus::Modified);
        // Missing value defaults to 1, missing children to empty.
        assert_eq!(node.value, 1);
        assert!(node.children.is_empty());

        let bare: RawNode = serde_json::from_str(r#"{"name":"b.js","type":"file"}"#).unwrap();
        assert_eq!(bare.git_status, GitStatus::Clean);
    }

    #[test]
    fn error_tree_shape() {
        let tree = RawNode::error_tree("scan failed");
        assert_eq!(tree.name, "error");
        assert_eq!(tree.value, 0);
        assert!(tree.children.is_empty());

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["name"], "error");
        assert_eq!(json["value"], 0);
        assert_eq!(json["message"], "scan failed");
        // The empty children list is part of the shape, not omitted.
        assert_eq!(json["children"], serde_json::json!([]));
    }

    #[test]
    fn view_options_default_matches_new() {
        let defaults = ViewOptions::default();
        assert_eq!(defaults.mode, SizeMode::Count);
        assert_eq!(defaults.sort, SortMode::Alpha);
        assert!(defaults.show_unstaged);
        assert!(defaults.folders_first);
        assert!(!defaults.hide_clean);
        assert!(!defaults.collapse_clean);
        assert!(defaults.activity.is_none());
    }

    #[test]
    fn raw_node_round_trips() {
        let tree = RawNode::folder(
            "root",
            vec![
                RawNode::file("a.js", 100),
                RawNode::file("b.js", 50).with_status(GitStatus::Modified, " M"),
            ],
        );
        let json = serde_json::to_string(&tree).unwrap();
        let back: RawNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
