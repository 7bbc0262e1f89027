//! Local provider internals: a parallel working-tree walk and the arena
//! builder that assembles flat file listings (walk results, `ls-tree`
//! output, remote listings) into the nested raw tree.
//!
//! Parallelism stays inside this module; everything it returns is plain
//! owned data.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use indextree::{Arena, NodeId};
use jwalk::WalkDir;
use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::model::{GitStatus, NodeKind, RawNode};

/// Folder names skipped by default, matching the original tooling.
pub const DEFAULT_IGNORE: [&str; 10] = [
    ".git",
    "node_modules",
    "dist",
    ".next",
    ".idea",
    ".vscode",
    "__pycache__",
    "coverage",
    "android",
    "ios",
];

pub fn default_ignore_list() -> Vec<String> {
    DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone)]
struct FileMeta {
    size: u64,
    modified: Option<DateTime<Utc>>,
}

/// Assembles file entries into a nested tree, creating intermediate folders
/// on demand and keeping a path index for parent lookup.
pub struct TreeBuilder {
    arena: Arena<BuildNode>,
    root: NodeId,
    by_path: HashMap<String, NodeId>,
}

struct BuildNode {
    name: String,
    kind: NodeKind,
    size: u64,
    status: GitStatus,
    code: Option<String>,
    modified: Option<DateTime<Utc>>,
}

impl TreeBuilder {
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(BuildNode {
            name: root_name.into(),
            kind: NodeKind::Folder,
            size: 0,
            status: GitStatus::Clean,
            code: None,
            modified: None,
        });
        Self {
            arena,
            root,
            by_path: HashMap::new(),
        }
    }

    /// Insert a file by its `/`-separated relative path, creating any missing
    /// folders along the way.
    pub fn add_file(
        &mut self,
        rel_path: &str,
        size: u64,
        status: GitStatus,
        code: Option<&str>,
        modified: Option<DateTime<Utc>>,
    ) {
        let mut parent = self.root;
        let mut prefix = String::new();

        let parts: Vec<&str> = rel_path.split('/').filter(|p| !p.is_empty()).collect();
        let Some((file_name, folders)) = parts.split_last() else {
            return;
        };

        for folder in folders {
            if prefix.is_empty() {
                prefix.push_str(folder);
            } else {
                prefix.push('/');
                prefix.push_str(folder);
            }
            parent = match self.by_path.get(prefix.as_str()) {
                Some(&id) => id,
                None => {
                    let id = self.arena.new_node(BuildNode {
                        name: folder.to_string(),
                        kind: NodeKind::Folder,
                        size: 0,
                        status: GitStatus::Clean,
                        code: None,
                        modified: None,
                    });
                    parent.append(id, &mut self.arena);
                    self.by_path.insert(prefix.clone(), id);
                    id
                }
            };
        }

        let file_id = self.arena.new_node(BuildNode {
            name: file_name.to_string(),
            kind: NodeKind::File,
            size: size.max(1),
            status,
            code: code.map(str::to_string),
            modified,
        });
        parent.append(file_id, &mut self.arena);
    }

    /// Convert into the raw tree. Folder values become the sum of their
    /// descendants; empty folders are dropped.
    pub fn into_raw(self) -> RawNode {
        fn convert(arena: &Arena<BuildNode>, id: NodeId) -> RawNode {
            let data = arena.get(id).expect("arena node").get();
            if data.kind == NodeKind::File {
                return RawNode {
                    name: data.name.clone(),
                    kind: NodeKind::File,
                    value: data.size,
                    git_status: data.status,
                    git_code: data.code.clone(),
                    last_modified: data.modified,
                    children: Vec::new(),
                    message: None,
                };
            }

            let children: Vec<RawNode> = id
                .children(arena)
                .map(|child| convert(arena, child))
                .filter(|child| child.kind == NodeKind::File || child.value > 0)
                .collect();
            let value = children.iter().map(|c| c.value).sum();
            RawNode {
                name: data.name.clone(),
                kind: NodeKind::Folder,
                value,
                git_status: data.status,
                git_code: None,
                last_modified: None,
                children,
                message: None,
            }
        }
        convert(&self.arena, self.root)
    }
}

/// Build a raw tree from a flat `(path, size)` listing plus a status lookup,
/// tagging every file with the given synthetic status code.
pub fn tree_from_listing(
    items: &[(String, u64)],
    statuses: &HashMap<String, GitStatus>,
    code: &str,
    ignore: &[String],
) -> RawNode {
    let mut builder = TreeBuilder::new("root");
    for (path, size) in items {
        if path.split('/').any(|part| ignore.iter().any(|i| i == part)) {
            continue;
        }
        let status = statuses.get(path).copied().unwrap_or_default();
        builder.add_file(path, *size, status, Some(code), None);
    }
    builder.into_raw()
}

fn rel_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let s = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    (!s.is_empty()).then_some(s)
}

/// Walk the working tree, skipping ignored folder names, and assemble a raw
/// tree with per-file git status and modification times.
pub fn scan_worktree(
    root: &Path,
    ignore: &[String],
    statuses: &HashMap<String, (GitStatus, String)>,
) -> Result<RawNode> {
    let ignore: Vec<String> = ignore.to_vec();
    let ignore_for_walk = ignore.clone();

    let entries: Vec<PathBuf> = WalkDir::new(root)
        .skip_hidden(false)
        .sort(true)
        .process_read_dir(move |_, _, _, children| {
            children.retain(|entry| {
                entry
                    .as_ref()
                    .map(|e| {
                        let name = e.file_name.to_string_lossy();
                        !(e.file_type.is_dir() && ignore_for_walk.iter().any(|i| *i == name))
                    })
                    .unwrap_or(true)
            });
        })
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type.is_file())
        .map(|entry| entry.path())
        .collect();

    debug!(files = entries.len(), root = %root.display(), "worktree walk complete");

    // Metadata collection fans out across the rayon pool; results land in a
    // shared map keyed by relative path.
    let metas: DashMap<String, FileMeta> = DashMap::new();
    entries.par_iter().for_each(|path| {
        let Some(rel) = rel_path(root, path) else {
            return;
        };
        let Ok(metadata) = std::fs::metadata(path) else {
            return;
        };
        let modified = metadata
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);
        metas.insert(
            rel,
            FileMeta {
                size: metadata.len(),
                modified,
            },
        );
    });

    let mut files: Vec<(String, FileMeta)> = metas.into_iter().collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut builder = TreeBuilder::new("root");
    for (rel, meta) in files {
        let (status, code) = statuses
            .get(&rel)
            .map(|(s, c)| (*s, Some(c.as_str())))
            .unwrap_or((GitStatus::Clean, None));
        builder.add_file(&rel, meta.size, status, code, meta.modified);
    }
    Ok(builder.into_raw())
}
