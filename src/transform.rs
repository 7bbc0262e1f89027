//! The tree transformation pipeline: rewrites a raw scanner tree into a
//! sized, ordered, annotated display tree under the current view options.
//!
//! `transform` is a pure function of `(tree, options, collapse set)` —
//! identical inputs always produce a byte-identical serialized tree, which is
//! what makes path-keyed reconciliation and testing possible. The input tree
//! is never mutated.

use crate::collapse::CollapseSet;
use crate::model::{DisplayNode, GitStatus, NodeKind, RawNode, SortMode, ViewOptions};
use crate::normalize::{aggregate_status, node_path};
use crate::sizing::{self, FileLeaf, SizingPolicy};

/// Fixed display value of a collapsed folder, independent of its true
/// subtree size, so it remains visibly clickable.
pub const COLLAPSED_MIN_VALUE: u64 = 4;

/// Transform a whole raw tree. The root's own path is the empty string; its
/// children start their paths from just their name.
pub fn transform(root: &RawNode, options: &ViewOptions, collapsed: &CollapseSet) -> DisplayNode {
    let policy = sizing::policy_for(options);
    filter_at(root, String::new(), options, collapsed, policy.as_ref())
}

/// Transform a single subtree below `parent_path`.
pub fn filter_node(
    node: &RawNode,
    parent_path: &str,
    options: &ViewOptions,
    collapsed: &CollapseSet,
) -> DisplayNode {
    let policy = sizing::policy_for(options);
    filter_at(
        node,
        node_path(parent_path, &node.name),
        options,
        collapsed,
        policy.as_ref(),
    )
}

fn filter_at(
    node: &RawNode,
    path: String,
    options: &ViewOptions,
    collapsed: &CollapseSet,
    policy: &dyn SizingPolicy,
) -> DisplayNode {
    // Unstaged suppression, files only: untracked and purely-unstaged
    // modifications (porcelain code exactly " M") demote to clean. Staged
    // ("M ") and mixed ("MM") content stays visible.
    let mut status = node.git_status;
    if !options.show_unstaged && node.kind == NodeKind::File {
        match status {
            GitStatus::Untracked => status = GitStatus::Clean,
            GitStatus::Modified if node.git_code.as_deref() == Some(" M") => {
                status = GitStatus::Clean;
            }
            _ => {}
        }
    }

    // Aggregate status is computed on the raw subtree, pre-suppression.
    let aggregate = if node.is_folder() {
        aggregate_status(node)
    } else {
        GitStatus::Clean
    };

    let is_collapsed = node.is_folder()
        && (collapsed.contains(&path)
            || (options.collapse_clean && aggregate.is_clean()));

    let children = if node.is_folder() && !is_collapsed {
        let mut kids: Vec<DisplayNode> = node
            .children
            .iter()
            .map(|child| {
                let child_path = node_path(&path, &child.name);
                filter_at(child, child_path, options, collapsed, policy)
            })
            .collect();

        if options.hide_clean {
            // Clean folders that still carry sized content (collapsed
            // folders, partially filtered subtrees) are retained.
            kids.retain(|c| !c.git_status.is_clean() || (c.is_folder() && c.value > 0));
        }

        sort_children(&mut kids, options);
        kids
    } else {
        Vec::new()
    };

    let value = if node.kind == NodeKind::File {
        policy.file_value(&FileLeaf {
            path: &path,
            byte_size: node.value,
            status,
        })
    } else if is_collapsed {
        COLLAPSED_MIN_VALUE
    } else {
        children.iter().map(|c| c.value).sum()
    };

    DisplayNode {
        name: node.name.clone(),
        kind: node.kind,
        path,
        value,
        git_status: status,
        git_code: node.git_code.clone(),
        last_modified: node.last_modified,
        aggregate_status: aggregate,
        collapsed_status: is_collapsed.then_some(aggregate),
        children,
    }
}

/// Sort a node's direct children. Children already carry their final values,
/// so size ordering is exact. The sort is stable within equal keys.
fn sort_children(children: &mut [DisplayNode], options: &ViewOptions) {
    children.sort_by(|a, b| {
        if options.folders_first {
            match (a.is_folder(), b.is_folder()) {
                (true, false) => return std::cmp::Ordering::Less,
                (false, true) => return std::cmp::Ordering::Greater,
                _ => {}
            }
        }
        match options.sort {
            SortMode::Alpha => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
            SortMode::Size => b.value.cmp(&a.value),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SizeMode;

    fn options(mode: SizeMode) -> ViewOptions {
        ViewOptions {
            mode,
            ..ViewOptions::new()
        }
    }

    fn sample_tree() -> RawNode {
        RawNode::folder(
            "root",
            vec![
                RawNode::folder(
                    "src",
                    vec![
                        RawNode::file("main.rs", 2000).with_status(GitStatus::Modified, "M "),
                        RawNode::file("lib.rs", 800),
                    ],
                ),
                RawNode::folder("docs", vec![RawNode::file("guide.md", 400)]),
                RawNode::file("Cargo.toml", 300),
            ],
        )
    }

    #[test]
    fn transform_is_deterministic() {
        let tree = sample_tree();
        let opts = options(SizeMode::Size);
        let mut collapsed = CollapseSet::new();
        collapsed.toggle("docs");

        let a = transform(&tree, &opts, &collapsed);
        let b = transform(&tree, &opts, &collapsed);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn paths_exclude_root() {
        let out = transform(&sample_tree(), &options(SizeMode::Count), &CollapseSet::new());
        assert_eq!(out.path, "");
        let src = out.children.iter().find(|c| c.name == "src").unwrap();
        assert_eq!(src.path, "src");
        let main = src.children.iter().find(|c| c.name == "main.rs").unwrap();
        assert_eq!(main.path, "src/main.rs");
    }

    #[test]
    fn folder_values_are_child_sums() {
        let out = transform(&sample_tree(), &options(SizeMode::Size), &CollapseSet::new());
        fn check(node: &DisplayNode) {
            if node.is_folder() && !node.is_collapsed() {
                let sum: u64 = node.children.iter().map(|c| c.value).sum();
                assert_eq!(node.value, sum, "additivity broken at {}", node.path);
                node.children.iter().for_each(check);
            }
        }
        check(&out);
    }

    #[test]
    fn collapsed_folder_value_is_fixed_constant() {
        let big = RawNode::folder(
            "root",
            vec![RawNode::folder(
                "huge",
                vec![RawNode::file("blob.bin", 10_000_000)],
            )],
        );
        let small = RawNode::folder(
            "root",
            vec![RawNode::folder("tiny", vec![RawNode::file("t.txt", 10)])],
        );

        let mut collapsed = CollapseSet::new();
        collapsed.toggle("huge");
        collapsed.toggle("tiny");

        let opts = options(SizeMode::Size);
        let big_out = transform(&big, &opts, &collapsed);
        let small_out = transform(&small, &opts, &collapsed);
        assert_eq!(big_out.children[0].value, COLLAPSED_MIN_VALUE);
        assert_eq!(small_out.children[0].value, COLLAPSED_MIN_VALUE);
        assert!(big_out.children[0].children.is_empty());
    }

    #[test]
    fn collapsed_status_records_aggregate() {
        let tree = RawNode::folder(
            "root",
            vec![RawNode::folder(
                "src",
                vec![RawNode::file("new.rs", 10).with_status(GitStatus::Created, "A ")],
            )],
        );
        let mut collapsed = CollapseSet::new();
        collapsed.toggle("src");

        let out = transform(&tree, &options(SizeMode::Count), &collapsed);
        assert_eq!(out.children[0].collapsed_status, Some(GitStatus::Created));
    }

    #[test]
    fn collapse_clean_folds_clean_folders() {
        let tree = sample_tree();
        let opts = ViewOptions {
            collapse_clean: true,
            ..options(SizeMode::Count)
        };
        let out = transform(&tree, &opts, &CollapseSet::new());

        // src contains a modification and stays expanded; docs is clean.
        let src = out.children.iter().find(|c| c.name == "src").unwrap();
        let docs = out.children.iter().find(|c| c.name == "docs").unwrap();
        assert!(!src.is_collapsed());
        assert!(docs.is_collapsed());
        assert_eq!(docs.value, COLLAPSED_MIN_VALUE);
    }

    #[test]
    fn unstaged_suppression_demotes_purely_unstaged_only() {
        let tree = RawNode::folder(
            "root",
            vec![
                RawNode::file("unstaged.js", 50).with_status(GitStatus::Modified, " M"),
                RawNode::file("staged.js", 50).with_status(GitStatus::Modified, "M "),
                RawNode::file("mixed.js", 50).with_status(GitStatus::Modified, "MM"),
                RawNode::file("new.js", 50).with_status(GitStatus::Untracked, "??"),
            ],
        );
        let opts = ViewOptions {
            show_unstaged: false,
            ..options(SizeMode::Count)
        };
        let out = transform(&tree, &opts, &CollapseSet::new());
        let status_of = |name: &str| {
            out.children
                .iter()
                .find(|c| c.name == name)
                .unwrap()
                .git_status
        };
        assert_eq!(status_of("unstaged.js"), GitStatus::Clean);
        assert_eq!(status_of("staged.js"), GitStatus::Modified);
        assert_eq!(status_of("mixed.js"), GitStatus::Modified);
        assert_eq!(status_of("new.js"), GitStatus::Clean);
    }

    #[test]
    fn suppressed_files_are_sized_as_clean() {
        // a.js clean 100, b.js modified " M" 50, showUnstaged=false: the
        // demotion wins before sizing, so the dirty floor never applies and
        // the root carries the plain byte sum.
        let tree = RawNode::folder(
            "root",
            vec![
                RawNode::file("a.js", 100),
                RawNode::file("b.js", 50).with_status(GitStatus::Modified, " M"),
            ],
        );
        let opts = ViewOptions {
            show_unstaged: false,
            ..options(SizeMode::Size)
        };
        let out = transform(&tree, &opts, &CollapseSet::new());
        assert_eq!(out.children.len(), 2);
        assert_eq!(out.value, 150);
    }

    #[test]
    fn hide_clean_drops_clean_subtrees_but_keeps_sized_folders() {
        let tree = RawNode::folder(
            "root",
            vec![
                RawNode::folder(
                    "folder1",
                    vec![RawNode::file("x.js", 200).with_status(GitStatus::Created, "A ")],
                ),
                RawNode::folder("folder2", vec![RawNode::file("y.js", 50)]),
            ],
        );
        let opts = ViewOptions {
            hide_clean: true,
            ..options(SizeMode::Size)
        };
        let out = transform(&tree, &opts, &CollapseSet::new());
        assert_eq!(out.children.len(), 1);
        assert_eq!(out.children[0].name, "folder1");

        // A clean but collapsed folder carries the fixed value and survives.
        let mut collapsed = CollapseSet::new();
        collapsed.toggle("folder2");
        let out = transform(&tree, &opts, &collapsed);
        assert!(out.children.iter().any(|c| c.name == "folder2"));
    }

    #[test]
    fn sort_partitions_folders_first() {
        let tree = RawNode::folder(
            "root",
            vec![
                RawNode::file("b.txt", 10),
                RawNode::folder("zeta", vec![RawNode::file("z.js", 1)]),
                RawNode::file("a.txt", 99),
                RawNode::folder("alpha", vec![RawNode::file("a.js", 500)]),
            ],
        );
        let out = transform(&tree, &options(SizeMode::Size), &CollapseSet::new());
        let names: Vec<&str> = out.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta", "a.txt", "b.txt"]);

        let opts = ViewOptions {
            sort: SortMode::Size,
            ..options(SizeMode::Size)
        };
        let out = transform(&tree, &opts, &CollapseSet::new());
        let names: Vec<&str> = out.children.iter().map(|c| c.name.as_str()).collect();
        // Folders first, each partition by descending value.
        assert_eq!(names, vec!["alpha", "zeta", "a.txt", "b.txt"]);
        assert!(out.children[0].value > out.children[1].value);
        assert!(out.children[2].value > out.children[3].value);
    }

    #[test]
    fn size_sort_keeps_input_order_on_ties() {
        let tree = RawNode::folder(
            "root",
            vec![
                RawNode::folder("zeta", vec![RawNode::file("z.js", 7)]),
                RawNode::folder("alpha", vec![RawNode::file("a.js", 7)]),
            ],
        );
        let opts = ViewOptions {
            sort: SortMode::Size,
            ..options(SizeMode::Size)
        };
        let out = transform(&tree, &opts, &CollapseSet::new());
        let names: Vec<&str> = out.children.iter().map(|c| c.name.as_str()).collect();
        // Equal values: the stable sort leaves siblings in input order.
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn sort_without_folders_first_interleaves() {
        let tree = RawNode::folder(
            "root",
            vec![
                RawNode::folder("m-folder", vec![RawNode::file("x", 1)]),
                RawNode::file("a.txt", 1),
                RawNode::file("Z.txt", 1),
            ],
        );
        let opts = ViewOptions {
            folders_first: false,
            ..options(SizeMode::Count)
        };
        let out = transform(&tree, &opts, &CollapseSet::new());
        let names: Vec<&str> = out.children.iter().map(|c| c.name.as_str()).collect();
        // Case-insensitive alphabetical across both kinds.
        assert_eq!(names, vec!["a.txt", "m-folder", "Z.txt"]);
    }

    #[test]
    fn activity_mode_sizes_by_change_count() {
        let mut activity = crate::model::ActivityMap::new();
        activity.insert("src/main.rs".to_string(), 9);

        let tree = RawNode::folder(
            "root",
            vec![RawNode::folder(
                "src",
                vec![RawNode::file("main.rs", 2000), RawNode::file("lib.rs", 800)],
            )],
        );
        let opts = ViewOptions {
            mode: SizeMode::Activity,
            activity: Some(activity),
            ..ViewOptions::new()
        };
        let out = transform(&tree, &opts, &CollapseSet::new());
        let src = &out.children[0];
        let value_of = |name: &str| src.children.iter().find(|c| c.name == name).unwrap().value;
        assert_eq!(value_of("main.rs"), 9);
        assert_eq!(value_of("lib.rs"), 1);
        assert_eq!(src.value, 10);
    }
}
