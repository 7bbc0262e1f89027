//! Per-session view state: the cached raw tree, the collapse set, view
//! options, and color mode, with the transform wired on top.
//!
//! Fetching is the caller's job (it may happen on another thread); this type
//! only holds state and derives display trees from it.

use std::collections::HashMap;

use crate::collapse::CollapseSet;
use crate::model::{ActivityMap, DisplayNode, RawNode, SizeMode, SortMode, ViewOptions};
use crate::palette::ColorMode;
use crate::transform;

/// Activity window used when sizing or coloring by activity and the user has
/// not picked one.
pub const DEFAULT_ACTIVITY_DAYS: u32 = 30;

pub struct SessionState {
    raw: Option<RawNode>,
    /// Window days -> fetched activity counts.
    activity: HashMap<u32, ActivityMap>,
    pub activity_days: u32,
    pub collapsed: CollapseSet,
    pub options: ViewOptions,
    pub color_mode: ColorMode,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            raw: None,
            activity: HashMap::new(),
            activity_days: DEFAULT_ACTIVITY_DAYS,
            collapsed: CollapseSet::new(),
            options: ViewOptions::new(),
            color_mode: ColorMode::Git,
        }
    }

    pub fn set_tree(&mut self, tree: RawNode) {
        self.raw = Some(tree);
    }

    pub fn tree(&self) -> Option<&RawNode> {
        self.raw.as_ref()
    }

    pub fn set_activity(&mut self, days: u32, map: ActivityMap) {
        self.activity.insert(days, map);
    }

    /// Activity counts for the current window, if already fetched.
    pub fn activity(&self) -> Option<&ActivityMap> {
        self.activity.get(&self.activity_days)
    }

    /// Whether the current view needs activity data it does not have yet.
    pub fn needs_activity(&self) -> bool {
        (self.options.mode == SizeMode::Activity || self.color_mode == ColorMode::Activity)
            && self.activity().is_none()
    }

    /// Run the transform over the cached raw tree with the session's current
    /// options. `None` until the first tree arrives.
    pub fn display_tree(&self) -> Option<DisplayNode> {
        let raw = self.raw.as_ref()?;
        let mut options = self.options.clone();
        if options.mode == SizeMode::Activity {
            options.activity = self.activity().cloned();
        }
        Some(transform::transform(raw, &options, &self.collapsed))
    }

    pub fn cycle_size_mode(&mut self) {
        self.options.mode = match self.options.mode {
            SizeMode::Count => SizeMode::Size,
            SizeMode::Size => SizeMode::Activity,
            SizeMode::Activity => SizeMode::Count,
        };
    }

    pub fn cycle_color_mode(&mut self) {
        self.color_mode = match self.color_mode {
            ColorMode::Git => ColorMode::Age,
            ColorMode::Age => ColorMode::Activity,
            ColorMode::Activity => ColorMode::Git,
        };
    }

    pub fn toggle_sort(&mut self) {
        self.options.sort = match self.options.sort {
            SortMode::Alpha => SortMode::Size,
            SortMode::Size => SortMode::Alpha,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GitStatus;

    fn sample() -> RawNode {
        RawNode::folder(
            "root",
            vec![
                RawNode::folder(
                    "src",
                    vec![RawNode::file("main.rs", 100).with_status(GitStatus::Modified, "M ")],
                ),
                RawNode::file("README.md", 10),
            ],
        )
    }

    #[test]
    fn display_tree_reflects_collapse_mutations() {
        let mut state = SessionState::new();
        assert!(state.display_tree().is_none());

        state.set_tree(sample());
        let before = state.display_tree().unwrap();
        let src = before.children.iter().find(|c| c.name == "src").unwrap();
        assert!(!src.is_collapsed());

        state.collapsed.toggle("src");
        let after = state.display_tree().unwrap();
        let src = after.children.iter().find(|c| c.name == "src").unwrap();
        assert!(src.is_collapsed());
    }

    #[test]
    fn needs_activity_tracks_mode_and_cache() {
        let mut state = SessionState::new();
        assert!(!state.needs_activity());

        state.options.mode = SizeMode::Activity;
        assert!(state.needs_activity());

        state.set_activity(DEFAULT_ACTIVITY_DAYS, ActivityMap::new());
        assert!(!state.needs_activity());

        // A different window means another fetch.
        state.activity_days = 7;
        assert!(state.needs_activity());
    }

    #[test]
    fn mode_cycles_wrap_around() {
        let mut state = SessionState::new();
        assert_eq!(state.options.mode, SizeMode::Count);
        state.cycle_size_mode();
        assert_eq!(state.options.mode, SizeMode::Size);
        state.cycle_size_mode();
        assert_eq!(state.options.mode, SizeMode::Activity);
        state.cycle_size_mode();
        assert_eq!(state.options.mode, SizeMode::Count);

        state.cycle_color_mode();
        assert_eq!(state.color_mode, ColorMode::Age);
        state.toggle_sort();
        assert_eq!(state.options.sort, SortMode::Size);
    }
}
