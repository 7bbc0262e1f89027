//! Color mapping for the three color modes: git status, file age, and edit
//! activity, plus the distinct treatment for collapsed folders.

use chrono::{DateTime, Duration, Utc};

use crate::model::{DisplayNode, GitStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb(
            mix(self.0, other.0),
            mix(self.1, other.1),
            mix(self.2, other.2),
        )
    }
}

pub const CLEAN: Rgb = Rgb(0xe2, 0xe8, 0xf0);
pub const MODIFIED: Rgb = Rgb(0xf5, 0x9e, 0x0b);
pub const CREATED: Rgb = Rgb(0x10, 0xb9, 0x81);
pub const DELETED: Rgb = Rgb(0xef, 0x44, 0x44);
pub const UNTRACKED: Rgb = Rgb(0x63, 0x66, 0xf1);

/// Folders whose subtree contains changes.
pub const DIRTY_FOLDER: Rgb = Rgb(0xcb, 0xd5, 0xe1);

pub const COLLAPSED_CREATED: Rgb = Rgb(0x04, 0x78, 0x57);
pub const COLLAPSED_MODIFIED: Rgb = Rgb(0xb4, 0x53, 0x09);
pub const COLLAPSED_NEUTRAL: Rgb = Rgb(0x94, 0xa3, 0xb8);

/// Cold end of the age/activity ramp (old / quiet).
pub const RAMP_LOW: Rgb = Rgb(0x3b, 0x82, 0xf6);
/// Hot end of the age/activity ramp (fresh / busy).
pub const RAMP_HIGH: Rgb = Rgb(0xf9, 0x73, 0x16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Git,
    Age,
    Activity,
}

pub fn status_color(status: GitStatus) -> Rgb {
    match status {
        GitStatus::Clean => CLEAN,
        GitStatus::Modified => MODIFIED,
        GitStatus::Created => CREATED,
        GitStatus::Deleted => DELETED,
        GitStatus::Untracked => UNTRACKED,
    }
}

/// Collapsed folders get a darker treatment so they read as folded blocks:
/// created wins, then modified, anything else is neutral slate.
pub fn collapsed_color(status: GitStatus) -> Rgb {
    match status {
        GitStatus::Created => COLLAPSED_CREATED,
        GitStatus::Modified => COLLAPSED_MODIFIED,
        _ => COLLAPSED_NEUTRAL,
    }
}

/// Linear ramp over `[now - threshold_days, now]`, clamped at both ends.
/// Nodes without a timestamp stay neutral.
pub fn age_color(
    last_modified: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    threshold_days: i64,
) -> Rgb {
    let Some(ts) = last_modified else {
        return CLEAN;
    };
    let window = Duration::days(threshold_days).num_seconds() as f32;
    if window <= 0.0 {
        return RAMP_HIGH;
    }
    let age = (now - ts).num_seconds() as f32;
    RAMP_LOW.lerp(RAMP_HIGH, 1.0 - age / window)
}

/// Linear ramp over `[0, max_activity]`. Files with no recorded activity
/// stay neutral.
pub fn activity_color(count: u64, max_activity: u64) -> Rgb {
    if count == 0 {
        return CLEAN;
    }
    let max = max_activity.max(1) as f32;
    RAMP_LOW.lerp(RAMP_HIGH, count as f32 / max)
}

/// Color context for one render pass.
pub struct FillContext<'a> {
    pub mode: ColorMode,
    pub now: DateTime<Utc>,
    pub age_threshold_days: i64,
    pub activity: Option<&'a crate::model::ActivityMap>,
    pub max_activity: u64,
}

/// Fill for a display node under the current color mode.
pub fn node_fill(node: &DisplayNode, ctx: &FillContext<'_>) -> Rgb {
    if let Some(status) = node.collapsed_status {
        return collapsed_color(status);
    }

    if node.is_folder() {
        if ctx.mode == ColorMode::Git && !node.aggregate_status.is_clean() {
            return DIRTY_FOLDER;
        }
        if ctx.mode == ColorMode::Git {
            return status_color(node.git_status);
        }
        return CLEAN;
    }

    match ctx.mode {
        ColorMode::Git => status_color(node.git_status),
        ColorMode::Age => age_color(node.last_modified, ctx.now, ctx.age_threshold_days),
        ColorMode::Activity => {
            let count = ctx
                .activity
                .and_then(|m| m.get(node.path.as_str()).copied())
                .unwrap_or(0);
            activity_color(count, ctx.max_activity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapsed_treatment_checks_created_then_modified() {
        assert_eq!(collapsed_color(GitStatus::Created), COLLAPSED_CREATED);
        assert_eq!(collapsed_color(GitStatus::Modified), COLLAPSED_MODIFIED);
        assert_eq!(collapsed_color(GitStatus::Deleted), COLLAPSED_NEUTRAL);
        assert_eq!(collapsed_color(GitStatus::Clean), COLLAPSED_NEUTRAL);
    }

    #[test]
    fn age_ramp_clamps_and_defaults() {
        let now = Utc::now();
        assert_eq!(age_color(None, now, 30), CLEAN);
        // Edited right now: hottest.
        assert_eq!(age_color(Some(now), now, 30), RAMP_HIGH);
        // Far older than the window: coldest, clamped.
        let old = now - Duration::days(365);
        assert_eq!(age_color(Some(old), now, 30), RAMP_LOW);
    }

    #[test]
    fn activity_ramp_scales_with_max() {
        assert_eq!(activity_color(0, 10), CLEAN);
        assert_eq!(activity_color(10, 10), RAMP_HIGH);
        let mid = activity_color(5, 10);
        assert_ne!(mid, RAMP_LOW);
        assert_ne!(mid, RAMP_HIGH);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(RAMP_LOW.lerp(RAMP_HIGH, 0.0), RAMP_LOW);
        assert_eq!(RAMP_LOW.lerp(RAMP_HIGH, 1.0), RAMP_HIGH);
        assert_eq!(RAMP_LOW.lerp(RAMP_HIGH, -1.0), RAMP_LOW);
    }
}
