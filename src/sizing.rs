//! Pluggable value-computation policies applied to file leaves.
//!
//! Folder values are policy-independent: expanded folders are always the sum
//! of their children, collapsed folders a fixed constant. The transform
//! engine selects a policy keyed by the configured size mode and never
//! hardcodes the weighting itself.

use crate::model::{ActivityMap, GitStatus, SizeMode, ViewOptions};

/// Visibility floor for changed files under byte-proportional sizing.
pub const MIN_DIRTY_FILE_SIZE: u64 = 5000;

/// Uniform weight of a changed file (clean files weigh 1).
pub const DIRTY_FILE_WEIGHT: u64 = 5;

/// Weight of a file with no recorded activity. Kept positive so the file
/// stays visible in the layout.
pub const ACTIVITY_FALLBACK_WEIGHT: u64 = 1;

/// A file leaf as seen by a sizing policy. `status` is the effective status
/// after unstaged suppression, so a demoted file is weighted as clean.
pub struct FileLeaf<'a> {
    pub path: &'a str,
    pub byte_size: u64,
    pub status: GitStatus,
}

pub trait SizingPolicy {
    fn file_value(&self, leaf: &FileLeaf<'_>) -> u64;
}

/// `value = byte size`, floored for changed files so small-but-dirty files
/// remain visible in a byte-proportional layout.
pub struct ByteSize;

impl SizingPolicy for ByteSize {
    fn file_value(&self, leaf: &FileLeaf<'_>) -> u64 {
        if leaf.status.is_clean() {
            leaf.byte_size
        } else {
            leaf.byte_size.max(MIN_DIRTY_FILE_SIZE)
        }
    }
}

/// Uniform weighting: all files comparable, changed files inflated 5x.
pub struct UniformWeight;

impl SizingPolicy for UniformWeight {
    fn file_value(&self, leaf: &FileLeaf<'_>) -> u64 {
        if leaf.status.is_clean() {
            1
        } else {
            DIRTY_FILE_WEIGHT
        }
    }
}

/// Weight by recorded change count in the trailing window.
pub struct ActivityWeight<'a> {
    map: Option<&'a ActivityMap>,
}

impl SizingPolicy for ActivityWeight<'_> {
    fn file_value(&self, leaf: &FileLeaf<'_>) -> u64 {
        self.map
            .and_then(|m| m.get(leaf.path).copied())
            .filter(|&count| count > 0)
            .unwrap_or(ACTIVITY_FALLBACK_WEIGHT)
    }
}

/// Select the policy for the configured mode.
pub fn policy_for(options: &ViewOptions) -> Box<dyn SizingPolicy + '_> {
    match options.mode {
        SizeMode::Size => Box::new(ByteSize),
        SizeMode::Count => Box::new(UniformWeight),
        SizeMode::Activity => Box::new(ActivityWeight {
            map: options.activity.as_ref(),
        }),
    }
}
