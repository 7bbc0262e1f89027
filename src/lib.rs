//! Git-aware codebase treemap: scan a repository (local checkout or GitHub),
//! transform the file tree under view options into a sized, ordered display
//! tree, lay it out as a squarified treemap, and reconcile renders into
//! animated tile transitions.

pub mod api;
pub mod collapse;
pub mod error;
pub mod git;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod palette;
pub mod reconcile;
pub mod remote;
pub mod scanner;
pub mod session;
pub mod sizing;
pub mod transform;

pub use error::{Error, Result};
