use thiserror::Error;

/// Crate-wide error type. Provider and transport failures are caught at the
/// fetch boundary and converted into a renderable error tree; the transform
/// and reconciliation paths are infallible.
#[derive(Debug, Error)]
pub enum Error {
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("GitHub API error ({status}): {message}")]
    GitHub { status: u16, message: String },

    #[error("invalid GitHub repository reference: {0}")]
    RepoRef(String),

    #[error("no commits between {start} and {end}")]
    EmptyRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
