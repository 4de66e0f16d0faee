// Error types shared by every component of the client.
//
// Authentication, local file and transport failures are fatal for the
// caller. Rejected submissions and fetches are reported and recoverable.

use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("auth failure: {0}")]
    Authentication(String),
    #[error("submission rejected ({status}): {message}")]
    Submission { status: StatusCode, message: String },
    #[error("fetch rejected ({status}): {message}")]
    Fetch { status: StatusCode, message: String },
    #[error("cannot read {}: {source}", path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed JSON in {origin}: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("bad credentials file {}: {reason}", path.display())]
    Credentials { path: PathBuf, reason: String },
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CatalogError {
    /// Rejections by the backend are reported and the caller carries on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CatalogError::Submission { .. } | CatalogError::Fetch { .. }
        )
    }

    /// HTTP status of a rejection, if this error came from one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CatalogError::Submission { status, .. } | CatalogError::Fetch { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
