//! Types for download client operations.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::locator::MagnetLink;

/// Errors that can occur during download client operations.
#[derive(Debug, Error)]
pub enum TorrentClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: HTTP {status} - {body}")]
    AuthenticationFailed { status: u16, body: String },

    #[error("Torrent rejected: HTTP {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to prepare save path {path}: {source}")]
    SavePath {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for TorrentClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TorrentClientError::Timeout
        } else if e.is_connect() {
            TorrentClientError::ConnectionFailed(e.to_string())
        } else {
            TorrentClientError::ApiError(e.to_string())
        }
    }
}

/// A magnet link and the directory the client should save it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub magnet: MagnetLink,
    pub save_path: PathBuf,
}

impl DownloadJob {
    pub fn new(magnet: MagnetLink, save_path: impl Into<PathBuf>) -> Self {
        Self {
            magnet,
            save_path: save_path.into(),
        }
    }
}

/// Trait for download client backends.
///
/// Implementations must not rely on a session surviving between cycles:
/// callers authenticate before every submission.
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Log in to the client.
    async fn authenticate(&self) -> Result<(), TorrentClientError>;

    /// Add a magnet link, started immediately, saving to the job's directory.
    async fn submit(&self, job: &DownloadJob) -> Result<(), TorrentClientError>;
}
