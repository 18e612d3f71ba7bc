//! Types for the episode monitor.

use thiserror::Error;

use crate::cursor::CursorError;
use crate::locator::LocatorError;
use crate::torrent_client::TorrentClientError;

/// Errors that end a single monitor cycle.
///
/// None of these stop the monitor; the cycle is retried after the interval.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Listing or detail page could not be fetched.
    #[error("locator error: {0}")]
    Locator(#[from] LocatorError),

    /// Login or submission to the download client failed.
    #[error("torrent client error: {0}")]
    TorrentClient(#[from] TorrentClientError),

    /// The advanced cursor could not be persisted.
    #[error("cursor error: {0}")]
    Cursor(#[from] CursorError),

    /// A blocking task failed to complete.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Monitor state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Searching,
    Extracting,
    Submitting,
    Advancing,
    WaitingRetry,
    Done,
}

impl MonitorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorState::Idle => "idle",
            MonitorState::Searching => "searching",
            MonitorState::Extracting => "extracting",
            MonitorState::Submitting => "submitting",
            MonitorState::Advancing => "advancing",
            MonitorState::WaitingRetry => "waiting_retry",
            MonitorState::Done => "done",
        }
    }
}

/// Result of one locate/extract/submit/advance cycle that raised no error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Magnet submitted and cursor advanced.
    Submitted,
    /// No listing row matched the episode.
    EpisodeNotFound,
    /// The detail page had no magnet link.
    MagnetNotFound,
}

/// How a monitor run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// `episode` was submitted; the cursor now holds `next_episode`.
    Completed { episode: u32, next_episode: u32 },
    /// Shutdown was requested before `episode` could be submitted.
    Cancelled { episode: u32 },
}
