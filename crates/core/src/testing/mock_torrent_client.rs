//! Mock torrent client for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::torrent_client::{DownloadJob, TorrentClient, TorrentClientError};

/// A recorded submission for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    /// The job that was submitted.
    pub job: DownloadJob,
    /// When the submission was made.
    pub timestamp: chrono::DateTime<Utc>,
}

/// Mock implementation of the TorrentClient trait.
///
/// Provides controllable behavior for testing:
/// - Track logins and accepted submissions
/// - Fail the next N logins or submissions
///
/// # Example
///
/// ```rust,ignore
/// let client = MockTorrentClient::new();
/// client.fail_authentications(1).await;
///
/// // ...run the monitor...
///
/// assert_eq!(client.auth_calls().await, 2);
/// assert_eq!(client.submitted().await.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockTorrentClient {
    /// Number of authenticate calls, failed ones included.
    auth_calls: Arc<RwLock<usize>>,
    /// Number of submit calls, failed ones included.
    submit_calls: Arc<RwLock<usize>>,
    /// Accepted submissions.
    submissions: Arc<RwLock<Vec<RecordedSubmission>>>,
    /// Remaining logins to reject.
    failing_auths: Arc<RwLock<u32>>,
    /// Remaining submissions to reject.
    failing_submits: Arc<RwLock<u32>>,
}

impl Default for MockTorrentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTorrentClient {
    /// Create a new mock client that accepts everything.
    pub fn new() -> Self {
        Self {
            auth_calls: Arc::new(RwLock::new(0)),
            submit_calls: Arc::new(RwLock::new(0)),
            submissions: Arc::new(RwLock::new(Vec::new())),
            failing_auths: Arc::new(RwLock::new(0)),
            failing_submits: Arc::new(RwLock::new(0)),
        }
    }

    /// Reject the next `times` logins with an authentication error.
    pub async fn fail_authentications(&self, times: u32) {
        *self.failing_auths.write().await = times;
    }

    /// Reject the next `times` submissions with a 415.
    pub async fn fail_submissions(&self, times: u32) {
        *self.failing_submits.write().await = times;
    }

    /// Number of login attempts.
    pub async fn auth_calls(&self) -> usize {
        *self.auth_calls.read().await
    }

    /// Number of submission attempts.
    pub async fn submit_calls(&self) -> usize {
        *self.submit_calls.read().await
    }

    /// Jobs accepted so far.
    pub async fn submitted(&self) -> Vec<DownloadJob> {
        self.submissions
            .read()
            .await
            .iter()
            .map(|recorded| recorded.job.clone())
            .collect()
    }

    /// Accepted submissions with timestamps.
    pub async fn recorded_submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.read().await.clone()
    }
}

/// Consume one pending failure, if any.
async fn take_failure(remaining: &RwLock<u32>) -> bool {
    let mut remaining = remaining.write().await;
    if *remaining > 0 {
        *remaining -= 1;
        true
    } else {
        false
    }
}

#[async_trait]
impl TorrentClient for MockTorrentClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn authenticate(&self) -> Result<(), TorrentClientError> {
        *self.auth_calls.write().await += 1;

        if take_failure(&self.failing_auths).await {
            return Err(TorrentClientError::AuthenticationFailed {
                status: 200,
                body: "Fails.".to_string(),
            });
        }
        Ok(())
    }

    async fn submit(&self, job: &DownloadJob) -> Result<(), TorrentClientError> {
        *self.submit_calls.write().await += 1;

        if take_failure(&self.failing_submits).await {
            return Err(TorrentClientError::Rejected {
                status: 415,
                body: "Fails.".to_string(),
            });
        }

        self.submissions.write().await.push(RecordedSubmission {
            job: job.clone(),
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
