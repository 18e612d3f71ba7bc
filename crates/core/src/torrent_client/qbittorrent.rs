//! qBittorrent Web API client implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crate::config::QBittorrentConfig;
use crate::transport::{send_with_retry, RetryPolicy};

use super::{DownloadJob, TorrentClient, TorrentClientError};

/// Body qBittorrent returns on a successful login.
const LOGIN_OK: &str = "Ok.";

/// qBittorrent client implementation.
///
/// The session cookie is kept by the shared client's cookie store; nothing
/// here tracks whether it is still valid.
pub struct QBittorrentClient {
    client: Client,
    config: QBittorrentConfig,
    retry: RetryPolicy,
}

impl QBittorrentClient {
    /// Create a new qBittorrent client on top of the shared HTTP client.
    pub fn new(client: Client, config: QBittorrentConfig) -> Self {
        Self {
            client,
            config,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the transport retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// POST a form and return status and body.
    async fn post_form(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<(StatusCode, String), TorrentClientError> {
        let url = format!("{}{}", self.base_url(), endpoint);
        let response = send_with_retry(&self.retry, self.client.post(&url).form(params)).await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok((status, body))
    }
}

#[async_trait]
impl TorrentClient for QBittorrentClient {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn authenticate(&self) -> Result<(), TorrentClientError> {
        debug!(url = self.base_url(), "Logging in to qBittorrent");

        let (status, body) = self
            .post_form(
                "/api/v2/auth/login",
                &[
                    ("username", self.config.username.as_str()),
                    ("password", self.config.password.as_str()),
                ],
            )
            .await?;

        // A 200 with "Fails." means bad credentials, so the body is checked too.
        if status != StatusCode::OK || !body.contains(LOGIN_OK) {
            return Err(TorrentClientError::AuthenticationFailed {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        info!("qBittorrent login successful");
        Ok(())
    }

    async fn submit(&self, job: &DownloadJob) -> Result<(), TorrentClientError> {
        tokio::fs::create_dir_all(&job.save_path)
            .await
            .map_err(|e| TorrentClientError::SavePath {
                path: job.save_path.display().to_string(),
                source: e,
            })?;

        let save_path = job.save_path.to_string_lossy();
        let (status, body) = self
            .post_form(
                "/api/v2/torrents/add",
                &[
                    ("urls", job.magnet.as_str()),
                    ("paused", "false"),
                    ("savepath", save_path.as_ref()),
                ],
            )
            .await?;

        if status != StatusCode::OK {
            return Err(TorrentClientError::Rejected {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        info!(
            info_hash = %job.magnet.info_hash(),
            save_path = %job.save_path.display(),
            "Magnet sent to qBittorrent"
        );
        Ok(())
    }
}
