//! Episode monitor implementation.
//!
//! One sequential loop:
//! - Idle: load the cursor
//! - Searching -> Extracting -> Submitting -> Advancing -> Done on success
//! - WaitingRetry after any empty result or error, then Searching again with
//!   the same episode

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::cursor::{CursorStore, FIRST_EPISODE};
use crate::locator::EpisodeSource;
use crate::torrent_client::{DownloadJob, TorrentClient};

use super::config::MonitorConfig;
use super::types::{CycleOutcome, MonitorError, MonitorOutcome, MonitorState};

/// The episode monitor - fetches the next episode and advances the cursor.
pub struct EpisodeMonitor {
    config: MonitorConfig,
    source: Arc<dyn EpisodeSource>,
    client: Arc<dyn TorrentClient>,
    cursor: CursorStore,
    shutdown: Option<watch::Receiver<bool>>,
}

impl EpisodeMonitor {
    /// Create a new monitor.
    pub fn new(
        config: MonitorConfig,
        source: Arc<dyn EpisodeSource>,
        client: Arc<dyn TorrentClient>,
        cursor: CursorStore,
    ) -> Self {
        Self {
            config,
            source,
            client,
            cursor,
            shutdown: None,
        }
    }

    /// Stop waiting and return once `true` is sent on this channel.
    ///
    /// Shutdown is observed before each cycle and during the retry sleep; an
    /// in-flight cycle runs to completion first.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Run until the next episode has been submitted or shutdown is requested.
    pub async fn run(&self) -> MonitorOutcome {
        self.transition(MonitorState::Idle, 0);
        let episode = self.load_cursor().await;
        info!(
            episode,
            source = self.source.name(),
            client = self.client.name(),
            "Monitoring for episode {:02}",
            episode
        );

        let mut shutdown = self.shutdown.clone();
        let interval = self.config.check_interval();

        loop {
            if shutdown_requested(&shutdown) {
                info!(episode, "Shutdown requested, stopping monitor");
                return MonitorOutcome::Cancelled { episode };
            }

            match self.run_cycle(episode).await {
                Ok(CycleOutcome::Submitted) => {
                    let next_episode = episode.saturating_add(1);
                    self.transition(MonitorState::Done, episode);
                    info!(episode, next_episode, "Episode {:02} done", episode);
                    return MonitorOutcome::Completed {
                        episode,
                        next_episode,
                    };
                }
                Ok(CycleOutcome::EpisodeNotFound) => {
                    debug!(episode, "Episode not available yet");
                }
                Ok(CycleOutcome::MagnetNotFound) => {
                    warn!(episode, "Magnet not found");
                }
                Err(e) => {
                    error!(episode, error = %e, "Monitor cycle failed");
                }
            }

            self.transition(MonitorState::WaitingRetry, episode);
            log_wait(interval);

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = wait_for_shutdown(&mut shutdown) => {
                    info!(episode, "Shutdown requested while waiting, stopping monitor");
                    return MonitorOutcome::Cancelled { episode };
                }
            }
        }
    }

    /// Run one locate/extract/submit/advance cycle for `episode`.
    ///
    /// The cursor is written only after the submission succeeded.
    pub async fn run_cycle(&self, episode: u32) -> Result<CycleOutcome, MonitorError> {
        self.transition(MonitorState::Searching, episode);
        let Some(page_url) = self.source.find_episode_page(episode).await? else {
            return Ok(CycleOutcome::EpisodeNotFound);
        };

        self.transition(MonitorState::Extracting, episode);
        let Some(magnet) = self.source.extract_magnet(&page_url).await? else {
            return Ok(CycleOutcome::MagnetNotFound);
        };

        self.transition(MonitorState::Submitting, episode);
        info!(magnet = %magnet, "Sending to {}", self.client.name());
        let job = DownloadJob::new(magnet, self.config.save_path.clone());
        self.client.authenticate().await?;
        self.client.submit(&job).await?;

        self.transition(MonitorState::Advancing, episode);
        let next_episode = episode.saturating_add(1);
        let store = self.cursor.clone();
        tokio::task::spawn_blocking(move || store.save(next_episode))
            .await
            .map_err(|e| MonitorError::Internal(e.to_string()))??;
        info!(next_episode, path = %self.cursor.path().display(), "Cursor advanced");

        Ok(CycleOutcome::Submitted)
    }

    async fn load_cursor(&self) -> u32 {
        let store = self.cursor.clone();
        match tokio::task::spawn_blocking(move || store.load()).await {
            Ok(episode) => episode,
            Err(e) => {
                warn!(error = %e, "Cursor load task failed, starting from episode {}", FIRST_EPISODE);
                FIRST_EPISODE
            }
        }
    }

    fn transition(&self, state: MonitorState, episode: u32) {
        info!(state = state.as_str(), episode, "Monitor state");
    }
}

fn log_wait(interval: Duration) {
    let next_attempt = chrono::Duration::from_std(interval)
        .ok()
        .and_then(|delay| Utc::now().checked_add_signed(delay));

    match next_attempt {
        Some(at) => info!(
            next_attempt = %at.format("%Y-%m-%d %H:%M:%S UTC"),
            "Retrying in {:.1} minutes",
            interval.as_secs_f64() / 60.0
        ),
        None => info!("Retrying in {:.1} minutes", interval.as_secs_f64() / 60.0),
    }
}

fn shutdown_requested(shutdown: &Option<watch::Receiver<bool>>) -> bool {
    shutdown.as_ref().is_some_and(|rx| *rx.borrow())
}

/// Resolves once shutdown is signalled; never resolves without a channel or
/// after the sender is dropped.
async fn wait_for_shutdown(shutdown: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = shutdown {
        if rx.wait_for(|stop| *stop).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}
