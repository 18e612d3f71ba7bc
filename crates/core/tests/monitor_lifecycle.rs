//! Monitor lifecycle integration tests.
//!
//! These tests drive the monitor loop against mock collaborators:
//! idle -> searching -> extracting -> submitting -> advancing -> done,
//! with waiting_retry in between whenever a cycle comes up empty or fails.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::watch;
use tokio::time::Instant;

use animon_core::{
    testing::{fixtures, MockEpisodeSource, MockTorrentClient},
    CursorStore, CycleOutcome, EpisodeMonitor, LocatorError, MonitorConfig, MonitorOutcome,
};

const CHECK_INTERVAL_SECS: u64 = 300;
const DETAIL_PAGE: &str = "https://nyaa.si/view/1901234";

/// Test helper to create all dependencies for monitor testing.
struct TestHarness {
    source: Arc<MockEpisodeSource>,
    torrent_client: Arc<MockTorrentClient>,
    cursor: CursorStore,
    save_path: std::path::PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new(start_episode: u32) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cursor = CursorStore::new(temp_dir.path().join("state").join("episodio.json"));
        cursor.save(start_episode).expect("Failed to seed cursor");

        Self {
            source: Arc::new(MockEpisodeSource::new()),
            torrent_client: Arc::new(MockTorrentClient::new()),
            cursor,
            save_path: temp_dir.path().join("downloads"),
            _temp_dir: temp_dir,
        }
    }

    fn monitor(&self) -> EpisodeMonitor {
        EpisodeMonitor::new(
            MonitorConfig::new(&self.save_path).with_check_interval_secs(CHECK_INTERVAL_SECS),
            self.source.clone(),
            self.torrent_client.clone(),
            self.cursor.clone(),
        )
    }
}

#[tokio::test(start_paused = true)]
async fn test_episode_submitted_on_first_cycle() {
    let h = TestHarness::new(5);
    h.source.set_page(Some(DETAIL_PAGE)).await;
    h.source.set_magnet(Some(fixtures::magnet("ABC"))).await;

    let started = Instant::now();
    let outcome = h.monitor().run().await;

    assert_eq!(
        outcome,
        MonitorOutcome::Completed {
            episode: 5,
            next_episode: 6
        }
    );
    assert!(started.elapsed() < Duration::from_secs(CHECK_INTERVAL_SECS));
    assert_eq!(h.source.searched_episodes().await, vec![5]);
    assert_eq!(h.source.magnet_requests().await, vec![DETAIL_PAGE.to_string()]);
    assert_eq!(h.torrent_client.auth_calls().await, 1);

    let submitted = h.torrent_client.submitted().await;
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].magnet, fixtures::magnet("ABC"));
    assert_eq!(submitted[0].save_path, h.save_path);

    assert_eq!(h.cursor.load(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_episode_not_listed_waits_and_retries() {
    let h = TestHarness::new(5);
    h.source
        .queue_pages(vec![None, None, Some(DETAIL_PAGE.to_string())])
        .await;
    h.source.set_magnet(Some(fixtures::magnet("ABC"))).await;

    let started = Instant::now();
    let outcome = h.monitor().run().await;

    assert_eq!(
        outcome,
        MonitorOutcome::Completed {
            episode: 5,
            next_episode: 6
        }
    );
    assert!(started.elapsed() >= Duration::from_secs(2 * CHECK_INTERVAL_SECS));
    assert_eq!(h.source.searched_episodes().await, vec![5, 5, 5]);
    assert_eq!(h.source.magnet_requests().await.len(), 1);
    assert_eq!(h.torrent_client.submitted().await.len(), 1);
    assert_eq!(h.cursor.load(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_missing_magnet_retries_without_submitting() {
    let h = TestHarness::new(5);
    h.source.set_page(Some(DETAIL_PAGE)).await;

    let monitor = h.monitor();
    let outcome = monitor.run_cycle(5).await.unwrap();
    assert_eq!(outcome, CycleOutcome::MagnetNotFound);
    assert_eq!(h.torrent_client.auth_calls().await, 0);
    assert_eq!(h.cursor.load(), 5);

    // Magnet shows up on the next poll.
    h.source.set_magnet(Some(fixtures::magnet("ABC"))).await;
    let outcome = monitor.run().await;

    assert_eq!(
        outcome,
        MonitorOutcome::Completed {
            episode: 5,
            next_episode: 6
        }
    );
    assert_eq!(h.torrent_client.submitted().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_authentication_failure_retries_whole_cycle() {
    let h = TestHarness::new(5);
    h.source.set_page(Some(DETAIL_PAGE)).await;
    h.source.set_magnet(Some(fixtures::magnet("ABC"))).await;
    h.torrent_client.fail_authentications(1).await;

    let started = Instant::now();
    let outcome = h.monitor().run().await;

    assert_eq!(
        outcome,
        MonitorOutcome::Completed {
            episode: 5,
            next_episode: 6
        }
    );
    assert!(started.elapsed() >= Duration::from_secs(CHECK_INTERVAL_SECS));
    // The listing is searched again after the failed login.
    assert_eq!(h.source.searched_episodes().await, vec![5, 5]);
    assert_eq!(h.torrent_client.auth_calls().await, 2);
    assert_eq!(h.torrent_client.submit_calls().await, 1);
    assert_eq!(h.cursor.load(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_submission_keeps_cursor_until_accepted() {
    let h = TestHarness::new(12);
    h.source.set_page(Some(DETAIL_PAGE)).await;
    h.source.set_magnet(Some(fixtures::magnet("DEF"))).await;
    h.torrent_client.fail_submissions(2).await;

    let outcome = h.monitor().run().await;

    assert_eq!(
        outcome,
        MonitorOutcome::Completed {
            episode: 12,
            next_episode: 13
        }
    );
    assert_eq!(h.torrent_client.submit_calls().await, 3);
    assert_eq!(h.torrent_client.submitted().await.len(), 1);
    assert_eq!(h.cursor.load(), 13);
}

#[tokio::test(start_paused = true)]
async fn test_locator_error_is_retried() {
    let h = TestHarness::new(5);
    h.source.set_page(Some(DETAIL_PAGE)).await;
    h.source.set_magnet(Some(fixtures::magnet("ABC"))).await;
    h.source
        .fail_next_search(LocatorError::HttpStatus {
            status: 503,
            url: "https://nyaa.si/?q=show".to_string(),
        })
        .await;

    let outcome = h.monitor().run().await;

    assert!(matches!(outcome, MonitorOutcome::Completed { episode: 5, .. }));
    assert_eq!(h.source.searched_episodes().await, vec![5, 5]);
}

#[tokio::test(start_paused = true)]
async fn test_missing_cursor_starts_from_first_episode() {
    let temp_dir = TempDir::new().unwrap();
    let cursor = CursorStore::new(temp_dir.path().join("episodio.json"));
    let source = Arc::new(MockEpisodeSource::new());
    let client = Arc::new(MockTorrentClient::new());
    source.set_page(Some(DETAIL_PAGE)).await;
    source.set_magnet(Some(fixtures::magnet("ABC"))).await;

    let monitor = EpisodeMonitor::new(
        MonitorConfig::new(temp_dir.path().join("downloads")),
        source.clone(),
        client,
        cursor.clone(),
    );

    let outcome = monitor.run().await;

    assert_eq!(
        outcome,
        MonitorOutcome::Completed {
            episode: 1,
            next_episode: 2
        }
    );
    assert_eq!(source.searched_episodes().await, vec![1]);
    assert_eq!(cursor.load(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_retry_sleep() {
    let h = TestHarness::new(5);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor = h.monitor().with_shutdown(shutdown_rx);

    let handle = tokio::spawn(async move { monitor.run().await });

    // Wait for the first (empty) cycle, then signal.
    while h.source.searched_episodes().await.is_empty() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    shutdown_tx.send(true).unwrap();

    let outcome = handle.await.unwrap();

    assert_eq!(outcome, MonitorOutcome::Cancelled { episode: 5 });
    assert_eq!(h.source.searched_episodes().await, vec![5]);
    assert!(h.torrent_client.submitted().await.is_empty());
    assert_eq!(h.cursor.load(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_cursor_save_failure_resubmits_on_next_cycle() {
    let h = TestHarness::new(5);
    // Replace the cursor file with a non-empty directory so the rename fails.
    std::fs::remove_file(h.cursor.path()).unwrap();
    std::fs::create_dir_all(h.cursor.path().join("blocker")).unwrap();
    h.source.set_page(Some(DETAIL_PAGE)).await;
    h.source.set_magnet(Some(fixtures::magnet("ABC"))).await;

    let monitor = h.monitor();
    let handle = tokio::spawn(async move { monitor.run().await });

    // Time only advances once the monitor is parked in its retry sleep, so
    // the failed save has happened by the time the first submit is seen.
    while h.torrent_client.submit_calls().await == 0 {
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    assert_eq!(h.source.searched_episodes().await.len(), 1);
    assert!(h.cursor.path().is_dir());
    std::fs::remove_dir_all(h.cursor.path()).unwrap();

    let outcome = handle.await.unwrap();

    // The unreadable cursor restarted from episode 1.
    assert_eq!(
        outcome,
        MonitorOutcome::Completed {
            episode: 1,
            next_episode: 2
        }
    );
    assert_eq!(h.source.searched_episodes().await, vec![1, 1]);
    assert_eq!(h.torrent_client.submitted().await.len(), 2);
    assert_eq!(h.cursor.load(), 2);
}
