//! Mock episode source for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::locator::{EpisodeSource, LocatorError, MagnetLink};

/// Mock implementation of the EpisodeSource trait.
///
/// Provides controllable behavior for testing:
/// - Return a fixed or scripted detail page per search
/// - Record searched episodes and magnet requests
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// let source = MockEpisodeSource::new();
///
/// // Not listed on the first poll, listed on the second
/// source.queue_pages(vec![None, Some("https://nyaa.si/view/1".into())]).await;
/// source.set_magnet(MagnetLink::parse("magnet:?xt=urn:btih:abc")).await;
///
/// let searched = source.searched_episodes().await;
/// ```
#[derive(Debug)]
pub struct MockEpisodeSource {
    /// Page returned once the scripted pages run out.
    page: Arc<RwLock<Option<String>>>,
    /// Scripted pages, consumed one per search.
    scripted_pages: Arc<RwLock<VecDeque<Option<String>>>>,
    /// Magnet returned for every detail page.
    magnet: Arc<RwLock<Option<MagnetLink>>>,
    /// If set, the next search will fail with this error.
    next_search_error: Arc<RwLock<Option<LocatorError>>>,
    /// If set, the next magnet extraction will fail with this error.
    next_extract_error: Arc<RwLock<Option<LocatorError>>>,
    /// Episodes passed to find_episode_page.
    searches: Arc<RwLock<Vec<u32>>>,
    /// Page URLs passed to extract_magnet.
    magnet_requests: Arc<RwLock<Vec<String>>>,
}

impl Default for MockEpisodeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEpisodeSource {
    /// Create a mock source that lists nothing.
    pub fn new() -> Self {
        Self {
            page: Arc::new(RwLock::new(None)),
            scripted_pages: Arc::new(RwLock::new(VecDeque::new())),
            magnet: Arc::new(RwLock::new(None)),
            next_search_error: Arc::new(RwLock::new(None)),
            next_extract_error: Arc::new(RwLock::new(None)),
            searches: Arc::new(RwLock::new(Vec::new())),
            magnet_requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the page returned by every search.
    pub async fn set_page(&self, page: Option<&str>) {
        *self.page.write().await = page.map(str::to_string);
    }

    /// Queue pages returned by the next searches, in order.
    pub async fn queue_pages(&self, pages: Vec<Option<String>>) {
        self.scripted_pages.write().await.extend(pages);
    }

    /// Set the magnet returned for any detail page.
    pub async fn set_magnet(&self, magnet: Option<MagnetLink>) {
        *self.magnet.write().await = magnet;
    }

    /// Configure the next search to fail with the given error.
    pub async fn fail_next_search(&self, error: LocatorError) {
        *self.next_search_error.write().await = Some(error);
    }

    /// Configure the next magnet extraction to fail with the given error.
    pub async fn fail_next_extract(&self, error: LocatorError) {
        *self.next_extract_error.write().await = Some(error);
    }

    /// Episodes searched so far.
    pub async fn searched_episodes(&self) -> Vec<u32> {
        self.searches.read().await.clone()
    }

    /// Detail pages requested so far.
    pub async fn magnet_requests(&self) -> Vec<String> {
        self.magnet_requests.read().await.clone()
    }
}

#[async_trait]
impl EpisodeSource for MockEpisodeSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn find_episode_page(&self, episode: u32) -> Result<Option<String>, LocatorError> {
        self.searches.write().await.push(episode);

        if let Some(error) = self.next_search_error.write().await.take() {
            return Err(error);
        }

        if let Some(page) = self.scripted_pages.write().await.pop_front() {
            return Ok(page);
        }

        Ok(self.page.read().await.clone())
    }

    async fn extract_magnet(&self, page_url: &str) -> Result<Option<MagnetLink>, LocatorError> {
        self.magnet_requests.write().await.push(page_url.to_string());

        if let Some(error) = self.next_extract_error.write().await.take() {
            return Err(error);
        }

        Ok(self.magnet.read().await.clone())
    }
}
