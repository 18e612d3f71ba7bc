//! Listing-page scraper for nyaa-style torrent indexes.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::config::LocatorConfig;
use crate::transport::{send_with_retry, RetryPolicy};

use super::pattern::EpisodePattern;
use super::{EpisodeSource, LocatorError, MagnetLink, TorrentListing};

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.torrent-list tbody tr").expect("valid row selector"));

static TITLE_CELL_ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td:nth-of-type(2) a[href]").expect("valid anchor selector"));

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Episode locator that scrapes a listing page and its detail pages.
pub struct NyaaLocator {
    client: Client,
    config: LocatorConfig,
    retry: RetryPolicy,
}

impl NyaaLocator {
    /// Create a locator using the shared HTTP client.
    pub fn new(client: Client, config: LocatorConfig) -> Self {
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

    /// Fetch a page body, failing on non-2xx statuses.
    async fn fetch_page(&self, url: &str) -> Result<String, LocatorError> {
        debug!(url = url, "GET");
        let response = send_with_retry(&self.retry, self.client.get(url)).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocatorError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    /// Absolute detail page URL for a site-relative href.
    fn detail_url(&self, href: &str) -> Result<String, LocatorError> {
        self.config
            .search_url
            .join(href)
            .map(|url| url.to_string())
            .map_err(|e| LocatorError::InvalidUrl(format!("{}: {}", href, e)))
    }
}

#[async_trait]
impl EpisodeSource for NyaaLocator {
    fn name(&self) -> &str {
        "nyaa"
    }

    async fn find_episode_page(&self, episode: u32) -> Result<Option<String>, LocatorError> {
        info!(episode, "Searching for episode {:02}", episode);

        let pattern = EpisodePattern::build(&self.config.episode_pattern, episode);
        let body = self.fetch_page(self.config.search_url.as_str()).await?;
        let listings = parse_listings(&body, &self.config.detail_prefix);
        debug!(rows = listings.len(), "Parsed listing page");

        match listings.iter().find(|listing| pattern.matches(&listing.title)) {
            Some(listing) => {
                info!(title = %listing.title, "Found episode {:02}", episode);
                self.detail_url(&listing.href).map(Some)
            }
            None => {
                info!(episode, pattern = pattern.as_str(), "Episode {:02} not listed yet", episode);
                Ok(None)
            }
        }
    }

    async fn extract_magnet(&self, page_url: &str) -> Result<Option<MagnetLink>, LocatorError> {
        info!(url = page_url, "Fetching detail page");

        let body = self.fetch_page(page_url).await?;
        let magnet = find_magnet(&body);
        if magnet.is_none() {
            warn!(url = page_url, "No magnet link on detail page");
        }
        Ok(magnet)
    }
}

/// Extract listing rows in document order.
///
/// Each row contributes the first anchor in its second cell whose href
/// starts with `detail_prefix` and which is not a comments link. Rows
/// without such an anchor are skipped.
pub fn parse_listings(html: &str, detail_prefix: &str) -> Vec<TorrentListing> {
    let document = Html::parse_document(html);

    document
        .select(&ROW_SELECTOR)
        .filter_map(|row| {
            row.select(&TITLE_CELL_ANCHOR_SELECTOR)
                .find(|anchor| is_detail_anchor(anchor, detail_prefix))
                .map(|anchor| TorrentListing {
                    title: anchor.text().collect::<String>().trim().to_string(),
                    href: anchor.value().attr("href").unwrap_or_default().to_string(),
                })
        })
        .collect()
}

fn is_detail_anchor(anchor: &ElementRef<'_>, detail_prefix: &str) -> bool {
    let element = anchor.value();
    let href = element.attr("href").unwrap_or_default();
    href.starts_with(detail_prefix) && !element.classes().any(|class| class == "comments")
}

/// First anchor on the page whose href is a magnet link.
pub fn find_magnet(html: &str) -> Option<MagnetLink> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .find_map(MagnetLink::parse)
}
