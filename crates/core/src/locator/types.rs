//! Types for the episode locator.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while fetching listing or detail pages.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for LocatorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LocatorError::Timeout(e.to_string())
        } else if e.is_connect() {
            LocatorError::ConnectionFailed(e.to_string())
        } else {
            LocatorError::Request(e.to_string())
        }
    }
}

/// A row from the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentListing {
    /// Visible title of the detail anchor.
    pub title: String,
    /// Detail page href as it appears in the markup (site-relative).
    pub href: String,
}

/// A validated `magnet:?xt=urn:btih:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnetLink(String);

impl MagnetLink {
    /// Prefix every accepted magnet URI starts with.
    pub const PREFIX: &'static str = "magnet:?xt=urn:btih:";

    /// Wrap `uri` if it follows the magnet grammar.
    pub fn parse(uri: &str) -> Option<Self> {
        let hash = uri.strip_prefix(Self::PREFIX)?;
        if hash.is_empty() || hash.starts_with('&') {
            return None;
        }
        Some(Self(uri.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Info hash, lowercased, for logging.
    pub fn info_hash(&self) -> String {
        let rest = &self.0[Self::PREFIX.len()..];
        rest.split('&').next().unwrap_or(rest).to_ascii_lowercase()
    }
}

impl fmt::Display for MagnetLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for episode sources.
#[async_trait]
pub trait EpisodeSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Find the detail page URL for `episode`.
    ///
    /// `Ok(None)` means the episode is not listed yet.
    async fn find_episode_page(&self, episode: u32) -> Result<Option<String>, LocatorError>;

    /// Resolve a detail page to its magnet link.
    ///
    /// `Ok(None)` means the page has no magnet anchor.
    async fn extract_magnet(&self, page_url: &str) -> Result<Option<MagnetLink>, LocatorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnet_parse_valid() {
        let magnet = MagnetLink::parse("magnet:?xt=urn:btih:ABC123&dn=Show+-+05").unwrap();
        assert_eq!(magnet.as_str(), "magnet:?xt=urn:btih:ABC123&dn=Show+-+05");
        assert_eq!(magnet.info_hash(), "abc123");
        assert_eq!(magnet.to_string(), magnet.as_str());
    }

    #[test]
    fn test_magnet_parse_without_params() {
        let magnet = MagnetLink::parse("magnet:?xt=urn:btih:abc").unwrap();
        assert_eq!(magnet.info_hash(), "abc");
    }

    #[test]
    fn test_magnet_parse_invalid() {
        assert!(MagnetLink::parse("https://nyaa.si/download/1.torrent").is_none());
        assert!(MagnetLink::parse("magnet:?dn=Test").is_none());
        assert!(MagnetLink::parse("magnet:?xt=urn:btih:").is_none());
        assert!(MagnetLink::parse("magnet:?xt=urn:btih:&dn=x").is_none());
    }

    #[test]
    fn test_locator_error_display() {
        let err = LocatorError::HttpStatus {
            status: 503,
            url: "https://nyaa.si/".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503 from https://nyaa.si/");
    }
}
