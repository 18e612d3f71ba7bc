use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use url::Url;

use crate::monitor::MonitorConfig;

/// Settings exactly as read from the environment or config file.
///
/// Required keys are optional here so validation can report every missing
/// key at once instead of failing on the first one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettings {
    #[serde(default, rename = "anime_padrao", deserialize_with = "lenient_string")]
    pub episode_pattern: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub search_url: Option<String>,
    #[serde(default, rename = "episodio_file", deserialize_with = "lenient_string")]
    pub cursor_file: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub qb_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub qb_username: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub qb_password: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub save_path: Option<String>,
    #[serde(default = "default_check_interval", deserialize_with = "lenient_u64")]
    pub check_interval: u64,
    #[serde(default = "default_http_timeout", deserialize_with = "lenient_u64")]
    pub http_timeout: u64,
}

pub(crate) fn default_check_interval() -> u64 {
    300
}

pub(crate) fn default_http_timeout() -> u64 {
    15
}

/// Scalar as it may appear in the TOML file: `qb_password = 1234` is an
/// integer there. Environment values always arrive as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Int(i) if i >= 0 => Ok(i as u64),
        Scalar::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected a number of seconds, got {:?}", s))),
        other => Err(serde::de::Error::custom(format!(
            "expected a non-negative number of seconds, got {:?}",
            other.into_string()
        ))),
    }
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub locator: LocatorConfig,
    pub qbittorrent: QBittorrentConfig,
    pub monitor: MonitorConfig,
    /// Where the next-episode cursor is persisted.
    pub cursor_file: PathBuf,
    /// Per-request timeout shared by every HTTP call.
    pub http_timeout_secs: u64,
}

/// Listing-page configuration for the episode locator.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Listing page to poll.
    pub search_url: Url,
    /// Title template, e.g. `Show - {ep:02d}`.
    pub episode_pattern: String,
    /// Detail page hrefs start with this prefix.
    pub detail_prefix: String,
}

impl LocatorConfig {
    pub fn new(search_url: Url, episode_pattern: impl Into<String>) -> Self {
        Self {
            search_url,
            episode_pattern: episode_pattern.into(),
            detail_prefix: default_detail_prefix(),
        }
    }
}

pub(crate) fn default_detail_prefix() -> String {
    "/view/".to_string()
}

/// qBittorrent Web API configuration.
#[derive(Clone)]
pub struct QBittorrentConfig {
    /// Base URL (e.g., "http://localhost:8080"), no trailing slash.
    pub url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for QBittorrentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QBittorrentConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings safe to print at startup (secrets redacted).
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSettings {
    pub search_url: String,
    pub episode_pattern: String,
    pub cursor_file: String,
    pub qb_url: String,
    pub qb_username: String,
    pub qb_password_configured: bool,
    pub save_path: String,
    pub check_interval_secs: u64,
    pub http_timeout_secs: u64,
}

impl From<&Settings> for SanitizedSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            search_url: settings.locator.search_url.to_string(),
            episode_pattern: settings.locator.episode_pattern.clone(),
            cursor_file: settings.cursor_file.display().to_string(),
            qb_url: settings.qbittorrent.url.clone(),
            qb_username: settings.qbittorrent.username.clone(),
            qb_password_configured: !settings.qbittorrent.password.is_empty(),
            save_path: settings.monitor.save_path.display().to_string(),
            check_interval_secs: settings.monitor.check_interval_secs,
            http_timeout_secs: settings.http_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_raw_settings_with_defaults() {
        let toml = r#"
anime_padrao = "Show - {ep:02d}"
search_url = "https://nyaa.si/?q=show"
"#;
        let raw: RawSettings = toml::from_str(toml).unwrap();
        assert_eq!(raw.episode_pattern.as_deref(), Some("Show - {ep:02d}"));
        assert_eq!(raw.search_url.as_deref(), Some("https://nyaa.si/?q=show"));
        assert!(raw.qb_url.is_none());
        assert_eq!(raw.check_interval, 300);
        assert_eq!(raw.http_timeout, 15);
    }

    #[test]
    fn test_numeric_password_is_kept_as_string() {
        let toml = r#"
qb_password = 12345
check_interval = "60"
"#;
        let raw: RawSettings = toml::from_str(toml).unwrap();
        assert_eq!(raw.qb_password.as_deref(), Some("12345"));
        assert_eq!(raw.check_interval, 60);
    }

    #[test]
    fn test_negative_interval_rejected() {
        let toml = "check_interval = -5";
        let result: Result<RawSettings, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_qbittorrent_debug_redacts_password() {
        let config = QBittorrentConfig {
            url: "http://localhost:8080".to_string(),
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        };
        let printed = format!("{:?}", config);
        assert!(printed.contains("admin"));
        assert!(!printed.contains("hunter2"));
    }
}
