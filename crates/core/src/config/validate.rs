use std::path::PathBuf;
use url::Url;

use super::types::{default_detail_prefix, LocatorConfig, QBittorrentConfig, RawSettings, Settings};
use super::ConfigError;
use crate::monitor::MonitorConfig;

/// Validate raw settings and build the runtime configuration.
///
/// Checks:
/// - every required key is present and not blank (all missing keys are reported together)
/// - SEARCH_URL is an absolute URL
/// - CHECK_INTERVAL and HTTP_TIMEOUT are not 0
pub fn validate_settings(raw: RawSettings) -> Result<Settings, ConfigError> {
    let mut missing = Vec::new();

    let mut need = |name: &str, value: Option<String>| -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                missing.push(name.to_string());
                String::new()
            }
        }
    };

    let episode_pattern = need("ANIME_PADRAO", raw.episode_pattern);
    let search_url = need("SEARCH_URL", raw.search_url);
    let cursor_file = need("EPISODIO_FILE", raw.cursor_file);
    let qb_url = need("QB_URL", raw.qb_url);
    let qb_username = need("QB_USERNAME", raw.qb_username);
    let qb_password = need("QB_PASSWORD", raw.qb_password);
    let save_path = need("SAVE_PATH", raw.save_path);

    if !missing.is_empty() {
        return Err(ConfigError::MissingKeys(missing));
    }

    let search_url = Url::parse(search_url.trim()).map_err(|e| ConfigError::InvalidValue {
        key: "SEARCH_URL".to_string(),
        reason: e.to_string(),
    })?;

    if raw.check_interval == 0 {
        return Err(ConfigError::InvalidValue {
            key: "CHECK_INTERVAL".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    if raw.http_timeout == 0 {
        return Err(ConfigError::InvalidValue {
            key: "HTTP_TIMEOUT".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    Ok(Settings {
        locator: LocatorConfig {
            search_url,
            episode_pattern,
            detail_prefix: default_detail_prefix(),
        },
        qbittorrent: QBittorrentConfig {
            url: qb_url.trim().trim_end_matches('/').to_string(),
            username: qb_username,
            password: qb_password,
        },
        monitor: MonitorConfig {
            check_interval_secs: raw.check_interval,
            save_path: PathBuf::from(save_path),
        },
        cursor_file: PathBuf::from(cursor_file),
        http_timeout_secs: raw.http_timeout,
    })
}
