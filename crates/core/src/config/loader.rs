use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{types::RawSettings, validate_settings, ConfigError, Settings};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "ANIMON_CONFIG";

/// Environment variables read as settings.
pub const ENV_KEYS: &[&str] = &[
    "ANIME_PADRAO",
    "SEARCH_URL",
    "EPISODIO_FILE",
    "QB_URL",
    "QB_USERNAME",
    "QB_PASSWORD",
    "SAVE_PATH",
    "CHECK_INTERVAL",
    "HTTP_TIMEOUT",
];

/// Load settings from the environment, layered over the TOML file named by
/// `ANIMON_CONFIG` when that variable is set.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    load_settings_from_path(path.as_deref())
}

/// Load settings from an optional TOML file with environment variable overrides
pub fn load_settings_from_path(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let raw: RawSettings = figment
        .merge(Serialized::defaults(env_values()))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    validate_settings(raw)
}

/// Set `ENV_KEYS` as verbatim strings, keyed by their lower-case names.
///
/// Values are not run through figment's env value parser, which would read
/// `QB_PASSWORD=007` as the integer 7.
fn env_values() -> BTreeMap<String, String> {
    ENV_KEYS
        .iter()
        .filter_map(|key| {
            std::env::var(key)
                .ok()
                .map(|value| (key.to_ascii_lowercase(), value))
        })
        .collect()
}

/// Load settings from a TOML string (useful for testing)
pub fn load_settings_from_str(toml_str: &str) -> Result<Settings, ConfigError> {
    let raw: RawSettings =
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_settings(raw)
}
