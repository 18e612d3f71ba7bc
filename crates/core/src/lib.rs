pub mod config;
pub mod cursor;
pub mod locator;
pub mod monitor;
pub mod testing;
pub mod torrent_client;
pub mod transport;

pub use config::{
    load_settings, load_settings_from_path, load_settings_from_str, validate_settings,
    ConfigError, LocatorConfig, QBittorrentConfig, RawSettings, SanitizedSettings, Settings,
};
pub use cursor::{CursorError, CursorStore, FIRST_EPISODE};
pub use locator::{EpisodePattern, EpisodeSource, LocatorError, MagnetLink, NyaaLocator};
pub use monitor::{
    CycleOutcome, EpisodeMonitor, MonitorConfig, MonitorError, MonitorOutcome, MonitorState,
};
pub use torrent_client::{DownloadJob, QBittorrentClient, TorrentClient, TorrentClientError};
pub use transport::{build_http_client, RetryPolicy};
