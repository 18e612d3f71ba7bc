//! Download client abstraction.
//!
//! This module provides a `TorrentClient` trait for handing magnet links to a
//! download client, and the qBittorrent Web API implementation.

mod qbittorrent;
mod types;

pub use qbittorrent::QBittorrentClient;
pub use types::*;
