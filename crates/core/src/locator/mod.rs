//! Episode locator.
//!
//! This module provides an `EpisodeSource` trait for finding an episode's
//! detail page on a torrent index and resolving it to a magnet link, plus the
//! HTML scraping implementation for nyaa-style listing pages.

mod nyaa;
mod pattern;
mod types;

pub use nyaa::{find_magnet, parse_listings, NyaaLocator};
pub use pattern::{render_template, EpisodePattern};
pub use types::*;
