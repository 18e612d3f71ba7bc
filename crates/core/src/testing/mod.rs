//! Testing utilities and mock implementations.
//!
//! Mocks for the locator and download client seams, so the monitor can be
//! driven without a real index or qBittorrent instance.
//!
//! # Example
//!
//! ```rust,ignore
//! use animon_core::testing::{fixtures, MockEpisodeSource, MockTorrentClient};
//!
//! let source = MockEpisodeSource::new();
//! let client = MockTorrentClient::new();
//!
//! source.set_page(Some("https://nyaa.si/view/1")).await;
//! source.set_magnet(Some(fixtures::magnet("abc123"))).await;
//! ```

mod mock_episode_source;
mod mock_torrent_client;

pub use mock_episode_source::MockEpisodeSource;
pub use mock_torrent_client::{MockTorrentClient, RecordedSubmission};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::locator::MagnetLink;

    /// A magnet link for the given info hash.
    pub fn magnet(info_hash: &str) -> MagnetLink {
        MagnetLink::parse(&format!("{}{}&dn=fixture", MagnetLink::PREFIX, info_hash))
            .unwrap_or_else(|| panic!("invalid fixture hash {:?}", info_hash))
    }

    /// A listing row shaped like nyaa's, including the comments anchor that
    /// shares the title cell.
    pub fn listing_row(id: u32, title: &str) -> String {
        format!(
            r#"<tr class="default">
<td><a href="/?c=1_2" title="Anime - English-translated">cat</a></td>
<td colspan="2">
  <a href="/view/{id}#comments" class="comments" title="comments"><i class="fa fa-comments-o"></i>2</a>
  <a href="/view/{id}" title="{title}">{title}</a>
</td>
<td class="text-center"><a href="/download/{id}.torrent"><i class="fa fa-fw fa-download"></i></a></td>
<td class="text-center">1.4 GiB</td>
</tr>"#
        )
    }

    /// A listing page wrapping the given rows.
    pub fn listing_page(rows: &[String]) -> String {
        format!(
            r#"<!DOCTYPE html>
<html><body>
<div class="table-responsive">
<table class="table table-bordered table-hover table-striped torrent-list">
<thead><tr><th>Category</th><th>Name</th><th>Link</th><th>Size</th></tr></thead>
<tbody>
{}
</tbody>
</table>
</div>
</body></html>"#,
            rows.join("\n")
        )
    }

    /// A detail page; `magnet` of `None` renders only the .torrent link.
    pub fn detail_page(magnet: Option<&MagnetLink>) -> String {
        let magnet_anchor = magnet
            .map(|m| {
                format!(
                    r#"<a class="card-footer-item" href="{}"><i class="fa fa-magnet fa-fw"></i>Magnet</a>"#,
                    m.as_str().replace('&', "&amp;")
                )
            })
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html><body>
<div class="panel-footer clearfix">
<a href="/download/1.torrent"><i class="fa fa-download fa-fw"></i>Download Torrent</a> {}
</div>
</body></html>"#,
            magnet_anchor
        )
    }
}
