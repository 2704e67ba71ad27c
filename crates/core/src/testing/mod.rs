//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the collaborator traits,
//! allowing the runner and the HTTP API to be tested without a real torrent
//! client or tracker site.
//!
//! # Example
//!
//! ```rust,ignore
//! use brush_core::testing::{fixtures, MockBrushClient, MockSiteProvider};
//!
//! let client = MockBrushClient::new();
//! let site = MockSiteProvider::new("alpha");
//!
//! // Configure mock responses
//! client.set_status(fixtures::client_status(100 * GIB)).await;
//! site.set_candidates(vec![fixtures::free_site_torrent("1", now)]).await;
//!
//! // Hand both to a BrushRunner...
//! ```

mod mock_brush_client;
mod mock_site;

pub use mock_brush_client::{MockBrushClient, RecordedCall};
pub use mock_site::MockSiteProvider;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::brush::constants::{GIB, KIB};
    use crate::brush::{ClientStatus, ClientTorrent, SiteTorrent, TorrentState};

    /// Status with the given free space and no bandwidth in use.
    pub fn client_status(free_space_on_disk: i64) -> ClientStatus {
        ClientStatus {
            free_space_on_disk,
            ..Default::default()
        }
    }

    /// A complete 1 GiB torrent with reasonable defaults.
    pub fn client_torrent(info_hash: &str) -> ClientTorrent {
        ClientTorrent {
            info_hash: info_hash.to_string(),
            name: format!("Torrent.{}", info_hash),
            state: TorrentState::Seeding,
            size_completed: GIB,
            size: GIB,
            atime: 1,
            ctime: 2,
            ..Default::default()
        }
    }

    /// A complete, idle torrent added at `atime`.
    pub fn seeding_torrent(info_hash: &str, atime: i64) -> ClientTorrent {
        ClientTorrent {
            atime,
            ctime: atime + 600,
            ..client_torrent(info_hash)
        }
    }

    /// An incomplete torrent added at `atime`, downloading at 1 MiB/s.
    pub fn downloading_torrent(info_hash: &str, atime: i64) -> ClientTorrent {
        ClientTorrent {
            state: TorrentState::Downloading,
            size_completed: GIB / 2,
            download_speed: 1024 * KIB,
            atime,
            ctime: 0,
            ..client_torrent(info_hash)
        }
    }

    /// A free, freshly published 1 GiB site torrent in demand.
    pub fn free_site_torrent(id: &str, now: i64) -> SiteTorrent {
        SiteTorrent {
            id: id.to_string(),
            name: format!("Release.{}", id),
            size: GIB,
            seeders: 2,
            leechers: 20,
            download_url: format!("https://tracker.example/download.php?id={}", id),
            download_multiplier: 0.0,
            time: now - 60,
            ..Default::default()
        }
    }
}
