//! Types for site providers.

use async_trait::async_trait;
use thiserror::Error;

use crate::brush::SiteTorrent;

/// Errors that can occur while talking to a tracker site.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Site connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Torrent download failed: {0}")]
    DownloadFailed(String),

    #[error("Request timeout")]
    Timeout,
}

/// Trait for tracker site backends.
#[async_trait]
pub trait SiteProvider: Send + Sync {
    /// Site name; matches a `[[sites]]` entry in the configuration.
    fn name(&self) -> &str;

    /// Torrents currently listed on the site.
    async fn list_candidates(&self) -> Result<Vec<SiteTorrent>, SiteError>;

    /// Fetch the .torrent file of a listed torrent.
    async fn download_torrent(&self, torrent_id: &str, download_url: &str)
        -> Result<Vec<u8>, SiteError>;
}
