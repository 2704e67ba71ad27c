//! Types for torrent client operations.

use async_trait::async_trait;
use thiserror::Error;

use crate::brush::{ClientStatus, ClientTorrent, MetaMap};

/// Errors that can occur during torrent client operations.
#[derive(Debug, Error)]
pub enum BrushClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Torrent not found: {0}")]
    TorrentNotFound(String),

    #[error("Invalid torrent data: {0}")]
    InvalidTorrent(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,
}

/// Change to apply to an existing torrent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifyTorrentRequest {
    /// New download speed limit in bytes/second.
    pub download_speed_limit: Option<i64>,
    /// Full replacement metadata map.
    pub meta: Option<MetaMap>,
}

impl ModifyTorrentRequest {
    /// Replace the metadata only.
    pub fn meta(meta: MetaMap) -> Self {
        Self {
            download_speed_limit: None,
            meta: Some(meta),
        }
    }

    /// Set the download speed limit.
    pub fn with_download_speed_limit(mut self, limit: i64) -> Self {
        self.download_speed_limit = Some(limit);
        self
    }
}

/// Request to add a new torrent.
#[derive(Debug, Clone, PartialEq)]
pub struct AddTorrentRequest {
    /// Raw .torrent file bytes.
    pub data: Vec<u8>,
    /// Display name (for logging).
    pub name: String,
    /// Initial metadata map.
    pub meta: MetaMap,
    /// Per-torrent upload limit in bytes/second (0 = unlimited).
    pub upload_speed_limit: i64,
}

/// Trait for torrent client backends.
#[async_trait]
pub trait BrushClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Current bandwidth and disk snapshot.
    async fn status(&self) -> Result<ClientStatus, BrushClientError>;

    /// All torrents managed by brushing.
    async fn list_torrents(&self) -> Result<Vec<ClientTorrent>, BrushClientError>;

    /// Remove a torrent together with its files.
    async fn delete_torrent(&self, info_hash: &str) -> Result<(), BrushClientError>;

    /// Change speed limits and/or metadata of a torrent.
    async fn modify_torrent(
        &self,
        info_hash: &str,
        request: ModifyTorrentRequest,
    ) -> Result<(), BrushClientError>;

    /// Resume a paused or errored torrent.
    async fn resume_torrent(&self, info_hash: &str) -> Result<(), BrushClientError>;

    /// Add a new torrent, returning its info hash.
    async fn add_torrent(&self, request: AddTorrentRequest) -> Result<String, BrushClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modify_request_builder() {
        let meta: MetaMap = [("stt".to_string(), 10)].into_iter().collect();
        let req = ModifyTorrentRequest::meta(meta.clone()).with_download_speed_limit(1);
        assert_eq!(req.download_speed_limit, Some(1));
        assert_eq!(req.meta, Some(meta));
    }

    #[test]
    fn test_error_display() {
        let err = BrushClientError::TorrentNotFound("abc123".to_string());
        assert_eq!(err.to_string(), "Torrent not found: abc123");
        assert_eq!(BrushClientError::Timeout.to_string(), "Request timeout");
    }
}
