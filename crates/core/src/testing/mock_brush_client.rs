//! Mock brush client for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::brush::{ClientStatus, ClientTorrent, TorrentState};
use crate::torrent_client::{
    AddTorrentRequest, BrushClient, BrushClientError, ModifyTorrentRequest,
};

/// A recorded mutating call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Delete(String),
    Modify {
        info_hash: String,
        request: ModifyTorrentRequest,
    },
    Resume(String),
    Add(AddTorrentRequest),
}

/// Mock implementation of the BrushClient trait.
///
/// Provides controllable behavior for testing:
/// - Configurable status snapshot and inventory
/// - Applies every successful call to its inventory
/// - Records mutating calls for assertions
/// - Simulates failures, once or per torrent
///
/// # Example
///
/// ```rust,ignore
/// let client = MockBrushClient::new();
/// client.add_mock_torrent(fixtures::seeding_torrent("abc123", now - 3600)).await;
///
/// client.delete_torrent("abc123").await?;
/// assert!(!client.has_torrent("abc123").await);
/// assert_eq!(client.calls().await, vec![RecordedCall::Delete("abc123".into())]);
/// ```
#[derive(Debug)]
pub struct MockBrushClient {
    status: Arc<RwLock<ClientStatus>>,
    /// Inventory in insertion order.
    torrents: Arc<RwLock<Vec<ClientTorrent>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<BrushClientError>>>,
    /// Operations on these hashes always fail.
    failing_hashes: Arc<RwLock<HashSet<String>>>,
    /// Counter for generating unique hashes.
    hash_counter: Arc<RwLock<u32>>,
}

impl Default for MockBrushClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBrushClient {
    /// Create a new mock client with an empty inventory and unknown disk space.
    pub fn new() -> Self {
        Self {
            status: Arc::new(RwLock::new(ClientStatus {
                free_space_on_disk: -1,
                ..Default::default()
            })),
            torrents: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing_hashes: Arc::new(RwLock::new(HashSet::new())),
            hash_counter: Arc::new(RwLock::new(0)),
        }
    }

    /// Set the status snapshot returned by `status`.
    pub async fn set_status(&self, status: ClientStatus) {
        *self.status.write().await = status;
    }

    /// Pre-populate a torrent.
    pub async fn add_mock_torrent(&self, torrent: ClientTorrent) {
        self.torrents.write().await.push(torrent);
    }

    /// Get a torrent by hash.
    pub async fn torrent(&self, hash: &str) -> Option<ClientTorrent> {
        self.torrents
            .read()
            .await
            .iter()
            .find(|t| t.info_hash == hash)
            .cloned()
    }

    /// Check if a torrent exists.
    pub async fn has_torrent(&self, hash: &str) -> bool {
        self.torrent(hash).await.is_some()
    }

    /// Get the number of torrents.
    pub async fn torrent_count(&self) -> usize {
        self.torrents.read().await.len()
    }

    /// Get all recorded mutating calls.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: BrushClientError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every operation on this hash fail.
    pub async fn fail_hash(&self, hash: &str) {
        self.failing_hashes.write().await.insert(hash.to_string());
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<BrushClientError> {
        self.next_error.write().await.take()
    }

    async fn check(&self, hash: &str) -> Result<(), BrushClientError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if self.failing_hashes.read().await.contains(hash) {
            return Err(BrushClientError::ApiError(format!("rejected {}", hash)));
        }
        Ok(())
    }

    /// Generate a unique mock hash.
    async fn generate_hash(&self) -> String {
        let mut counter = self.hash_counter.write().await;
        *counter += 1;
        format!("mockhash{:08x}", *counter)
    }
}

#[async_trait]
impl BrushClient for MockBrushClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn status(&self) -> Result<ClientStatus, BrushClientError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.status.read().await.clone())
    }

    async fn list_torrents(&self) -> Result<Vec<ClientTorrent>, BrushClientError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.torrents.read().await.clone())
    }

    async fn delete_torrent(&self, info_hash: &str) -> Result<(), BrushClientError> {
        self.check(info_hash).await?;
        let mut torrents = self.torrents.write().await;
        let before = torrents.len();
        torrents.retain(|t| t.info_hash != info_hash);
        if torrents.len() == before {
            return Err(BrushClientError::TorrentNotFound(info_hash.to_string()));
        }
        self.calls
            .write()
            .await
            .push(RecordedCall::Delete(info_hash.to_string()));
        Ok(())
    }

    async fn modify_torrent(
        &self,
        info_hash: &str,
        request: ModifyTorrentRequest,
    ) -> Result<(), BrushClientError> {
        self.check(info_hash).await?;
        let mut torrents = self.torrents.write().await;
        let torrent = torrents
            .iter_mut()
            .find(|t| t.info_hash == info_hash)
            .ok_or_else(|| BrushClientError::TorrentNotFound(info_hash.to_string()))?;
        if let Some(limit) = request.download_speed_limit {
            torrent.download_speed_limit = limit;
        }
        if let Some(meta) = &request.meta {
            torrent.meta = meta.clone();
        }
        self.calls.write().await.push(RecordedCall::Modify {
            info_hash: info_hash.to_string(),
            request,
        });
        Ok(())
    }

    async fn resume_torrent(&self, info_hash: &str) -> Result<(), BrushClientError> {
        self.check(info_hash).await?;
        let mut torrents = self.torrents.write().await;
        let torrent = torrents
            .iter_mut()
            .find(|t| t.info_hash == info_hash)
            .ok_or_else(|| BrushClientError::TorrentNotFound(info_hash.to_string()))?;
        torrent.state = if torrent.is_complete() {
            TorrentState::Seeding
        } else {
            TorrentState::Downloading
        };
        self.calls
            .write()
            .await
            .push(RecordedCall::Resume(info_hash.to_string()));
        Ok(())
    }

    async fn add_torrent(&self, request: AddTorrentRequest) -> Result<String, BrushClientError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if request.data.is_empty() {
            return Err(BrushClientError::InvalidTorrent(request.name));
        }

        let hash = self.generate_hash().await;
        self.torrents.write().await.push(ClientTorrent {
            info_hash: hash.clone(),
            name: request.name.clone(),
            state: TorrentState::Downloading,
            atime: Utc::now().timestamp(),
            meta: request.meta.clone(),
            ..Default::default()
        });
        self.calls.write().await.push(RecordedCall::Add(request));
        Ok(hash)
    }
}
