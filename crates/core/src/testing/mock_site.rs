//! Mock site provider for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::brush::SiteTorrent;
use crate::site::{SiteError, SiteProvider};

/// Mock implementation of the SiteProvider trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable candidate list
/// - Track downloaded torrent ids for assertions
/// - Simulate listing and download failures
///
/// # Example
///
/// ```rust,ignore
/// let site = MockSiteProvider::new("alpha");
/// site.set_candidates(vec![fixtures::free_site_torrent("1", now)]).await;
///
/// let candidates = site.list_candidates().await?;
/// assert_eq!(candidates.len(), 1);
/// ```
pub struct MockSiteProvider {
    name: String,
    candidates: Arc<RwLock<Vec<SiteTorrent>>>,
    /// Ids of downloaded torrents, in call order.
    downloads: Arc<RwLock<Vec<String>>>,
    /// If set, the next listing will fail with this error.
    next_error: Arc<RwLock<Option<SiteError>>>,
    /// Downloads of these ids always fail.
    failing_ids: Arc<RwLock<HashSet<String>>>,
}

impl MockSiteProvider {
    /// Create a mock site with no candidates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            candidates: Arc::new(RwLock::new(Vec::new())),
            downloads: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing_ids: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Set the candidates returned by `list_candidates`.
    pub async fn set_candidates(&self, candidates: Vec<SiteTorrent>) {
        *self.candidates.write().await = candidates;
    }

    /// Get the ids of all downloaded torrents.
    pub async fn downloaded(&self) -> Vec<String> {
        self.downloads.read().await.clone()
    }

    /// Configure the next listing to fail with the given error.
    pub async fn set_next_error(&self, error: SiteError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make downloads of this torrent id fail.
    pub async fn fail_download(&self, torrent_id: &str) {
        self.failing_ids.write().await.insert(torrent_id.to_string());
    }
}

#[async_trait]
impl SiteProvider for MockSiteProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_candidates(&self) -> Result<Vec<SiteTorrent>, SiteError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        Ok(self.candidates.read().await.clone())
    }

    async fn download_torrent(
        &self,
        torrent_id: &str,
        download_url: &str,
    ) -> Result<Vec<u8>, SiteError> {
        if self.failing_ids.read().await.contains(torrent_id) {
            return Err(SiteError::DownloadFailed(download_url.to_string()));
        }
        self.downloads.write().await.push(torrent_id.to_string());
        Ok(format!("d8:announce{}:{}e", download_url.len(), download_url).into_bytes())
    }
}
