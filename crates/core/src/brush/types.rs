//! Inputs and outputs of the brush engine.

use serde::{Deserialize, Serialize};

use super::meta::{MetaMap, TorrentMeta};

/// Bandwidth and disk snapshot of a torrent client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStatus {
    /// Free bytes on the download disk; -1 when unknown.
    pub free_space_on_disk: i64,
    pub upload_speed: i64,
    /// 0 = unlimited.
    #[serde(default)]
    pub upload_speed_limit: i64,
    #[serde(default)]
    pub download_speed: i64,
    #[serde(default)]
    pub download_speed_limit: i64,
}

impl ClientStatus {
    pub fn disk_space_known(&self) -> bool {
        self.free_space_on_disk >= 0
    }
}

/// State of a client torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorrentState {
    Downloading,
    Seeding,
    Completed,
    Paused,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TorrentState {
    /// Returns the string representation for API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            TorrentState::Downloading => "downloading",
            TorrentState::Seeding => "seeding",
            TorrentState::Completed => "completed",
            TorrentState::Paused => "paused",
            TorrentState::Error => "error",
            TorrentState::Unknown => "unknown",
        }
    }
}

/// A torrent currently managed by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientTorrent {
    /// Info hash (lowercase hex).
    pub info_hash: String,
    pub name: String,
    pub state: TorrentState,
    pub size_completed: i64,
    pub size: i64,
    pub upload_speed: i64,
    pub download_speed: i64,
    /// Total uploaded bytes.
    pub uploaded: i64,
    /// Unix time the torrent was added.
    pub atime: i64,
    /// Unix time the download completed; 0 while incomplete.
    #[serde(default)]
    pub ctime: i64,
    #[serde(default)]
    pub download_speed_limit: i64,
    #[serde(default)]
    pub meta: MetaMap,
}

impl ClientTorrent {
    pub fn is_complete(&self) -> bool {
        self.ctime > 0
    }

    pub fn typed_meta(&self) -> TorrentMeta {
        TorrentMeta::from_map(&self.meta)
    }

    /// Uploaded / completed bytes. Torrents with nothing downloaded have no ratio.
    pub fn ratio(&self) -> Option<f64> {
        (self.size_completed > 0).then(|| self.uploaded as f64 / self.size_completed as f64)
    }
}

/// A torrent listed on a tracker site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteTorrent {
    /// Site-side torrent id.
    pub id: String,
    pub name: String,
    pub size: i64,
    pub seeders: i64,
    pub leechers: i64,
    pub download_url: String,
    /// Already downloading or seeding on this account.
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub has_hnr: bool,
    #[serde(default = "default_multiplier")]
    pub upload_multiplier: f64,
    /// 0 = free.
    #[serde(default = "default_multiplier")]
    pub download_multiplier: f64,
    /// Unix time the discount ends; 0 = no end / no discount.
    #[serde(default)]
    pub discount_end_time: i64,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub bought: bool,
    /// Unix publish time.
    #[serde(default)]
    pub time: i64,
}

fn default_multiplier() -> f64 {
    1.0
}

impl Default for SiteTorrent {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            size: 0,
            seeders: 0,
            leechers: 0,
            download_url: String::new(),
            is_active: false,
            has_hnr: false,
            upload_multiplier: default_multiplier(),
            download_multiplier: default_multiplier(),
            discount_end_time: 0,
            paid: false,
            bought: false,
            time: 0,
        }
    }
}

/// A delete or resume action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationTorrent {
    pub info_hash: String,
    pub name: String,
    pub msg: String,
}

/// A stall or modify action; `meta` is the full patched metadata map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifyTorrent {
    pub info_hash: String,
    pub name: String,
    pub msg: String,
    pub meta: MetaMap,
}

/// A site torrent to add to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddTorrent {
    /// Site-side torrent id.
    pub id: String,
    pub name: String,
    pub download_url: String,
    pub size: i64,
    pub score: f64,
    pub predicted_upload_speed: i64,
    pub msg: String,
    pub meta: MetaMap,
}

/// Plan produced by one engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmResult {
    pub delete_torrents: Vec<OperationTorrent>,
    pub stall_torrents: Vec<ModifyTorrent>,
    pub resume_torrents: Vec<OperationTorrent>,
    pub modify_torrents: Vec<ModifyTorrent>,
    pub add_torrents: Vec<AddTorrent>,
    /// Whether the client still has room to brush another site this run.
    pub can_add_more: bool,
    /// Projected change of free disk space once the plan is applied.
    pub free_space_change: i64,
}

impl AlgorithmResult {
    /// True when the plan contains no actions.
    pub fn is_empty(&self) -> bool {
        self.delete_torrents.is_empty()
            && self.stall_torrents.is_empty()
            && self.resume_torrents.is_empty()
            && self.modify_torrents.is_empty()
            && self.add_torrents.is_empty()
    }
}
