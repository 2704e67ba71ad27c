use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::brush::constants::{DEFAULT_SLOW_UPLOAD_SPEED_TIER, DEFAULT_TORRENT_UPLOAD_SPEED_LIMIT, GIB};
use crate::orchestrator::RunnerConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
    /// Periodic runner settings; unused by `brushd` itself.
    #[serde(default)]
    pub runner: RunnerConfig,
}

impl Config {
    /// Look up a site by name.
    pub fn site(&self, name: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|s| s.name == name)
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Resource limits of the brushed torrent client. Sizes in bytes, speeds in bytes/s.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ClientConfig {
    /// Free disk space to keep available.
    #[serde(default = "default_min_disk_space")]
    pub min_disk_space: i64,
    /// Torrents uploading slower than this are watched for deletion.
    #[serde(default = "default_slow_upload_speed_tier")]
    pub slow_upload_speed_tier: i64,
    #[serde(default = "default_max_downloading_torrents")]
    pub max_downloading_torrents: i64,
    /// -1 = unlimited.
    #[serde(default = "default_max_torrents")]
    pub max_torrents: i64,
    #[serde(default = "default_min_ratio")]
    pub min_ratio: f64,
    /// Upload target used when the client has no global upload limit.
    #[serde(default = "default_upload_speed_limit")]
    pub default_upload_speed_limit: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            min_disk_space: default_min_disk_space(),
            slow_upload_speed_tier: default_slow_upload_speed_tier(),
            max_downloading_torrents: default_max_downloading_torrents(),
            max_torrents: default_max_torrents(),
            min_ratio: default_min_ratio(),
            default_upload_speed_limit: default_upload_speed_limit(),
        }
    }
}

fn default_min_disk_space() -> i64 {
    5 * GIB
}

fn default_slow_upload_speed_tier() -> i64 {
    DEFAULT_SLOW_UPLOAD_SPEED_TIER
}

fn default_max_downloading_torrents() -> i64 {
    6
}

fn default_max_torrents() -> i64 {
    -1
}

fn default_min_ratio() -> f64 {
    0.2
}

fn default_upload_speed_limit() -> i64 {
    DEFAULT_TORRENT_UPLOAD_SPEED_LIMIT
}

/// Eligibility policy for one tracker site.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SiteConfig {
    pub name: String,
    #[serde(default)]
    pub allow_none_free: bool,
    #[serde(default)]
    pub allow_paid: bool,
    #[serde(default)]
    pub allow_hr: bool,
    #[serde(default)]
    pub allow_zero_seeders: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torrent_min_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torrent_max_size: Option<i64>,
    /// Per-torrent upload speed cap (bytes/s).
    #[serde(default = "default_upload_speed_limit")]
    pub torrent_upload_speed_limit: i64,
    /// Case-insensitive regexes; matching candidate names are skipped.
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl SiteConfig {
    /// A site with default policy.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allow_none_free: false,
            allow_paid: false,
            allow_hr: false,
            allow_zero_seeders: false,
            torrent_min_size: None,
            torrent_max_size: None,
            torrent_upload_speed_limit: default_upload_speed_limit(),
            excludes: Vec::new(),
        }
    }
}
