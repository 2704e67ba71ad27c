//! Engine options and their mapping from configuration.

use regex_lite::Regex;

use crate::config::{ClientConfig, ConfigError, SiteConfig};

use super::constants::{DEFAULT_SLOW_UPLOAD_SPEED_TIER, DEFAULT_TORRENT_UPLOAD_SPEED_LIMIT, GIB};

/// Eligibility policy for a site's candidate torrents.
#[derive(Debug, Clone)]
pub struct BrushSiteOption {
    pub allow_none_free: bool,
    pub allow_paid: bool,
    pub allow_hr: bool,
    pub allow_zero_seeders: bool,
    pub torrent_min_size_limit: Option<i64>,
    pub torrent_max_size_limit: Option<i64>,
    /// Per-torrent upload speed cap on this site.
    pub torrent_upload_speed_limit: i64,
    /// Current unix time.
    pub now: i64,
    /// Candidates whose name matches any of these are skipped.
    pub excludes: Vec<Regex>,
}

impl BrushSiteOption {
    /// Defaults at the given time: free torrents only, without hit-and-run
    /// or zero-seeder ones, and no size bounds.
    pub fn new(now: i64) -> Self {
        Self {
            allow_none_free: false,
            allow_paid: false,
            allow_hr: false,
            allow_zero_seeders: false,
            torrent_min_size_limit: None,
            torrent_max_size_limit: None,
            torrent_upload_speed_limit: DEFAULT_TORRENT_UPLOAD_SPEED_LIMIT,
            now,
            excludes: Vec::new(),
        }
    }

    pub fn from_config(config: &SiteConfig, now: i64) -> Result<Self, ConfigError> {
        Ok(Self {
            allow_none_free: config.allow_none_free,
            allow_paid: config.allow_paid,
            allow_hr: config.allow_hr,
            allow_zero_seeders: config.allow_zero_seeders,
            torrent_min_size_limit: config.torrent_min_size,
            torrent_max_size_limit: config.torrent_max_size,
            torrent_upload_speed_limit: config.torrent_upload_speed_limit,
            now,
            excludes: compile_excludes(&config.excludes)?,
        })
    }

    /// Returns the first exclude pattern matching `name`.
    pub fn matching_exclude(&self, name: &str) -> Option<&Regex> {
        self.excludes.iter().find(|re| re.is_match(name))
    }
}

/// Compile case-insensitive exclude patterns.
pub fn compile_excludes(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(&format!("(?i){}", p)).map_err(|e| {
                ConfigError::ValidationError(format!("invalid exclude pattern '{}': {}", p, e))
            })
        })
        .collect()
}

/// Resource limits of a torrent client.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushClientOption {
    pub min_disk_space: i64,
    pub slow_upload_speed_tier: i64,
    pub max_downloading_torrents: i64,
    /// Negative = unlimited.
    pub max_torrents: i64,
    pub min_ratio: f64,
    /// Upload target when the client itself has no upload limit.
    pub default_upload_speed_limit: i64,
}

impl Default for BrushClientOption {
    fn default() -> Self {
        Self {
            min_disk_space: 5 * GIB,
            slow_upload_speed_tier: DEFAULT_SLOW_UPLOAD_SPEED_TIER,
            max_downloading_torrents: 6,
            max_torrents: -1,
            min_ratio: 0.2,
            default_upload_speed_limit: DEFAULT_TORRENT_UPLOAD_SPEED_LIMIT,
        }
    }
}

impl From<&ClientConfig> for BrushClientOption {
    fn from(config: &ClientConfig) -> Self {
        Self {
            min_disk_space: config.min_disk_space,
            slow_upload_speed_tier: config.slow_upload_speed_tier,
            max_downloading_torrents: config.max_downloading_torrents,
            max_torrents: config.max_torrents,
            min_ratio: config.min_ratio,
            default_upload_speed_limit: config.default_upload_speed_limit,
        }
    }
}

impl BrushClientOption {
    pub fn torrent_limit_reached(&self, cnt_torrents: i64) -> bool {
        self.max_torrents >= 0 && cnt_torrents >= self.max_torrents
    }

    pub fn torrent_limit_exceeded(&self, cnt_torrents: i64) -> bool {
        self.max_torrents >= 0 && cnt_torrents > self.max_torrents
    }
}
