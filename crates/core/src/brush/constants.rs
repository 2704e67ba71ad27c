//! Tuning constants for the brush engine.
//!
//! These values are part of the engine's observable behavior. Sizes are in
//! bytes, speeds in bytes/second, durations in seconds.

pub const KIB: i64 = 1024;
pub const MIB: i64 = 1024 * KIB;
pub const GIB: i64 = 1024 * MIB;

/// Torrents added less than this long ago are left alone by the slow-upload logic.
pub const NEW_TORRENT_TIMESPAN: i64 = 15 * 60;

/// Minimum length of a slow-check window before its average upload is judged.
pub const SLOW_TORRENT_CHECK_TIMESPAN: i64 = 15 * 60;

/// A stalled, incomplete torrent is deleted after staying stalled this long.
pub const STALL_TORRENT_DELETION_TIMESPAN: i64 = 30 * 60;

/// A torrent with no downloaded bytes and no download speed is deleted after this long.
pub const NO_PROGRESS_TORRENT_DELETION_TIMESPAN: i64 = 30 * 60;

/// Download speed at or above which an incomplete torrent counts as downloading.
pub const STALL_DOWNLOAD_SPEED: i64 = 10 * KIB;

pub const DEFAULT_SLOW_UPLOAD_SPEED_TIER: i64 = 100 * KIB;

/// Discounts ending within this margin are treated as already over.
pub const DISCOUNT_END_MARGIN: i64 = 3600;

/// Delete priority of error / no-progress torrents. Always above any computed score.
pub const DELETE_TORRENT_IMMEDIATELY_SCORE: f64 = 99999.0;

/// Cap on the age bonus of a delete candidate's score.
pub const DELETE_SCORE_AGE_CAP: i64 = 86400;

/// Upper bound on extra space freed beyond `min_disk_space` by greedy deletion.
pub const DELETE_TORRENTS_FREE_DISK_SPACE_TIER: i64 = 10 * GIB;

/// Minimum projected free space before errored torrents are resumed.
pub const RESUME_TORRENTS_FREE_DISK_SPACE_TIER: i64 = 5 * GIB;

/// Errored torrents uploading at this multiple of the slow tier get resumed.
pub const RESUME_UPLOAD_SPEED_FACTOR: i64 = 4;

pub const PREDICTED_UPLOAD_SPEED_PER_LEECHER: i64 = 100 * KIB;

/// Download limit applied to stalled torrents.
pub const STALLED_TORRENT_DOWNLOAD_SPEED_LIMIT: i64 = 1;

pub const DEFAULT_TORRENT_UPLOAD_SPEED_LIMIT: i64 = 10 * MIB;

/// Site torrent freshness windows.
pub const FRESH_TORRENT_TIMESPAN: i64 = 2 * 3600;
pub const RECENT_TORRENT_TIMESPAN: i64 = 86400;
pub const RELISTED_TORRENT_TIMESPAN: i64 = 30 * 86400;

/// Leechers required to admit a torrent published between 2h and 24h ago.
pub const RECENT_TORRENT_MIN_LEECHERS: i64 = 500;
