//! Typed view over the per-torrent metadata map.
//!
//! Clients persist brush state as a flat `key -> i64` dictionary attached to
//! each torrent. The engine reads it into [`TorrentMeta`] and writes patches
//! back as full copies of the original map.

use std::collections::BTreeMap;

/// Wire representation of torrent metadata.
pub type MetaMap = BTreeMap<String, i64>;

pub const META_DISCOUNT_END_TIME: &str = "dcet";
pub const META_SLOW_CHECK_TIME: &str = "sct";
pub const META_SLOW_CHECK_UPLOADED: &str = "sctu";
pub const META_STALL_TIME: &str = "stt";

/// Brush state stored on a client torrent. Absent keys read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TorrentMeta {
    pub discount_end_time: Option<i64>,
    pub slow_check_time: Option<i64>,
    pub slow_check_uploaded: Option<i64>,
    pub stall_time: Option<i64>,
}

impl TorrentMeta {
    /// Read the typed view. Zero values are treated as unset.
    pub fn from_map(map: &MetaMap) -> Self {
        let get = |key: &str| map.get(key).copied().filter(|v| *v != 0);
        Self {
            discount_end_time: get(META_DISCOUNT_END_TIME),
            slow_check_time: get(META_SLOW_CHECK_TIME),
            slow_check_uploaded: get(META_SLOW_CHECK_UPLOADED),
            stall_time: get(META_STALL_TIME),
        }
    }

    pub fn discount_end_time(&self) -> i64 {
        self.discount_end_time.unwrap_or(0)
    }

    pub fn slow_check_time(&self) -> i64 {
        self.slow_check_time.unwrap_or(0)
    }

    pub fn slow_check_uploaded(&self) -> i64 {
        self.slow_check_uploaded.unwrap_or(0)
    }

    pub fn stall_time(&self) -> i64 {
        self.stall_time.unwrap_or(0)
    }

    pub fn is_stalled(&self) -> bool {
        self.stall_time() > 0
    }

    /// Start a new slow-check window.
    pub fn mark_slow_check(&mut self, now: i64, uploaded: i64) {
        self.slow_check_time = Some(now);
        // 0 uploaded bytes is a legitimate window start, keep the key explicit
        self.slow_check_uploaded = Some(uploaded);
    }

    pub fn clear_slow_check(&mut self) {
        self.slow_check_time = None;
        self.slow_check_uploaded = None;
    }

    pub fn mark_stalled(&mut self, now: i64) {
        self.stall_time = Some(now);
    }

    /// Produce a patched copy of `base`: unknown keys survive, cleared fields are removed.
    pub fn apply_to(&self, base: &MetaMap) -> MetaMap {
        let mut map = base.clone();
        for (key, value) in [
            (META_DISCOUNT_END_TIME, self.discount_end_time),
            (META_SLOW_CHECK_TIME, self.slow_check_time),
            (META_SLOW_CHECK_UPLOADED, self.slow_check_uploaded),
            (META_STALL_TIME, self.stall_time),
        ] {
            match value {
                Some(v) => {
                    map.insert(key.to_string(), v);
                }
                None => {
                    map.remove(key);
                }
            }
        }
        map
    }

    pub fn to_map(&self) -> MetaMap {
        self.apply_to(&MetaMap::new())
    }
}
