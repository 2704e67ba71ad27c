//! The brush decision engine.
//!
//! [`decide`] runs a fixed sequence of steps over a [`DecisionContext`].
//! Every step reads and updates the context's running projections (free
//! space change, estimated upload speed, torrent counts), so the order of the
//! steps matters. The engine performs no I/O and never mutates its inputs.

use std::cmp::Ordering;
use std::collections::VecDeque;

use tracing::{debug, info};

use super::constants::{
    DELETE_SCORE_AGE_CAP, DELETE_TORRENTS_FREE_DISK_SPACE_TIER, DELETE_TORRENT_IMMEDIATELY_SCORE,
    DISCOUNT_END_MARGIN, NEW_TORRENT_TIMESPAN, NO_PROGRESS_TORRENT_DELETION_TIMESPAN,
    RESUME_TORRENTS_FREE_DISK_SPACE_TIER, RESUME_UPLOAD_SPEED_FACTOR, SLOW_TORRENT_CHECK_TIMESPAN,
    STALL_DOWNLOAD_SPEED, STALL_TORRENT_DELETION_TIMESPAN,
};
use super::meta::TorrentMeta;
use super::options::{BrushClientOption, BrushSiteOption};
use super::rate::rate_site_torrent;
use super::types::{
    AddTorrent, AlgorithmResult, ClientStatus, ClientTorrent, ModifyTorrent, OperationTorrent,
    SiteTorrent, TorrentState,
};

/// Decide which torrents to delete, stall, resume, modify and add.
pub fn decide(
    status: &ClientStatus,
    torrents: &[ClientTorrent],
    site_torrents: &[SiteTorrent],
    site_option: &BrushSiteOption,
    client_option: &BrushClientOption,
) -> AlgorithmResult {
    let mut ctx = DecisionContext::new(status, torrents, site_option.now, client_option);
    ctx.score_candidates(site_torrents, site_option);
    ctx.mark_torrents();
    ctx.sort_delete_candidates();
    ctx.apply_deletions();
    ctx.delete_stalled_under_pressure();
    ctx.evict_over_limit();
    ctx.stall_downloading_under_pressure();
    ctx.mark_resumable();
    ctx.materialize();
    ctx.admit_candidates();
    let result = ctx.finish();

    info!(
        delete = result.delete_torrents.len(),
        stall = result.stall_torrents.len(),
        resume = result.resume_torrents.len(),
        modify = result.modify_torrents.len(),
        add = result.add_torrents.len(),
        can_add_more = result.can_add_more,
        free_space_change = result.free_space_change,
        "brush decision computed"
    );
    result
}

/// A scored site torrent waiting for admission.
#[derive(Debug, Clone)]
pub(crate) struct Candidate<'a> {
    pub torrent: &'a SiteTorrent,
    pub score: f64,
    pub predicted_upload_speed: i64,
}

/// A client torrent marked for possible deletion.
#[derive(Debug, Clone)]
pub(crate) struct DeleteCandidate {
    /// Index into the context's entries.
    pub index: usize,
    pub score: f64,
    /// Error / no-progress torrents, deleted regardless of resources.
    pub immediate: bool,
    pub msg: String,
}

/// Per-torrent working state for one invocation.
#[derive(Debug, Clone)]
pub(crate) struct TorrentEntry<'a> {
    pub torrent: &'a ClientTorrent,
    /// Working copy of the torrent's metadata.
    pub meta: TorrentMeta,
    pub stall_msg: Option<String>,
    pub modify_msg: Option<String>,
    pub deleted: bool,
    pub resume_msg: Option<String>,
    /// Counted in `cnt_downloading_torrents`.
    pub downloading: bool,
}

/// Mutable state threaded through the decision steps.
#[derive(Debug)]
pub struct DecisionContext<'a> {
    now: i64,
    status: &'a ClientStatus,
    option: &'a BrushClientOption,
    pub cnt_torrents: i64,
    pub cnt_downloading_torrents: i64,
    pub freespace_change: i64,
    pub estimate_upload_speed: i64,
    pub target_upload_speed: i64,
    freespace_target: i64,
    pub(crate) candidates: VecDeque<Candidate<'a>>,
    pub(crate) entries: Vec<TorrentEntry<'a>>,
    pub(crate) delete_candidates: Vec<DeleteCandidate>,
    result: AlgorithmResult,
}

impl<'a> DecisionContext<'a> {
    pub fn new(
        status: &'a ClientStatus,
        torrents: &'a [ClientTorrent],
        now: i64,
        option: &'a BrushClientOption,
    ) -> Self {
        let target_upload_speed = if status.upload_speed_limit > 0 {
            status.upload_speed_limit
        } else {
            option.default_upload_speed_limit
        };
        let entries = torrents
            .iter()
            .map(|torrent| TorrentEntry {
                torrent,
                meta: torrent.typed_meta(),
                stall_msg: None,
                modify_msg: None,
                deleted: false,
                resume_msg: None,
                downloading: false,
            })
            .collect();

        Self {
            now,
            status,
            option,
            cnt_torrents: torrents.len() as i64,
            cnt_downloading_torrents: 0,
            freespace_change: 0,
            estimate_upload_speed: status.upload_speed,
            target_upload_speed,
            freespace_target: option.min_disk_space.saturating_mul(2).min(
                option
                    .min_disk_space
                    .saturating_add(DELETE_TORRENTS_FREE_DISK_SPACE_TIER),
            ),
            candidates: VecDeque::new(),
            entries,
            delete_candidates: Vec::new(),
            result: AlgorithmResult::default(),
        }
    }

    /// Free space once all decisions so far are applied.
    pub fn projected_free_space(&self) -> i64 {
        self.status.free_space_on_disk.saturating_add(self.freespace_change)
    }

    /// Projected free space is known and below `min_disk_space`.
    pub fn disk_constrained(&self) -> bool {
        self.status.disk_space_known() && self.projected_free_space() < self.option.min_disk_space
    }

    /// All four admission constraints hold.
    pub fn admission_open(&self) -> bool {
        self.cnt_downloading_torrents < self.option.max_downloading_torrents
            && self.estimate_upload_speed <= self.target_upload_speed.saturating_mul(2)
            && (!self.status.disk_space_known()
                || self.projected_free_space() > self.option.min_disk_space)
            && !self.option.torrent_limit_reached(self.cnt_torrents)
    }

    /// Step 1: rate site torrents, best first.
    pub fn score_candidates(&mut self, site_torrents: &'a [SiteTorrent], option: &BrushSiteOption) {
        let mut candidates: Vec<Candidate<'a>> = site_torrents
            .iter()
            .filter_map(|torrent| {
                let rating = rate_site_torrent(torrent, option);
                if rating.score > 0.0 {
                    Some(Candidate {
                        torrent,
                        score: rating.score,
                        predicted_upload_speed: rating.predicted_upload_speed,
                    })
                } else {
                    debug!(id = %torrent.id, name = %torrent.name, note = %rating.note, "candidate skipped");
                    None
                }
            })
            .collect();
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        self.candidates = candidates.into();
    }

    /// Step 2: per-torrent state transitions.
    pub fn mark_torrents(&mut self) {
        let now = self.now;
        let tier = self.option.slow_upload_speed_tier;

        for index in 0..self.entries.len() {
            let torrent = self.entries[index].torrent;
            let meta = self.entries[index].meta;
            let age = now.saturating_sub(torrent.atime);
            let is_new = age < NEW_TORRENT_TIMESPAN;

            if !torrent.is_complete()
                && !meta.is_stalled()
                && (torrent.download_speed >= STALL_DOWNLOAD_SPEED || is_new)
            {
                self.entries[index].downloading = true;
                self.cnt_downloading_torrents += 1;
            }

            if meta.discount_end_time() > 0
                && meta.discount_end_time().saturating_sub(now) < DISCOUNT_END_MARGIN
                && !torrent.is_complete()
                && !meta.is_stalled()
            {
                self.stall(index, "discount ends");
            }

            if is_new {
                continue;
            }

            if torrent.state == TorrentState::Error && torrent.upload_speed < tier {
                self.push_delete_candidate(index, true, "torrent in error state");
            } else if torrent.size_completed == 0
                && torrent.download_speed == 0
                && age > NO_PROGRESS_TORRENT_DELETION_TIMESPAN
            {
                self.push_delete_candidate(index, true, "torrent has no download progress");
            } else if meta.is_stalled()
                && !torrent.is_complete()
                && now.saturating_sub(meta.stall_time()) >= STALL_TORRENT_DELETION_TIMESPAN
            {
                self.push_delete_candidate(index, false, "torrent stalled for too long");
            } else if torrent.upload_speed < tier {
                self.check_slow_torrent(index);
            } else if meta.slow_check_time() > 0 {
                let entry = &mut self.entries[index];
                entry.meta.clear_slow_check();
                entry.modify_msg = Some("clear slow check mark".to_string());
            }
        }
    }

    fn check_slow_torrent(&mut self, index: usize) {
        let now = self.now;
        let torrent = self.entries[index].torrent;
        let meta = self.entries[index].meta;

        if meta.slow_check_time() <= 0 {
            let entry = &mut self.entries[index];
            entry.meta.mark_slow_check(now, torrent.uploaded);
            entry.modify_msg = Some("set slow check mark".to_string());
            return;
        }
        let elapsed = now.saturating_sub(meta.slow_check_time());
        if elapsed < SLOW_TORRENT_CHECK_TIMESPAN {
            return;
        }

        let average_upload_speed = torrent
            .uploaded
            .saturating_sub(meta.slow_check_uploaded())
            / elapsed;
        if average_upload_speed < self.option.slow_upload_speed_tier {
            self.push_delete_candidate(index, false, "slow uploading speed");
            let low_ratio = torrent
                .ratio()
                .is_some_and(|ratio| ratio < self.option.min_ratio);
            if low_ratio && !torrent.is_complete() && !self.entries[index].meta.is_stalled() {
                self.stall(index, "slow uploading speed and low ratio");
            }
        } else {
            let entry = &mut self.entries[index];
            entry.meta.mark_slow_check(now, torrent.uploaded);
            entry.modify_msg = Some("reset slow check mark".to_string());
        }
    }

    fn push_delete_candidate(&mut self, index: usize, immediate: bool, msg: &str) {
        let torrent = self.entries[index].torrent;
        let score = if immediate {
            DELETE_TORRENT_IMMEDIATELY_SCORE
        } else {
            let age = self
                .now
                .saturating_sub(torrent.atime)
                .clamp(0, DELETE_SCORE_AGE_CAP);
            age as f64 - torrent.upload_speed as f64
        };
        self.delete_candidates.push(DeleteCandidate {
            index,
            score,
            immediate,
            msg: msg.to_string(),
        });
    }

    /// Step 3: immediate candidates first, then by descending score.
    pub fn sort_delete_candidates(&mut self) {
        self.delete_candidates.sort_by(|a, b| {
            b.immediate
                .cmp(&a.immediate)
                .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
        });
    }

    /// Step 4: greedy deletion of candidates.
    pub fn apply_deletions(&mut self) {
        let candidates = std::mem::take(&mut self.delete_candidates);
        for candidate in &candidates {
            if self.entries[candidate.index].deleted {
                continue;
            }
            let projected = self.projected_free_space();
            let disk_pressure = self.status.disk_space_known()
                && projected <= self.option.min_disk_space
                && projected <= self.freespace_target;
            let stall_time = self.entries[candidate.index].meta.stall_time();
            let stalled_long = stall_time > 0
                && self.now.saturating_sub(stall_time) >= STALL_TORRENT_DELETION_TIMESPAN;

            if candidate.immediate || disk_pressure || stalled_long {
                self.delete(candidate.index, &candidate.msg);
            }
        }
        self.delete_candidates = candidates;
    }

    /// Step 5: last resort under disk pressure.
    pub fn delete_stalled_under_pressure(&mut self) {
        if !self.disk_constrained() {
            return;
        }
        for index in 0..self.entries.len() {
            let entry = &self.entries[index];
            if !entry.deleted && entry.meta.is_stalled() && !entry.torrent.is_complete() {
                self.delete(index, "disk space low, delete stalled torrent");
            }
        }
    }

    /// Step 6: make room for replacements when over the torrent limit.
    pub fn evict_over_limit(&mut self) {
        if self.candidates.is_empty() || !self.option.torrent_limit_exceeded(self.cnt_torrents) {
            return;
        }
        let order: Vec<usize> = self.delete_candidates.iter().map(|c| c.index).collect();
        for index in order {
            if !self.option.torrent_limit_exceeded(self.cnt_torrents) {
                break;
            }
            if !self.entries[index].deleted {
                self.delete(index, "too many torrents");
            }
        }
    }

    /// Step 7: stop downloads while the disk is still short.
    pub fn stall_downloading_under_pressure(&mut self) {
        if !self.disk_constrained() {
            return;
        }
        for index in 0..self.entries.len() {
            let entry = &self.entries[index];
            if !entry.deleted && entry.downloading && !entry.meta.is_stalled() {
                self.stall(index, "disk space low");
            }
        }
    }

    /// Step 8: resume errored torrents that upload well again.
    pub fn mark_resumable(&mut self) {
        let space_ok = !self.status.disk_space_known()
            || self.projected_free_space()
                >= self
                    .option
                    .min_disk_space
                    .max(RESUME_TORRENTS_FREE_DISK_SPACE_TIER);
        if !space_ok {
            return;
        }
        let threshold = self
            .option
            .slow_upload_speed_tier
            .saturating_mul(RESUME_UPLOAD_SPEED_FACTOR);
        for entry in &mut self.entries {
            if !entry.deleted
                && entry.torrent.state == TorrentState::Error
                && entry.torrent.upload_speed >= threshold
                && !entry.meta.is_stalled()
            {
                entry.resume_msg = Some("resume errored torrent with good uploading speed".to_string());
            }
        }
    }

    /// Step 9: emit stall, resume and modify actions for surviving torrents.
    pub fn materialize(&mut self) {
        for entry in &self.entries {
            if entry.deleted {
                continue;
            }
            let torrent = entry.torrent;
            if let Some(msg) = &entry.stall_msg {
                // the stall patch carries any other change to the same torrent
                self.result.stall_torrents.push(ModifyTorrent {
                    info_hash: torrent.info_hash.clone(),
                    name: torrent.name.clone(),
                    msg: msg.clone(),
                    meta: entry.meta.apply_to(&torrent.meta),
                });
            } else if let Some(msg) = &entry.modify_msg {
                self.result.modify_torrents.push(ModifyTorrent {
                    info_hash: torrent.info_hash.clone(),
                    name: torrent.name.clone(),
                    msg: msg.clone(),
                    meta: entry.meta.apply_to(&torrent.meta),
                });
            }
            if let Some(msg) = &entry.resume_msg {
                self.result.resume_torrents.push(OperationTorrent {
                    info_hash: torrent.info_hash.clone(),
                    name: torrent.name.clone(),
                    msg: msg.clone(),
                });
            }
        }
    }

    /// Step 10: admit the best candidates while resources allow.
    pub fn admit_candidates(&mut self) {
        while self.admission_open() {
            let Some(candidate) = self.candidates.pop_front() else {
                break;
            };
            let torrent = candidate.torrent;
            if self.status.disk_space_known()
                && self.projected_free_space().saturating_sub(torrent.size)
                    < self.option.min_disk_space
            {
                debug!(id = %torrent.id, size = torrent.size, "candidate does not fit on disk");
                continue;
            }

            let mut meta = TorrentMeta::default();
            if torrent.discount_end_time > 0 {
                meta.discount_end_time = Some(torrent.discount_end_time);
            }
            debug!(
                id = %torrent.id,
                name = %torrent.name,
                score = candidate.score,
                "admit candidate"
            );
            self.result.add_torrents.push(AddTorrent {
                id: torrent.id.clone(),
                name: torrent.name.clone(),
                download_url: torrent.download_url.clone(),
                size: torrent.size,
                score: candidate.score,
                predicted_upload_speed: candidate.predicted_upload_speed,
                msg: format!("score {:.1}", candidate.score),
                meta: meta.to_map(),
            });
            self.cnt_downloading_torrents += 1;
            self.cnt_torrents += 1;
            self.estimate_upload_speed = self
                .estimate_upload_speed
                .saturating_add(candidate.predicted_upload_speed);
            self.freespace_change = self.freespace_change.saturating_sub(torrent.size);
        }
    }

    /// Step 11: close the result.
    pub fn finish(mut self) -> AlgorithmResult {
        self.result.can_add_more = self.admission_open();
        self.result.free_space_change = self.freespace_change;
        self.result
    }

    fn stall(&mut self, index: usize, msg: &str) {
        let now = self.now;
        let entry = &mut self.entries[index];
        entry.meta.mark_stalled(now);
        entry.stall_msg = Some(msg.to_string());
        if entry.downloading {
            entry.downloading = false;
            self.cnt_downloading_torrents -= 1;
        }
        debug!(info_hash = %entry.torrent.info_hash, reason = msg, "stall torrent");
    }

    fn delete(&mut self, index: usize, msg: &str) {
        let entry = &mut self.entries[index];
        entry.deleted = true;
        let torrent = entry.torrent;
        if entry.downloading {
            entry.downloading = false;
            self.cnt_downloading_torrents -= 1;
        }
        self.freespace_change = self.freespace_change.saturating_add(torrent.size_completed);
        self.estimate_upload_speed = self
            .estimate_upload_speed
            .saturating_sub(torrent.upload_speed);
        self.cnt_torrents -= 1;
        debug!(info_hash = %torrent.info_hash, reason = msg, "delete torrent");
        self.result.delete_torrents.push(OperationTorrent {
            info_hash: torrent.info_hash.clone(),
            name: torrent.name.clone(),
            msg: msg.to_string(),
        });
    }
}
