//! Brush decision engine.
//!
//! Given a client's status and inventory and a site's candidate list, the
//! engine decides which torrents to delete, stall, resume or re-tag and which
//! candidates to add:
//! - **Scoring**: [`rate_site_torrent`] ranks candidates by expected upload return
//! - **Decision**: [`decide`] applies disk, bandwidth and count limits
//!
//! The engine is pure. Cross-run memory lives in each torrent's metadata map
//! and is handed back to the caller as copy-on-write patches.

pub mod constants;
mod decide;
mod meta;
mod options;
mod rate;
mod types;

pub use decide::{decide, DecisionContext};
pub use meta::{
    MetaMap, TorrentMeta, META_DISCOUNT_END_TIME, META_SLOW_CHECK_TIME, META_SLOW_CHECK_UPLOADED,
    META_STALL_TIME,
};
pub use options::{compile_excludes, BrushClientOption, BrushSiteOption};
pub use rate::{rate_site_torrent, Rating};
pub use types::{
    AddTorrent, AlgorithmResult, ClientStatus, ClientTorrent, ModifyTorrent, OperationTorrent,
    SiteTorrent, TorrentState,
};
