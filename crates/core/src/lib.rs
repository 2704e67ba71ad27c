pub mod brush;
pub mod config;
pub mod metrics;
pub mod orchestrator;
pub mod site;
pub mod testing;
pub mod torrent_client;

pub use brush::{
    decide, rate_site_torrent, AddTorrent, AlgorithmResult, BrushClientOption, BrushSiteOption,
    ClientStatus, ClientTorrent, MetaMap, ModifyTorrent, OperationTorrent, Rating, SiteTorrent,
    TorrentState,
};
pub use config::{
    load_config, load_config_from_str, validate_config, ClientConfig, Config, ConfigError,
    ServerConfig, SiteConfig,
};
pub use orchestrator::{
    apply_result, ApplyReport, BrushRunner, RunSummary, RunnerConfig, RunnerError, RunnerStatus,
    SiteOutcome,
};
pub use site::{SiteError, SiteProvider};
pub use torrent_client::{AddTorrentRequest, BrushClient, BrushClientError, ModifyTorrentRequest};
