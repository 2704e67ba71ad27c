//! Brush runner implementation.
//!
//! Visits every configured site in order, feeding the client's state and the
//! site's candidates to the engine and applying the resulting plan. Sites are
//! processed one at a time so that each decision sees the effects of the
//! previous one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::brush::{compile_excludes, decide, BrushClientOption, BrushSiteOption};
use crate::config::{Config, SiteConfig};
use crate::metrics::{record_result, CANDIDATES_SCORED_TOTAL, RUN_DURATION, SITE_ITERATIONS_TOTAL};
use crate::site::SiteProvider;
use crate::torrent_client::BrushClient;

use super::apply::apply_result;
use super::config::RunnerConfig;
use super::types::{RunSummary, RunnerError, RunnerStatus, SiteOutcome, SiteRun};

/// A site provider paired with its policy.
struct RunnerSite {
    config: SiteConfig,
    provider: Arc<dyn SiteProvider>,
}

/// Periodically brushes one torrent client from a list of sites.
pub struct BrushRunner {
    config: RunnerConfig,
    client_option: BrushClientOption,
    client: Arc<dyn BrushClient>,
    sites: Vec<RunnerSite>,

    // Runtime state
    running: AtomicBool,
    last_run: RwLock<Option<RunSummary>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl BrushRunner {
    /// Create a runner.
    ///
    /// Sites are visited in the order of the `[[sites]]` entries. A configured
    /// site without a provider is ignored; a provider without configuration is
    /// an error.
    pub fn new(
        config: &Config,
        client: Arc<dyn BrushClient>,
        providers: Vec<Arc<dyn SiteProvider>>,
    ) -> Result<Self, RunnerError> {
        if let Some(unknown) = providers.iter().find(|p| config.site(p.name()).is_none()) {
            return Err(RunnerError::UnknownSite(unknown.name().to_string()));
        }

        let mut sites = Vec::new();
        for site_config in &config.sites {
            let Some(provider) = providers.iter().find(|p| p.name() == site_config.name) else {
                warn!(site = %site_config.name, "No provider for configured site");
                continue;
            };
            compile_excludes(&site_config.excludes)?;
            sites.push(RunnerSite {
                config: site_config.clone(),
                provider: Arc::clone(provider),
            });
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            config: config.runner.clone(),
            client_option: BrushClientOption::from(&config.client),
            client,
            sites,
            running: AtomicBool::new(false),
            last_run: RwLock::new(None),
            shutdown_tx,
        })
    }

    /// Names of the sites this runner visits, in order.
    pub fn site_names(&self) -> Vec<&str> {
        self.sites.iter().map(|s| s.config.name.as_str()).collect()
    }

    /// Start the periodic loop (spawns a background task).
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Brush runner already running");
            return;
        }

        let runner = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let period = Duration::from_secs(self.config.interval_secs.max(1));

        tokio::spawn(async move {
            info!(interval_secs = period.as_secs(), "Brush loop started");
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Brush loop received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !runner.running.load(Ordering::Relaxed) {
                            break;
                        }
                        runner.run_once().await;
                    }
                }
            }
            info!("Brush loop stopped");
        });
    }

    /// Stop the periodic loop. A run in progress finishes first.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Brush runner not running");
            return;
        }
        info!("Stopping brush runner");
        let _ = self.shutdown_tx.send(());
    }

    /// Get current runner status.
    pub async fn status(&self) -> RunnerStatus {
        RunnerStatus {
            running: self.running.load(Ordering::Relaxed),
            last_run: self.last_run.read().await.clone(),
        }
    }

    /// Brush every site once.
    ///
    /// Stops early once a decision reports that the client cannot take more
    /// torrents.
    pub async fn run_once(&self) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary::new(Utc::now());

        for site in &self.sites {
            let outcome = self.brush_site(site).await;
            let client_full = matches!(
                outcome,
                SiteOutcome::Brushed {
                    can_add_more: false,
                    ..
                }
            );
            summary.sites.push(SiteRun {
                site: site.config.name.clone(),
                outcome,
            });
            if client_full {
                info!(site = %site.config.name, "Client is full, ending run");
                break;
            }
        }

        RUN_DURATION
            .with_label_values(&[])
            .observe(started.elapsed().as_secs_f64());
        info!(
            brushed = summary.brushed_count(),
            skipped = summary.skipped_count(),
            "Brush run finished"
        );

        *self.last_run.write().await = Some(summary.clone());
        summary
    }

    async fn brush_site(&self, site: &RunnerSite) -> SiteOutcome {
        let name = site.config.name.as_str();

        let status = match self.client.status().await {
            Ok(status) => status,
            Err(e) => return skip(name, format!("client status unavailable: {}", e)),
        };
        let torrents = match self.client.list_torrents().await {
            Ok(torrents) => torrents,
            Err(e) => return skip(name, format!("client inventory unavailable: {}", e)),
        };
        let candidates = match site.provider.list_candidates().await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(site = name, error = %e, "Failed to list candidates, brushing without them");
                Vec::new()
            }
        };

        let site_option = match BrushSiteOption::from_config(&site.config, Utc::now().timestamp()) {
            Ok(option) => option,
            Err(e) => return skip(name, e.to_string()),
        };

        CANDIDATES_SCORED_TOTAL.inc_by(candidates.len() as u64);
        let result = decide(
            &status,
            &torrents,
            &candidates,
            &site_option,
            &self.client_option,
        );
        record_result(&result);

        let report = apply_result(
            self.client.as_ref(),
            site.provider.as_ref(),
            &result,
            site.config.torrent_upload_speed_limit,
        )
        .await;

        SITE_ITERATIONS_TOTAL.with_label_values(&["brushed"]).inc();
        info!(
            site = name,
            candidates = candidates.len(),
            applied = report.applied(),
            failed = report.failures.len(),
            can_add_more = result.can_add_more,
            "Site brushed"
        );

        SiteOutcome::Brushed {
            candidates: candidates.len(),
            report,
            can_add_more: result.can_add_more,
            free_space_change: result.free_space_change,
        }
    }
}

fn skip(site: &str, reason: String) -> SiteOutcome {
    warn!(site, reason = %reason, "Skipping site");
    SITE_ITERATIONS_TOTAL.with_label_values(&["skipped"]).inc();
    SiteOutcome::Skipped { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::constants::GIB;
    use crate::brush::ClientStatus;
    use crate::site::SiteError;
    use crate::testing::fixtures::{free_site_torrent, seeding_torrent};
    use crate::testing::{MockBrushClient, MockSiteProvider};
    use crate::torrent_client::BrushClientError;

    fn config(sites: &[&str]) -> Config {
        Config {
            sites: sites.iter().map(|s| SiteConfig::named(*s)).collect(),
            ..Default::default()
        }
    }

    fn roomy_status() -> ClientStatus {
        ClientStatus {
            free_space_on_disk: 500 * GIB,
            upload_speed: 0,
            upload_speed_limit: 0,
            download_speed: 0,
            download_speed_limit: 0,
        }
    }

    #[test]
    fn test_new_rejects_unknown_provider() {
        let client = Arc::new(MockBrushClient::new());
        let providers: Vec<Arc<dyn SiteProvider>> = vec![Arc::new(MockSiteProvider::new("gamma"))];
        let err = BrushRunner::new(&config(&["alpha"]), client, providers).err().unwrap();
        assert!(matches!(err, RunnerError::UnknownSite(name) if name == "gamma"));
    }

    #[test]
    fn test_new_rejects_bad_excludes() {
        let mut cfg = config(&["alpha"]);
        cfg.sites[0].excludes = vec!["(".to_string()];
        let client = Arc::new(MockBrushClient::new());
        let providers: Vec<Arc<dyn SiteProvider>> = vec![Arc::new(MockSiteProvider::new("alpha"))];
        let err = BrushRunner::new(&cfg, client, providers).err().unwrap();
        assert!(matches!(err, RunnerError::Config(_)));
    }

    #[test]
    fn test_sites_follow_config_order() {
        let client = Arc::new(MockBrushClient::new());
        let providers: Vec<Arc<dyn SiteProvider>> = vec![
            Arc::new(MockSiteProvider::new("beta")),
            Arc::new(MockSiteProvider::new("alpha")),
        ];
        let runner =
            BrushRunner::new(&config(&["alpha", "beta", "unused"]), client, providers).unwrap();
        assert_eq!(runner.site_names(), vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_run_once_adds_candidates() {
        let client = Arc::new(MockBrushClient::new());
        client.set_status(roomy_status()).await;
        let site = Arc::new(MockSiteProvider::new("alpha"));
        let now = Utc::now().timestamp();
        site.set_candidates(vec![free_site_torrent("1", now), free_site_torrent("2", now)])
            .await;

        let runner = BrushRunner::new(
            &config(&["alpha"]),
            client.clone(),
            vec![site.clone() as Arc<dyn SiteProvider>],
        )
        .unwrap();
        let summary = runner.run_once().await;

        match summary.site("alpha").unwrap() {
            SiteOutcome::Brushed {
                candidates, report, ..
            } => {
                assert_eq!(*candidates, 2);
                assert_eq!(report.added, 2);
            }
            other => panic!("expected brushed, got {:?}", other),
        }
        assert_eq!(client.torrent_count().await, 2);
        assert_eq!(site.downloaded().await.len(), 2);
        assert_eq!(runner.status().await.last_run, Some(summary));
    }

    #[tokio::test]
    async fn test_status_failure_skips_site() {
        let client = Arc::new(MockBrushClient::new());
        client
            .set_next_error(BrushClientError::ConnectionFailed("refused".to_string()))
            .await;
        let site = Arc::new(MockSiteProvider::new("alpha"));

        let runner = BrushRunner::new(
            &config(&["alpha"]),
            client.clone(),
            vec![site.clone() as Arc<dyn SiteProvider>],
        )
        .unwrap();
        let summary = runner.run_once().await;

        match summary.site("alpha").unwrap() {
            SiteOutcome::Skipped { reason } => {
                assert!(reason.starts_with("client status unavailable"));
            }
            other => panic!("expected skipped, got {:?}", other),
        }
        assert!(client.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_candidate_failure_still_manages_torrents() {
        let client = Arc::new(MockBrushClient::new());
        client.set_status(roomy_status()).await;
        let now = Utc::now().timestamp();
        let mut errored = seeding_torrent("err", now - 7200);
        errored.state = crate::brush::TorrentState::Error;
        client.add_mock_torrent(errored).await;

        let site = Arc::new(MockSiteProvider::new("alpha"));
        site.set_next_error(SiteError::Timeout).await;

        let runner = BrushRunner::new(
            &config(&["alpha"]),
            client.clone(),
            vec![site.clone() as Arc<dyn SiteProvider>],
        )
        .unwrap();
        let summary = runner.run_once().await;

        match summary.site("alpha").unwrap() {
            SiteOutcome::Brushed {
                candidates, report, ..
            } => {
                assert_eq!(*candidates, 0);
                assert_eq!(report.deleted, 1);
            }
            other => panic!("expected brushed, got {:?}", other),
        }
        assert!(!client.has_torrent("err").await);
    }

    #[tokio::test]
    async fn test_run_stops_when_client_full() {
        let client = Arc::new(MockBrushClient::new());
        client.set_status(roomy_status()).await;
        let now = Utc::now().timestamp();
        let alpha = Arc::new(MockSiteProvider::new("alpha"));
        alpha
            .set_candidates((0..10).map(|i| free_site_torrent(&i.to_string(), now)).collect())
            .await;
        let beta = Arc::new(MockSiteProvider::new("beta"));
        beta.set_candidates(vec![free_site_torrent("b1", now)]).await;

        let runner = BrushRunner::new(
            &config(&["alpha", "beta"]),
            client.clone(),
            vec![
                alpha.clone() as Arc<dyn SiteProvider>,
                beta.clone() as Arc<dyn SiteProvider>,
            ],
        )
        .unwrap();
        let summary = runner.run_once().await;

        assert_eq!(summary.sites.len(), 1);
        assert!(beta.downloaded().await.is_empty());
        // Default max_downloading_torrents is 6
        assert_eq!(client.torrent_count().await, 6);
    }

    #[tokio::test]
    async fn test_start_stop() {
        let client = Arc::new(MockBrushClient::new());
        client.set_status(roomy_status()).await;
        let site: Arc<dyn SiteProvider> = Arc::new(MockSiteProvider::new("alpha"));
        let runner = Arc::new(BrushRunner::new(&config(&["alpha"]), client, vec![site]).unwrap());

        runner.start();
        assert!(runner.status().await.running);

        // The first tick fires immediately
        for _ in 0..50 {
            if runner.status().await.last_run.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(runner.status().await.last_run.is_some());

        runner.stop();
        assert!(!runner.status().await.running);
    }
}
