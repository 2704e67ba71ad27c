//! Types for the brush runner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while setting up the runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A site provider has no `[[sites]]` entry.
    #[error("no configuration for site: {0}")]
    UnknownSite(String),

    /// Site policy could not be built.
    #[error("invalid site configuration: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Kind of client action taken while applying a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyAction {
    Delete,
    Stall,
    Resume,
    Modify,
    Add,
}

impl ApplyAction {
    /// Returns the string representation used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyAction::Delete => "delete",
            ApplyAction::Stall => "stall",
            ApplyAction::Resume => "resume",
            ApplyAction::Modify => "modify",
            ApplyAction::Add => "add",
        }
    }
}

impl std::fmt::Display for ApplyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A planned action the client or site rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyFailure {
    pub action: ApplyAction,
    /// Torrent name.
    pub name: String,
    pub error: String,
}

/// Outcome of applying one plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub deleted: usize,
    pub stalled: usize,
    pub resumed: usize,
    pub modified: usize,
    pub added: usize,
    pub failures: Vec<ApplyFailure>,
}

impl ApplyReport {
    /// Count one successful action.
    pub fn record_success(&mut self, action: ApplyAction) {
        match action {
            ApplyAction::Delete => self.deleted += 1,
            ApplyAction::Stall => self.stalled += 1,
            ApplyAction::Resume => self.resumed += 1,
            ApplyAction::Modify => self.modified += 1,
            ApplyAction::Add => self.added += 1,
        }
    }

    /// Total successful actions.
    pub fn applied(&self) -> usize {
        self.deleted + self.stalled + self.resumed + self.modified + self.added
    }
}

/// What happened to one site during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SiteOutcome {
    /// The engine ran and its plan was applied.
    Brushed {
        candidates: usize,
        report: ApplyReport,
        can_add_more: bool,
        free_space_change: i64,
    },
    /// The client could not be inspected; nothing was decided.
    Skipped { reason: String },
}

impl SiteOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, SiteOutcome::Skipped { .. })
    }
}

/// One site visited during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRun {
    pub site: String,
    #[serde(flatten)]
    pub outcome: SiteOutcome,
}

/// Result of one pass over all configured sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub sites: Vec<SiteRun>,
}

impl RunSummary {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            sites: Vec::new(),
        }
    }

    /// Look up the outcome for a site.
    pub fn site(&self, name: &str) -> Option<&SiteOutcome> {
        self.sites
            .iter()
            .find(|run| run.site == name)
            .map(|run| &run.outcome)
    }

    pub fn brushed_count(&self) -> usize {
        self.sites.iter().filter(|run| !run.outcome.is_skipped()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.sites.iter().filter(|run| run.outcome.is_skipped()).count()
    }
}

/// Current status of the runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerStatus {
    /// Whether the periodic loop is running.
    pub running: bool,
    /// Summary of the most recent run, if any.
    pub last_run: Option<RunSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_report_counts() {
        let mut report = ApplyReport::default();
        report.record_success(ApplyAction::Delete);
        report.record_success(ApplyAction::Add);
        report.record_success(ApplyAction::Add);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.added, 2);
        assert_eq!(report.applied(), 3);
    }

    #[test]
    fn test_site_run_serialization() {
        let run = SiteRun {
            site: "alpha".to_string(),
            outcome: SiteOutcome::Skipped {
                reason: "client status unavailable".to_string(),
            },
        };
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["site"], "alpha");
        assert_eq!(json["outcome"], "skipped");
        assert_eq!(json["reason"], "client status unavailable");

        let parsed: SiteRun = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, run);
    }

    #[test]
    fn test_run_summary_counts() {
        let mut summary = RunSummary::new(Utc::now());
        summary.sites.push(SiteRun {
            site: "alpha".to_string(),
            outcome: SiteOutcome::Brushed {
                candidates: 3,
                report: ApplyReport::default(),
                can_add_more: true,
                free_space_change: 0,
            },
        });
        summary.sites.push(SiteRun {
            site: "beta".to_string(),
            outcome: SiteOutcome::Skipped {
                reason: "x".to_string(),
            },
        });
        assert_eq!(summary.brushed_count(), 1);
        assert_eq!(summary.skipped_count(), 1);
        assert!(summary.site("beta").unwrap().is_skipped());
        assert!(summary.site("gamma").is_none());
    }

    #[test]
    fn test_error_display() {
        let err = RunnerError::UnknownSite("gamma".to_string());
        assert_eq!(err.to_string(), "no configuration for site: gamma");
        assert_eq!(ApplyAction::Stall.to_string(), "stall");
    }
}
