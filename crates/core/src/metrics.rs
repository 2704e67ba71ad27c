//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Decisions (planned actions, scored candidates)
//! - Runner (site iterations, failed client actions)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

use crate::brush::AlgorithmResult;

// =============================================================================
// Decision Metrics
// =============================================================================

/// Planned actions by kind.
pub static BRUSH_ACTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("brush_actions_total", "Total actions planned by the engine"),
        &["action"], // "delete", "stall", "resume", "modify", "add"
    )
    .unwrap()
});

/// Site candidates run through the scorer.
pub static CANDIDATES_SCORED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "brush_candidates_scored_total",
        "Total site candidates scored",
    )
    .unwrap()
});

// =============================================================================
// Runner Metrics
// =============================================================================

/// Site iterations by result.
pub static SITE_ITERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "brush_site_iterations_total",
            "Total site iterations of the brush runner",
        ),
        &["result"], // "brushed", "skipped"
    )
    .unwrap()
});

/// Client actions that failed while applying a plan.
pub static APPLY_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "brush_apply_failures_total",
            "Total failed client actions while applying a plan",
        ),
        &["action"],
    )
    .unwrap()
});

/// Duration of one full runner pass over all sites.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("brush_run_duration_seconds", "Duration of a brush run")
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &[],
    )
    .unwrap()
});

/// Count the actions of a plan.
pub fn record_result(result: &AlgorithmResult) {
    let counts = [
        ("delete", result.delete_torrents.len()),
        ("stall", result.stall_torrents.len()),
        ("resume", result.resume_torrents.len()),
        ("modify", result.modify_torrents.len()),
        ("add", result.add_torrents.len()),
    ];
    for (action, count) in counts {
        if count > 0 {
            BRUSH_ACTIONS_TOTAL
                .with_label_values(&[action])
                .inc_by(count as u64);
        }
    }
}

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(BRUSH_ACTIONS_TOTAL.clone()),
        Box::new(CANDIDATES_SCORED_TOTAL.clone()),
        Box::new(SITE_ITERATIONS_TOTAL.clone()),
        Box::new(APPLY_FAILURES_TOTAL.clone()),
        Box::new(RUN_DURATION.clone()),
    ]
}
