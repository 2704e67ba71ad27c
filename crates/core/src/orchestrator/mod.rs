//! Brush runner for automated, periodic brushing.
//!
//! The runner ties the engine to its collaborators:
//! - **Inspect**: client status and inventory, site candidates
//! - **Decide**: one [`crate::brush::decide`] call per site
//! - **Apply**: the plan is executed against the client in a fixed order

mod apply;
mod config;
mod runner;
mod types;

pub use apply::apply_result;
pub use config::RunnerConfig;
pub use runner::BrushRunner;
pub use types::{
    ApplyAction, ApplyFailure, ApplyReport, RunSummary, RunnerError, RunnerStatus, SiteOutcome,
    SiteRun,
};
