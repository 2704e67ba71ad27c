//! Brush engine API handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use brush_core::metrics::{record_result, CANDIDATES_SCORED_TOTAL};
use brush_core::{
    decide as decide_plan, rate_site_torrent, AlgorithmResult, BrushSiteOption, ClientStatus,
    ClientTorrent, SiteTorrent,
};

use crate::metrics::DECISIONS_SERVED_TOTAL;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    /// Name of a configured site.
    pub site: String,
    /// Unix time to decide at; defaults to the current time.
    #[serde(default)]
    pub now: Option<i64>,
    pub status: ClientStatus,
    #[serde(default)]
    pub torrents: Vec<ClientTorrent>,
    #[serde(default)]
    pub candidates: Vec<SiteTorrent>,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub site: String,
    #[serde(default)]
    pub now: Option<i64>,
    #[serde(default)]
    pub candidates: Vec<SiteTorrent>,
}

#[derive(Debug, Serialize)]
pub struct RatedCandidate {
    pub id: String,
    pub name: String,
    pub score: f64,
    pub predicted_upload_speed: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    /// Best first; excluded candidates (score 0) last.
    pub ratings: Vec<RatedCandidate>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors returned by the brush endpoints.
#[derive(Debug)]
pub enum ApiError {
    SiteNotFound(String),
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::SiteNotFound(site) => {
                (StatusCode::NOT_FOUND, format!("Site not configured: {}", site))
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn site_option(state: &AppState, site: &str, now: Option<i64>) -> Result<BrushSiteOption, ApiError> {
    let config = state
        .site(site)
        .ok_or_else(|| ApiError::SiteNotFound(site.to_string()))?;
    let now = now.unwrap_or_else(|| Utc::now().timestamp());
    BrushSiteOption::from_config(config, now).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/decide
///
/// Compute a brush plan for a client snapshot against one site's candidates.
pub async fn decide(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DecideRequest>, JsonRejection>,
) -> Result<Json<AlgorithmResult>, ApiError> {
    let Json(body) = body?;
    let option = site_option(&state, &body.site, body.now)?;

    CANDIDATES_SCORED_TOTAL.inc_by(body.candidates.len() as u64);
    let result = decide_plan(
        &body.status,
        &body.torrents,
        &body.candidates,
        &option,
        state.client_option(),
    );
    record_result(&result);
    DECISIONS_SERVED_TOTAL
        .with_label_values(&[body.site.as_str()])
        .inc();

    Ok(Json(result))
}

/// POST /api/v1/rate
///
/// Score site candidates without deciding anything.
pub async fn rate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RateRequest>, JsonRejection>,
) -> Result<Json<RateResponse>, ApiError> {
    let Json(body) = body?;
    let option = site_option(&state, &body.site, body.now)?;

    CANDIDATES_SCORED_TOTAL.inc_by(body.candidates.len() as u64);
    let mut ratings: Vec<RatedCandidate> = body
        .candidates
        .iter()
        .map(|torrent| {
            let rating = rate_site_torrent(torrent, &option);
            RatedCandidate {
                id: torrent.id.clone(),
                name: torrent.name.clone(),
                score: rating.score,
                predicted_upload_speed: rating.predicted_upload_speed,
                note: rating.note,
            }
        })
        .collect();
    ratings.sort_by(|a, b| b.score.total_cmp(&a.score));
    debug!(site = %body.site, rated = ratings.len(), "candidates rated");

    Ok(Json(RateResponse { ratings }))
}
