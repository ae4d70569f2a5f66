//! API Handlers - endpoint implementations

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::PhishError;
use crate::history::{ScanHistory, ScanRecord, ScanStats};
use crate::scorer::Scorer;
use crate::types::{ClassificationRequest, ClassificationResult, InputKind};

/// Shared handler state
pub struct AppState {
    pub scorer: Arc<Scorer>,
    /// `None` when scan history is disabled
    pub history: Option<Arc<ScanHistory>>,
    /// Upper bound on scans returned by history endpoints
    pub max_results: i64,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(msg: &str) -> Self {
        Self {
            error: msg.to_string(),
        }
    }
}

fn status_for(err: &PhishError) -> StatusCode {
    match err {
        err if err.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
        PhishError::MalformedInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for PhishError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
        }
        (status, Json(ApiError::new(&self.to_string()))).into_response()
    }
}

/// Prediction request body. Fields are optional here so that a missing
/// field surfaces as a malformed-input error rather than an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl PredictRequest {
    pub fn into_request(self) -> Result<ClassificationRequest, PhishError> {
        let text = self
            .text
            .ok_or_else(|| PhishError::MalformedInput("missing field 'text'".to_string()))?;
        let kind = self
            .kind
            .ok_or_else(|| PhishError::MalformedInput("missing field 'type'".to_string()))?
            .parse::<InputKind>()?;
        Ok(ClassificationRequest::new(text, kind))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub scans: Vec<ScanRecord>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    #[serde(flatten)]
    pub stats: ScanStats,
    pub recent_scans: Vec<ScanRecord>,
}

/// GET / - Service banner
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ML Service Running".to_string(),
    })
}

/// GET /health - Liveness plus model state
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let model_loaded = state.scorer.is_ready();
    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "degraded" }.to_string(),
        model_loaded,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /predict - Classify a URL or email body
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<ClassificationResult>, PhishError> {
    let Json(payload) = payload.map_err(|e| PhishError::MalformedInput(e.body_text()))?;
    let request = payload.into_request()?;

    let result = state.scorer.classify(&request)?;
    debug!(
        "Classified {} input: is_phishing={} confidence={:.4}",
        request.kind, result.is_phishing, result.confidence
    );

    if let Some(history) = &state.history {
        if let Err(e) = history.record(&request, &result).await {
            warn!("Failed to record scan: {}", e);
        }
    }

    Ok(Json(result))
}

/// GET /history - Most recent scans
pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, PhishError> {
    let limit = query
        .limit
        .unwrap_or(state.max_results)
        .clamp(0, state.max_results);

    let scans = match &state.history {
        Some(history) => history.recent(limit).await?,
        None => Vec::new(),
    };

    Ok(Json(HistoryResponse { scans }))
}

/// DELETE /history - Drop all recorded scans
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearResponse>, PhishError> {
    let deleted = match &state.history {
        Some(history) => history.clear().await?,
        None => 0,
    };
    if deleted > 0 {
        info!("Cleared {} scans from history", deleted);
    }

    Ok(Json(ClearResponse { deleted }))
}

/// GET /analytics - Aggregate counts and recent scans
pub async fn analytics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalyticsResponse>, PhishError> {
    let response = match &state.history {
        Some(history) => AnalyticsResponse {
            stats: history.stats().await?,
            recent_scans: history.recent(state.max_results).await?,
        },
        None => AnalyticsResponse {
            stats: ScanStats::default(),
            recent_scans: Vec::new(),
        },
    };

    Ok(Json(response))
}
