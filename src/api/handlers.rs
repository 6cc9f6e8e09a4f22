//! Request handlers
//!
//! Every handler reads a single [`IndexSnapshot`](crate::index::IndexSnapshot)
//! so counts, matches and timestamps in one response belong to the same
//! refresh cycle.

use super::AppState;
use crate::{chain::detect_chain, chain::ChainFamily, refresh::RefreshOutcome};
use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const SERVICE_MESSAGE: &str = "DarkScan Backend API is running.";

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub count: usize,
    pub last_update: Option<DateTime<Utc>>,
    pub sources: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub count: usize,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub address: String,
    pub detected_chain: ChainFamily,
    pub matched_sources: Vec<String>,
    pub count: usize,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub outcome: RefreshOutcome,
    pub count: usize,
    pub last_update: Option<DateTime<Utc>>,
    pub sources: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
}

fn error(status: StatusCode, message: &'static str) -> Response {
    (status, Json(ErrorResponse { status: "error", message })).into_response()
}

/// `GET /`
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let snapshot = state.live.current().await;
    Json(RootResponse {
        message: SERVICE_MESSAGE,
        count: snapshot.index.len(),
        last_update: snapshot.metadata.last_update,
        sources: snapshot.metadata.sources_used.clone(),
    })
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.live.current().await;
    Json(HealthResponse {
        status: "ok",
        count: snapshot.index.len(),
        last_update: snapshot.metadata.last_update,
    })
}

/// `GET /check?addr=<address>`
///
/// A repeated `addr` takes its first value.
pub async fn check(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let address = first_param(&params, "addr").map(str::trim).unwrap_or_default();
    if address.is_empty() {
        return error(StatusCode::BAD_REQUEST, "❌ address is required");
    }

    let snapshot = state.live.current().await;
    let matched_sources = snapshot.index.lookup(address);
    let (status, message) = if matched_sources.is_empty() {
        ("safe", "🟢 safe address")
    } else {
        ("risky", "⚠️ risky address")
    };
    log::debug!("check {} -> {} ({} sources)", address, status, matched_sources.len());

    Json(CheckResponse {
        status,
        message,
        address: address.to_string(),
        detected_chain: detect_chain(address),
        matched_sources,
        count: snapshot.index.len(),
        last_update: snapshot.metadata.last_update,
    })
    .into_response()
}

/// `POST /admin/refresh`
///
/// Requires `Authorization: Bearer <ADMIN_TOKEN>` when a token is configured.
/// Answers 409 instead of queueing when a cycle is already running.
pub async fn admin_refresh(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = state.admin_token.as_deref() {
        if !bearer_matches(&headers, token) {
            log::warn!("Rejected admin refresh: bad or missing bearer token");
            return error(StatusCode::UNAUTHORIZED, "unauthorized");
        }
    }

    match state.orchestrator.try_refresh().await {
        Some(report) => Json(RefreshResponse {
            status: "refreshed",
            outcome: report.outcome,
            count: report.metadata.address_count,
            last_update: report.metadata.last_update,
            sources: report.metadata.sources_used,
        })
        .into_response(),
        None => error(StatusCode::CONFLICT, "refresh already in progress"),
    }
}

fn first_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn bearer_matches(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|presented| presented == token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn test_first_param_takes_first_occurrence() {
        let params = vec![
            ("other".to_string(), "x".to_string()),
            ("addr".to_string(), "addr1".to_string()),
            ("addr".to_string(), "addr2".to_string()),
        ];
        assert_eq!(first_param(&params, "addr"), Some("addr1"));
        assert_eq!(first_param(&params, "missing"), None);
    }

    #[test]
    fn test_bearer_matches() {
        assert!(bearer_matches(&headers_with("Bearer s3cret"), "s3cret"));
        assert!(!bearer_matches(&headers_with("Bearer wrong"), "s3cret"));
        assert!(!bearer_matches(&headers_with("s3cret"), "s3cret"));
        assert!(!bearer_matches(&headers_with("Basic s3cret"), "s3cret"));
        assert!(!bearer_matches(&HeaderMap::new(), "s3cret"));
    }
}
