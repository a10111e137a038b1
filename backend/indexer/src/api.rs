//! Axum REST API handlers.
//!
//! Three protocols share this surface:
//!
//! * **Admission** — `POST /admit` evaluates a candidate transaction.
//! * **Lifecycle** — `POST /events/output-{added,spent,removed}` mirror
//!   ledger events into the projection.  Handler failures are answered as
//!   structured errors, never propagated as faults past this boundary.
//! * **Lookup** — `POST /lookup` answers a tagged query.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use bounty_protocol::{admit, SigVerifier, UtxoRef};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::error;

use crate::errors::IndexerError;
use crate::projection::Projection;
use crate::query::{self, LookupQuestion};

pub struct ApiState {
    pub pool: SqlitePool,
    pub projection: Projection,
    pub verifier: SigVerifier,
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AdmitRequest {
    /// Hex-encoded transaction envelope.
    pub transaction: String,
    #[serde(default)]
    pub previous_coins: Vec<UtxoRef>,
}

#[derive(Deserialize)]
pub struct OutputAddedRequest {
    pub txid: String,
    pub vout: u32,
    /// Hex-encoded locking script.
    pub script: String,
    pub value: u64,
    pub topic: String,
}

#[derive(Deserialize)]
pub struct OutputEventRequest {
    pub txid: String,
    pub vout: u32,
    pub topic: String,
}

#[derive(Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn bad_request(error: impl ToString) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn store_failure(stage: &str, error: &IndexerError) -> axum::response::Response {
    error!(stage, %error, "store operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /admit`
///
/// Evaluates every output of the submitted transaction.  A malformed
/// envelope is a 400 for the whole call; per-output rejections are simply
/// absent from `outputs_to_admit`.
pub async fn admit_transaction(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<AdmitRequest>,
) -> impl IntoResponse {
    let tx_bytes = match hex::decode(&req.transaction) {
        Ok(bytes) => bytes,
        Err(e) => return bad_request(format!("transaction is not valid hex: {e}")),
    };
    match admit(&state.verifier, &tx_bytes, &req.previous_coins) {
        Ok(admittance) => (StatusCode::OK, Json(admittance)).into_response(),
        Err(e) => bad_request(format!("malformed transaction envelope: {e}")),
    }
}

fn parse_ref(txid: &str, vout: u32) -> Result<UtxoRef, axum::response::Response> {
    UtxoRef::parse(txid, vout).map_err(|_| bad_request("txid must be 32 hex-encoded bytes"))
}

/// `POST /events/output-added`
pub async fn output_added(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<OutputAddedRequest>,
) -> impl IntoResponse {
    let r = match parse_ref(&req.txid, req.vout) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let script = match hex::decode(&req.script) {
        Ok(script) => script,
        Err(e) => return bad_request(format!("script is not valid hex: {e}")),
    };
    match state
        .projection
        .output_added(r, &script, req.value, &req.topic)
        .await
    {
        Ok(()) => (StatusCode::OK, Json(AckResponse { ok: true })).into_response(),
        Err(e) => store_failure("output_added", &e),
    }
}

/// `POST /events/output-spent`
pub async fn output_spent(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<OutputEventRequest>,
) -> impl IntoResponse {
    let r = match parse_ref(&req.txid, req.vout) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match state.projection.output_spent(r, &req.topic).await {
        Ok(()) => (StatusCode::OK, Json(AckResponse { ok: true })).into_response(),
        Err(e) => store_failure("output_spent", &e),
    }
}

/// `POST /events/output-removed`
pub async fn output_removed(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<OutputEventRequest>,
) -> impl IntoResponse {
    let r = match parse_ref(&req.txid, req.vout) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match state.projection.output_removed(r, &req.topic).await {
        Ok(()) => (StatusCode::OK, Json(AckResponse { ok: true })).into_response(),
        Err(e) => store_failure("output_removed", &e),
    }
}

/// `POST /lookup`
///
/// The body is parsed against the tagged query union; anything matching no
/// variant is answered as a structured `InvalidQuery` error, not an axum
/// rejection.
pub async fn lookup(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let question: LookupQuestion = match serde_json::from_value(body) {
        Ok(question) => question,
        Err(e) => return bad_request(format!("invalid query: {e}")),
    };
    match query::lookup(&state.pool, &question).await {
        Ok(answer) => (StatusCode::OK, Json(answer)).into_response(),
        Err(e @ IndexerError::InvalidQuery(_)) => bad_request(e),
        Err(e) => store_failure("lookup", &e),
    }
}
