//! Webhook endpoint handlers.
//!
//! These handlers only do I/O plumbing: they hand query parameters, raw
//! bytes and parsed bodies to the pure functions in [`super::handshake`],
//! [`super::signature`] and [`crate::events`], report outcomes to the
//! configured [`EventSink`], and map results to status codes.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::events::{extract, Extraction};
use crate::sink::EventSink;
use crate::web::handshake::{verify_subscription, ChallengeResult, SubscriptionQuery};
use crate::web::signature::{check_signature, SIGNATURE_HEADER};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sink: Arc<dyn EventSink>,
}

impl AppState {
    pub fn new(config: Config, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config: Arc::new(config),
            sink,
        }
    }
}

/// Reasons a webhook request is refused.
///
/// Every variant is answered with an empty body.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("subscription handshake failed")]
    HandshakeFailed,

    #[error("payload signature is missing or invalid")]
    InvalidSignature,

    #[error("request body is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::HandshakeFailed | Rejection::InvalidSignature => StatusCode::FORBIDDEN,
            Rejection::MalformedBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

// =============================================================================
// Liveness
// =============================================================================

/// Liveness probe.
pub async fn liveness() -> &'static str {
    "OK"
}

// =============================================================================
// Subscription handshake
// =============================================================================

/// `GET /webhook`: echo `hub.challenge` when mode and token match.
///
/// A query string that does not decode (a repeated `hub.*` key, say) is a
/// failed handshake like any other.
pub async fn verify_webhook(
    State(state): State<AppState>,
    query: Result<Query<SubscriptionQuery>, QueryRejection>,
) -> Result<String, Rejection> {
    let query = query.map(|Query(q)| q).unwrap_or_default();

    match verify_subscription(&query, &state.config.verify_token) {
        ChallengeResult::Verified(challenge) => {
            state.sink.handshake_verified();
            Ok(challenge)
        }
        ChallengeResult::Rejected => {
            state.sink.handshake_rejected(query.mode.as_deref());
            Err(Rejection::HandshakeFailed)
        }
    }
}

// =============================================================================
// Event delivery
// =============================================================================

/// `POST /webhook`: verify the signature over the raw body, then extract
/// and report events.
///
/// Returns 200 for any WhatsApp Business Account delivery, even with no
/// events, since Meta retries anything else. Other `object` values get 404.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, Rejection> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    state.sink.delivery_received(body.len(), signature.is_some());

    if state.config.signature_verification_enabled() {
        if let Err(reason) = check_signature(&body, signature, &state.config.app_secret) {
            state.sink.signature_rejected(&reason);
            return Err(Rejection::InvalidSignature);
        }
    }

    let payload = parse_body(&body).map_err(|e| {
        state.sink.body_malformed(&e);
        Rejection::from(e)
    })?;

    match extract(&payload) {
        Extraction::Accepted(events) => {
            for event in &events {
                state.sink.event(event);
            }
            state.sink.delivery_processed(events.len());
            Ok(StatusCode::OK)
        }
        Extraction::Ignored { object } => {
            state.sink.envelope_ignored(object.as_deref());
            Ok(StatusCode::NOT_FOUND)
        }
    }
}

/// Parse the raw body. A blank body reads as an empty object.
fn parse_body(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body)
}
