//! Web server module for the WhatsApp Business webhook.
//!
//! # Endpoints
//!
//! - `GET /webhook` - Subscription handshake (200 + challenge, or 403)
//! - `POST /webhook` - Event delivery (200, 404 for non-WABA objects, 403 on bad signature)
//! - `GET /` - Liveness probe, returns `OK`

pub mod handlers;
pub mod handshake;
pub mod signature;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use handlers::{liveness, receive_webhook, verify_webhook, AppState, Rejection};
pub use handshake::{verify_subscription, ChallengeResult, SubscriptionQuery};
pub use signature::{
    check_signature, constant_time_eq, is_valid_signature, signature_header_for, SignatureError,
    SIGNATURE_HEADER,
};

/// Build the router with all endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
