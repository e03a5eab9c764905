//! WABA Webhook - receiver for WhatsApp Business Cloud API callbacks.
//!
//! The library splits the endpoint into pure pieces that the web layer wires
//! together:
//! - [`web::handshake`]: subscription challenge for `GET /webhook`
//! - [`web::signature`]: `X-Hub-Signature-256` verification over raw bytes
//! - [`events`]: tolerant traversal of the delivery into event records
//! - [`sink`]: where handlers report what they saw
//!
//! ## Request Flow
//!
//! ```text
//! POST /webhook → signature check (raw bytes) → JSON parse → extract() → EventSink
//! ```

pub mod config;
pub mod events;
pub mod sink;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use events::{extract, Extraction, WebhookEvent};
pub use sink::{EventSink, TracingSink};
pub use web::{build_router, AppState};
