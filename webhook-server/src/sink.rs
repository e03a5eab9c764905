//! Reporting of webhook outcomes.
//!
//! Handlers never log directly; they report to an [`EventSink`] held in the
//! application state. Production uses [`TracingSink`]; tests plug in a
//! recorder. The request lifecycle hooks default to doing nothing.

use tracing::{error, info, warn};

use crate::events::WebhookEvent;
use crate::web::signature::SignatureError;

/// Receiver for everything the webhook endpoint observes.
pub trait EventSink: Send + Sync {
    /// The subscription handshake succeeded.
    fn handshake_verified(&self);

    /// The subscription handshake was refused.
    fn handshake_rejected(&self, mode: Option<&str>);

    /// A POST body was refused because its signature did not verify.
    fn signature_rejected(&self, reason: &SignatureError);

    /// A delivery whose `object` is not a WhatsApp Business Account.
    fn envelope_ignored(&self, object: Option<&str>);

    /// One event extracted from an accepted delivery.
    fn event(&self, event: &WebhookEvent);

    /// A POST delivery arrived, before any check.
    fn delivery_received(&self, _body_length: usize, _has_signature: bool) {}

    /// A POST body passed the signature check but is not valid JSON.
    fn body_malformed(&self, _error: &serde_json::Error) {}

    /// An accepted delivery has been fully reported.
    fn delivery_processed(&self, _event_count: usize) {}
}

/// Structured log output through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn handshake_verified(&self) {
        info!("webhook_verified");
    }

    fn handshake_rejected(&self, mode: Option<&str>) {
        warn!(mode = ?mode, "webhook_verification_failed");
    }

    fn signature_rejected(&self, reason: &SignatureError) {
        error!(reason = %reason, "webhook_signature_invalid");
    }

    fn envelope_ignored(&self, object: Option<&str>) {
        info!(object = ?object, "webhook_object_ignored");
    }

    fn event(&self, event: &WebhookEvent) {
        match event {
            WebhookEvent::Message(message) => {
                info!(
                    from = ?message.from,
                    text = %message.text,
                    "message_received"
                );
            }
            WebhookEvent::Status(status) => {
                info!(
                    id = ?status.id,
                    status = ?status.status,
                    timestamp = ?status.timestamp,
                    "status_received"
                );
            }
            WebhookEvent::Metadata(metadata) => {
                info!(metadata = %metadata.metadata, "metadata_received");
            }
        }
    }

    fn delivery_received(&self, body_length: usize, has_signature: bool) {
        info!(body_length, has_signature, "webhook_received");
    }

    fn body_malformed(&self, error: &serde_json::Error) {
        warn!(error = %error, "webhook_body_malformed");
    }

    fn delivery_processed(&self, event_count: usize) {
        info!(event_count, "webhook_processed");
    }
}
