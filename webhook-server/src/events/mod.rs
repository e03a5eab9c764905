//! WhatsApp Business webhook payloads and their flattening into events.
//!
//! ## Processing Flow
//!
//! ```text
//! raw bytes → serde_json::Value → WebhookEnvelope → extract() → Vec<WebhookEvent>
//! ```

pub mod extract;
pub mod payload;

pub use extract::{
    extract, extract_envelope, Extraction, MessageEvent, MetadataEvent, StatusEvent,
    WebhookEvent,
};
pub use payload::{
    Change, ChangeValue, DeliveryStatus, Entry, InboundMessage, TextContent, WebhookEnvelope,
    WABA_OBJECT,
};
