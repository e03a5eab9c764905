//! Flattening of a webhook delivery into event records.
//!
//! ```text
//! envelope → entry[] → changes[] → value → messages[] / statuses[] / metadata
//! ```
//!
//! Events come out in payload order: entries, then changes, then within a
//! change its messages, its statuses and finally its metadata.

use serde_json::Value;

use super::payload::{ChangeValue, DeliveryStatus, InboundMessage, WebhookEnvelope};

/// A message received from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub from: Option<String>,
    /// The text body, or the whole message rendered as compact JSON when the
    /// message carries no text body.
    pub text: String,
}

/// A delivery status update for an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub id: Option<String>,
    pub status: Option<String>,
    pub timestamp: Option<String>,
}

/// The `metadata` object of a change, passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEvent {
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    Message(MessageEvent),
    Status(StatusEvent),
    Metadata(MetadataEvent),
}

/// Result of extracting a delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// A WhatsApp Business Account delivery, possibly with zero events.
    Accepted(Vec<WebhookEvent>),
    /// Any other `object`; nothing was traversed.
    Ignored { object: Option<String> },
}

impl Extraction {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Extraction::Accepted(_))
    }

    pub fn events(&self) -> &[WebhookEvent] {
        match self {
            Extraction::Accepted(events) => events,
            Extraction::Ignored { .. } => &[],
        }
    }
}

/// Extract events from a parsed webhook body.
pub fn extract(body: &Value) -> Extraction {
    extract_envelope(&WebhookEnvelope::from_json(body))
}

/// Extract events from an already decoded envelope.
pub fn extract_envelope(envelope: &WebhookEnvelope) -> Extraction {
    if !envelope.is_whatsapp_business_account() {
        return Extraction::Ignored {
            object: envelope.object.clone(),
        };
    }

    let events = envelope
        .entry
        .iter()
        .flatten()
        .flat_map(|entry| entry.changes.iter().flatten())
        .filter_map(|change| change.value.as_ref())
        .flat_map(value_events)
        .collect();

    Extraction::Accepted(events)
}

fn value_events(value: &ChangeValue) -> Vec<WebhookEvent> {
    let mut events = Vec::new();

    for message in value.messages.iter().flatten() {
        events.push(WebhookEvent::Message(message_event(message)));
    }

    for status in value.statuses.iter().flatten() {
        events.push(WebhookEvent::Status(status_event(status)));
    }

    if let Some(metadata) = value.metadata.as_ref().filter(|m| is_truthy(m)) {
        events.push(WebhookEvent::Metadata(MetadataEvent {
            metadata: metadata.clone(),
        }));
    }

    events
}

/// `false`, `0` and `""` count as no metadata, same as `null`.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn message_event(message: &InboundMessage) -> MessageEvent {
    let text = match message.text_body() {
        Some(body) => body.to_string(),
        None => message.raw.to_string(),
    };

    MessageEvent {
        from: message.from.clone(),
        text,
    }
}

fn status_event(status: &DeliveryStatus) -> StatusEvent {
    StatusEvent {
        id: status.id.clone(),
        status: status.status.clone(),
        timestamp: status.timestamp.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(from: &str, text: &str) -> WebhookEvent {
        WebhookEvent::Message(MessageEvent {
            from: Some(from.to_string()),
            text: text.to_string(),
        })
    }

    fn status(id: &str, state: &str, timestamp: &str) -> WebhookEvent {
        WebhookEvent::Status(StatusEvent {
            id: Some(id.to_string()),
            status: Some(state.to_string()),
            timestamp: Some(timestamp.to_string()),
        })
    }

    #[test]
    fn test_single_text_message() {
        let body = json!({
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"value": {
                "messages": [{"from": "5551234567", "text": {"body": "hola"}}]
            }}]}]
        });

        assert_eq!(
            extract(&body),
            Extraction::Accepted(vec![message("5551234567", "hola")])
        );
    }

    #[test]
    fn test_single_status() {
        let body = json!({
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"value": {
                "statuses": [{"id": "wamid.1", "status": "delivered", "timestamp": "1700000000"}]
            }}]}]
        });

        assert_eq!(
            extract(&body),
            Extraction::Accepted(vec![status("wamid.1", "delivered", "1700000000")])
        );
    }

    #[test]
    fn test_other_object_ignored_regardless_of_entries() {
        let entry = json!([{"changes": [{"value": {
            "messages": [{"from": "1", "text": {"body": "x"}}]
        }}]}]);

        for object in [json!("page"), json!("instagram"), json!(""), json!(null), json!(1)] {
            let body = json!({"object": object, "entry": entry});
            let extraction = extract(&body);
            assert!(!extraction.is_accepted(), "object {:?} accepted", object);
            assert!(extraction.events().is_empty());
        }

        assert!(!extract(&json!({"entry": entry})).is_accepted());
        assert_eq!(
            extract(&json!({"object": "page"})),
            Extraction::Ignored {
                object: Some("page".to_string())
            }
        );
    }

    #[test]
    fn test_absence_at_every_level() {
        let bodies = [
            json!({"object": "whatsapp_business_account"}),
            json!({"object": "whatsapp_business_account", "entry": []}),
            json!({"object": "whatsapp_business_account", "entry": [{}]}),
            json!({"object": "whatsapp_business_account", "entry": [{"changes": []}]}),
            json!({"object": "whatsapp_business_account", "entry": [{"changes": [{}]}]}),
            json!({"object": "whatsapp_business_account", "entry": [{"changes": [{"value": {}}]}]}),
            json!({"object": "whatsapp_business_account", "entry": [{"changes": [{"value": null}]}]}),
            json!({"object": "whatsapp_business_account", "entry": null}),
        ];

        for body in bodies {
            assert_eq!(extract(&body), Extraction::Accepted(vec![]), "body {}", body);
        }
    }

    #[test]
    fn test_image_message_falls_back_to_json() {
        let body = json!({
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"value": {
                "messages": [{
                    "from": "5551234567",
                    "id": "wamid.img",
                    "type": "image",
                    "image": {"id": "media-1", "mime_type": "image/jpeg"}
                }]
            }}]}]
        });

        let extraction = extract(&body);
        assert_eq!(extraction.events().len(), 1);
        match &extraction.events()[0] {
            WebhookEvent::Message(event) => {
                assert_eq!(event.from.as_deref(), Some("5551234567"));
                assert_eq!(
                    event.text,
                    r#"{"from":"5551234567","id":"wamid.img","type":"image","image":{"id":"media-1","mime_type":"image/jpeg"}}"#
                );
            }
            other => panic!("expected message event, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_text_body_is_kept() {
        let body = json!({
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"value": {
                "messages": [{"from": "1", "text": {"body": ""}}]
            }}]}]
        });

        assert_eq!(extract(&body), Extraction::Accepted(vec![message("1", "")]));
    }

    #[test]
    fn test_metadata_once_per_change() {
        let metadata = json!({"display_phone_number": "15550783881", "phone_number_id": "106540352242922"});
        let body = json!({
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"value": {
                "metadata": metadata,
                "messages": [
                    {"from": "1", "text": {"body": "a"}},
                    {"from": "2", "text": {"body": "b"}}
                ],
                "statuses": [{"id": "wamid.9", "status": "read", "timestamp": "1700000009"}]
            }}]}]
        });

        assert_eq!(
            extract(&body),
            Extraction::Accepted(vec![
                message("1", "a"),
                message("2", "b"),
                status("wamid.9", "read", "1700000009"),
                WebhookEvent::Metadata(MetadataEvent { metadata }),
            ])
        );
    }

    #[test]
    fn test_falsy_metadata_skipped() {
        for metadata in [json!(false), json!(0), json!(0.0), json!("")] {
            let body = json!({
                "object": "whatsapp_business_account",
                "entry": [{"changes": [{"value": {"metadata": metadata}}]}]
            });
            assert_eq!(extract(&body), Extraction::Accepted(vec![]), "metadata {}", metadata);
        }

        for metadata in [json!(true), json!(1), json!("x"), json!([]), json!({})] {
            let body = json!({
                "object": "whatsapp_business_account",
                "entry": [{"changes": [{"value": {"metadata": metadata}}]}]
            });
            assert_eq!(
                extract(&body),
                Extraction::Accepted(vec![WebhookEvent::Metadata(MetadataEvent {
                    metadata: metadata.clone()
                })]),
            );
        }
    }

    #[test]
    fn test_traversal_order_across_entries_and_changes() {
        let body = json!({
            "object": "whatsapp_business_account",
            "entry": [
                {"changes": [
                    {"value": {"messages": [{"from": "1", "text": {"body": "first"}}]}},
                    {"value": {"statuses": [{"id": "s1", "status": "sent", "timestamp": "1"}]}}
                ]},
                {},
                {"changes": [
                    {"value": {"messages": [{"from": "2", "text": {"body": "second"}}]}}
                ]}
            ]
        });

        assert_eq!(
            extract(&body),
            Extraction::Accepted(vec![
                message("1", "first"),
                status("s1", "sent", "1"),
                message("2", "second"),
            ])
        );
    }

    #[test]
    fn test_status_with_missing_fields() {
        let body = json!({
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"value": {"statuses": [{"status": "failed"}]}}]}]
        });

        assert_eq!(
            extract(&body),
            Extraction::Accepted(vec![WebhookEvent::Status(StatusEvent {
                id: None,
                status: Some("failed".to_string()),
                timestamp: None,
            })])
        );
    }
}
