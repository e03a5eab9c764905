//! Tolerant model of the WhatsApp Business webhook payload.
//!
//! Meta evolves this schema over time, so every field is optional and read
//! leniently: absent, `null` and wrongly-typed values all read as "absent".
//! Deserializing any JSON object into these types never fails.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// `object` value identifying WhatsApp Business Account deliveries.
pub const WABA_OBJECT: &str = "whatsapp_business_account";

/// Top-level webhook delivery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default, deserialize_with = "lenient")]
    pub object: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub entry: Option<Vec<Entry>>,
}

impl WebhookEnvelope {
    /// Read an envelope out of an already parsed body.
    pub fn from_json(body: &Value) -> Self {
        WebhookEnvelope::deserialize(body).unwrap_or_default()
    }

    pub fn is_whatsapp_business_account(&self) -> bool {
        self.object.as_deref() == Some(WABA_OBJECT)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub changes: Option<Vec<Change>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Change {
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<ChangeValue>,
}

/// The `value` object of a change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub messages: Option<Vec<InboundMessage>>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub statuses: Option<Vec<DeliveryStatus>>,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<Value>,
}

/// A message sent by a WhatsApp user to the business.
///
/// Only the sender and the text body are modelled; the full object is kept
/// in `raw` so non-text messages can still be reported.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    pub from: Option<String>,
    pub text: Option<TextContent>,
    pub raw: Value,
}

impl InboundMessage {
    pub fn text_body(&self) -> Option<&str> {
        self.text.as_ref().and_then(|t| t.body.as_deref())
    }
}

impl<'de> Deserialize<'de> for InboundMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Default, Deserialize)]
        struct Fields {
            #[serde(default, deserialize_with = "lenient")]
            from: Option<String>,
            #[serde(default, deserialize_with = "lenient")]
            text: Option<TextContent>,
        }

        let raw = Value::deserialize(deserializer)?;
        let fields = Fields::deserialize(&raw).unwrap_or_default();

        Ok(InboundMessage {
            from: fields.from,
            text: fields.text,
            raw,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextContent {
    #[serde(default, deserialize_with = "lenient")]
    pub body: Option<String>,
}

/// Delivery status update for a message the business sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    /// `sent`, `delivered`, `read`, `failed`, ...
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<String>,
}

/// Deserialize an optional field, mapping `null` and type mismatches to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Deserialize an optional array. A non-array reads as `None`; an element
/// that does not fit `T` is kept as `T::default()`.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        _ => return Ok(None),
    };

    Ok(Some(
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
    ))
}
