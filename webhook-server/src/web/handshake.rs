//! Subscription handshake for `GET /webhook`.
//!
//! When the webhook is registered, Meta sends `hub.mode=subscribe`, the
//! verify token configured in the app dashboard and a random
//! `hub.challenge`. Echoing the challenge back confirms the subscription.

use serde::Deserialize;

/// Mode value Meta sends when subscribing a webhook.
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Query parameters of the subscription handshake.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SubscriptionQuery {
    #[serde(default, rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(default, rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(default, rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Outcome of a handshake attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeResult {
    /// Handshake accepted; the challenge is sent back verbatim.
    Verified(String),
    /// Wrong mode, wrong token or missing token.
    Rejected,
}

impl ChallengeResult {
    pub fn is_verified(&self) -> bool {
        matches!(self, ChallengeResult::Verified(_))
    }
}

/// Check a handshake against the configured verify token.
pub fn verify_subscription(query: &SubscriptionQuery, verify_token: &str) -> ChallengeResult {
    let mode_ok = query.mode.as_deref() == Some(SUBSCRIBE_MODE);
    let token_ok = query.verify_token.as_deref() == Some(verify_token);

    if mode_ok && token_ok {
        ChallengeResult::Verified(query.challenge.clone().unwrap_or_default())
    } else {
        ChallengeResult::Rejected
    }
}
