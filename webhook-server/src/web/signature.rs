//! Meta webhook signature verification.
//!
//! Meta signs every POST delivery with HMAC-SHA256 keyed by the app secret
//! and sends the result in the `X-Hub-Signature-256` header as
//! `sha256=<lowercase hex>`. The digest covers the raw request bytes, so
//! verification must run on the body exactly as received, before any JSON
//! parsing.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Prefix every signature header value must start with.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Why a signature was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature header is missing")]
    Missing,

    #[error("signature header does not start with `sha256=`")]
    BadPrefix,

    #[error("signature does not match payload (expected {expected_length} bytes, got {actual_length})")]
    Mismatch {
        expected_length: usize,
        actual_length: usize,
    },
}

/// Verify the signature header of a webhook delivery.
///
/// # Arguments
///
/// * `raw_body` - The request body bytes exactly as received
/// * `signature_header` - The `x-hub-signature-256` header value, if any
/// * `app_secret` - The app secret configured for the Meta app
///
/// # Returns
///
/// `true` only if the header equals `sha256=` followed by the lowercase hex
/// HMAC-SHA256 of `raw_body`. Every malformed input yields `false`.
pub fn is_valid_signature(raw_body: &[u8], signature_header: Option<&str>, app_secret: &str) -> bool {
    check_signature(raw_body, signature_header, app_secret).is_ok()
}

/// Same check as [`is_valid_signature`], keeping the reason for a refusal.
pub fn check_signature(
    raw_body: &[u8],
    signature_header: Option<&str>,
    app_secret: &str,
) -> Result<(), SignatureError> {
    let header = signature_header.ok_or(SignatureError::Missing)?;

    if !header.starts_with(SIGNATURE_PREFIX) {
        return Err(SignatureError::BadPrefix);
    }

    let expected = signature_header_for(raw_body, app_secret);

    if constant_time_eq(header.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch {
            expected_length: expected.len(),
            actual_length: header.len(),
        })
    }
}

/// Compute the `sha256=<hex>` header value Meta would send for `raw_body`.
pub fn signature_header_for(raw_body: &[u8], app_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(raw_body);

    format!(
        "{}{}",
        SIGNATURE_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    )
}

/// Constant-time byte comparison.
///
/// Inputs of different length are rejected up front; otherwise every byte
/// pair is visited regardless of where the first difference is.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
