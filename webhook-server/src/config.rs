//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup into an immutable [`Config`] that the
//! web layer shares through an `Arc`.

use std::env;
use std::fmt;

use tracing::warn;

/// Verify token used when `VERIFY_TOKEN` is not set.
pub const DEFAULT_VERIFY_TOKEN: &str = "mi_verify_token_super_seguro";

/// Port used when `PORT` is not set or cannot be parsed.
pub const DEFAULT_PORT: u16 = 3000;

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Token the platform must echo during the subscription handshake
    pub verify_token: String,

    /// App secret used as the HMAC key for `x-hub-signature-256`.
    /// Empty disables signature verification.
    pub app_secret: String,

    /// Port for the web server to listen on
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            verify_token: lookup("VERIFY_TOKEN")
                .unwrap_or_else(|| DEFAULT_VERIFY_TOKEN.to_string()),

            app_secret: lookup("APP_SECRET").unwrap_or_default(),

            port: parse_port(lookup("PORT")),
        }
    }

    /// Whether inbound POST bodies must carry a valid signature.
    pub fn signature_verification_enabled(&self) -> bool {
        !self.app_secret.is_empty()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("verify_token", &"<redacted>")
            .field("app_secret_set", &self.signature_verification_enabled())
            .field("port", &self.port)
            .finish()
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    let Some(raw) = raw else {
        return DEFAULT_PORT;
    };

    match raw.trim().parse::<u16>() {
        Ok(port) => port,
        Err(_) => {
            warn!(env_var = "PORT", value = %raw, "Invalid port, using default");
            DEFAULT_PORT
        }
    }
}
