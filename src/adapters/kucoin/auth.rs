//! KuCoin Authentication — HMAC-SHA256 Request Signing
//!
//! Signs every private REST request per the KuCoin API rules:
//! `KC-API-SIGN = base64(HMAC-SHA256(secret, timestamp + method + endpoint + body))`.
//! With API key version 2 the passphrase header is signed the same way.
//! Credentials come from environment variables
//! (KUCOIN_API_KEY, KUCOIN_API_SECRET, KUCOIN_API_PASSPHRASE).

use anyhow::{Context, Result};
use base64::Engine;
use chrono::Utc;

/// Headers attached to a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub key: String,
    pub timestamp: String,
    pub signature: String,
    pub passphrase: String,
    pub key_version: String,
}

/// KuCoin API credentials and signer.
///
/// The secret is only ever used as an HMAC key; it never leaves this struct.
pub struct KucoinAuth {
    api_key: String,
    api_secret: String,
    passphrase: String,
    /// 1 sends the passphrase in clear, 2 and later sign it.
    key_version: u8,
}

impl std::fmt::Debug for KucoinAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KucoinAuth")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("passphrase", &"<redacted>")
            .field("key_version", &self.key_version)
            .finish()
    }
}

impl KucoinAuth {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        passphrase: impl Into<String>,
        key_version: u8,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            passphrase: passphrase.into(),
            key_version,
        }
    }

    /// Load credentials from environment variables.
    ///
    /// Required env vars: KUCOIN_API_KEY, KUCOIN_API_SECRET, KUCOIN_API_PASSPHRASE.
    pub fn from_env(key_version: u8) -> Result<Self> {
        let api_key = std::env::var("KUCOIN_API_KEY").context("KUCOIN_API_KEY not set")?;
        let api_secret =
            std::env::var("KUCOIN_API_SECRET").context("KUCOIN_API_SECRET not set")?;
        let passphrase =
            std::env::var("KUCOIN_API_PASSPHRASE").context("KUCOIN_API_PASSPHRASE not set")?;

        anyhow::ensure!(!api_key.is_empty(), "KUCOIN_API_KEY is empty");
        anyhow::ensure!(!api_secret.is_empty(), "KUCOIN_API_SECRET is empty");

        Ok(Self::new(api_key, api_secret, passphrase, key_version))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub const fn key_version(&self) -> u8 {
        self.key_version
    }

    /// Current Unix time in milliseconds, as KuCoin expects it.
    pub fn timestamp() -> String {
        Utc::now().timestamp_millis().to_string()
    }

    fn hmac_base64(&self, message: &str) -> String {
        let mac = hmac_sha256::HMAC::mac(message.as_bytes(), self.api_secret.as_bytes());
        base64::engine::general_purpose::STANDARD.encode(mac)
    }

    /// Signature over `timestamp + method + endpoint + body`.
    ///
    /// `endpoint` includes the query string, if any.
    pub fn sign(&self, timestamp: &str, method: &str, endpoint: &str, body: &str) -> String {
        self.hmac_base64(&format!("{timestamp}{method}{endpoint}{body}"))
    }

    /// Value of the KC-API-PASSPHRASE header.
    pub fn passphrase_header(&self) -> String {
        if self.key_version >= 2 {
            self.hmac_base64(&self.passphrase)
        } else {
            self.passphrase.clone()
        }
    }

    /// Build every authentication header for one request.
    pub fn auth_headers(&self, method: &str, endpoint: &str, body: &str) -> AuthHeaders {
        let timestamp = Self::timestamp();
        let signature = self.sign(&timestamp, method, endpoint, body);
        AuthHeaders {
            key: self.api_key.clone(),
            timestamp,
            signature,
            passphrase: self.passphrase_header(),
            key_version: self.key_version.to_string(),
        }
    }
}
