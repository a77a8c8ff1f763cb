//! Webhook signature verification.
//!
//! The gateway signs `"{timestamp}.{raw body}"` with HMAC-SHA256 and sends
//! `t=<unix>,v1=<hex>` in the signature header. During secret rotation more
//! than one secret is live, so every configured secret is tried in turn.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::{config::WebhookConfig, gateway::event::WebhookEvent};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("missing signature header")]
    MissingHeader,
    #[error("malformed signature header")]
    MalformedHeader,
    #[error("signature timestamp outside tolerance")]
    StaleTimestamp,
    #[error("no signing secret matched")]
    NoMatchingSecret,
    #[error("payload is not a valid event")]
    InvalidPayload(#[source] serde_json::Error),
}

#[derive(Clone)]
pub struct SignatureVerifier {
    secrets: Vec<String>,
    tolerance_secs: i64,
}

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

impl SignatureVerifier {
    pub fn new(secrets: Vec<String>, tolerance_secs: i64) -> Self {
        Self {
            secrets,
            tolerance_secs,
        }
    }

    pub fn from_config(config: &WebhookConfig) -> Self {
        Self::new(config.secrets.clone(), config.tolerance_secs)
    }

    pub fn verify(
        &self,
        payload: &[u8],
        header: Option<&str>,
    ) -> Result<WebhookEvent, SignatureError> {
        self.verify_at(payload, header, Utc::now().timestamp())
    }

    /// Verify against an explicit clock, returning the parsed event.
    pub fn verify_at(
        &self,
        payload: &[u8],
        header: Option<&str>,
        now: i64,
    ) -> Result<WebhookEvent, SignatureError> {
        let header = header
            .filter(|h| !h.trim().is_empty())
            .ok_or(SignatureError::MissingHeader)?;
        let parsed = parse_header(header)?;

        if (now - parsed.timestamp).abs() > self.tolerance_secs {
            tracing::warn!(
                timestamp = parsed.timestamp,
                now,
                "webhook signature timestamp outside tolerance"
            );
            return Err(SignatureError::StaleTimestamp);
        }

        let matched = self.secrets.iter().enumerate().find(|(_, secret)| {
            parsed
                .signatures
                .iter()
                .any(|candidate| signature_matches(secret, parsed.timestamp, payload, candidate))
        });

        let Some((secret_index, _)) = matched else {
            tracing::warn!(
                secrets = self.secrets.len(),
                "webhook signature did not match any live secret"
            );
            return Err(SignatureError::NoMatchingSecret);
        };
        tracing::trace!(secret_index, "webhook signature verified");

        serde_json::from_slice(payload).map_err(SignatureError::InvalidPayload)
    }
}

fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(SignatureHeader {
            timestamp,
            signatures,
        }),
        _ => Err(SignatureError::MalformedHeader),
    }
}

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Some(mac)
}

fn signature_matches(secret: &str, timestamp: i64, payload: &[u8], candidate: &[u8]) -> bool {
    mac_for(secret, timestamp, payload).is_some_and(|mac| mac.verify_slice(candidate).is_ok())
}

/// Hex signature the gateway would send for `payload` at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    mac_for(secret, timestamp, payload)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default()
}

/// Full header value (`t=...,v1=...`) for `payload`.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!(
        "t={timestamp},v1={}",
        compute_signature(secret, timestamp, payload)
    )
}
