use std::{env, fmt};

use anyhow::bail;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub webhook: WebhookConfig,
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
}

/// Signing secrets accepted for inbound gateway webhooks. More than one is
/// live while a secret is being rotated.
#[derive(Clone)]
pub struct WebhookConfig {
    pub secrets: Vec<String>,
    pub tolerance_secs: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")?;

        let secrets = parse_secret_list(
            env::var("STRIPE_WEBHOOK_SECRETS")
                .or_else(|_| env::var("STRIPE_WEBHOOK_SECRET"))
                .unwrap_or_default()
                .as_str(),
        );
        if secrets.is_empty() {
            bail!("STRIPE_WEBHOOK_SECRETS or STRIPE_WEBHOOK_SECRET must be set");
        }
        let tolerance_secs = env::var("STRIPE_SIGNATURE_TOLERANCE_SECS")
            .ok()
            .and_then(|t| t.parse::<i64>().ok())
            .unwrap_or(300);

        let stripe_secret_key = env::var("STRIPE_SECRET_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let stripe_api_base = env::var("STRIPE_API_BASE")
            .unwrap_or_else(|_| "https://api.stripe.com".to_string());

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            webhook: WebhookConfig {
                secrets,
                tolerance_secs,
            },
            stripe_secret_key,
            stripe_api_base,
        })
    }
}

pub fn parse_secret_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("webhook", &self.webhook)
            .field("stripe_secret_key", &self.stripe_secret_key.as_ref().map(|_| "<redacted>"))
            .field("stripe_api_base", &self.stripe_api_base)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secrets", &format!("<{} redacted>", self.secrets.len()))
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}
