use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use crate::{collaborators::CheckoutSessionSource, gateway::event::CheckoutSession};

/// Reads checkout sessions from the gateway's REST API.
#[derive(Clone)]
pub struct StripeSessionClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeSessionClient {
    pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build gateway http client")?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }
}

#[async_trait]
impl CheckoutSessionSource for StripeSessionClient {
    async fn retrieve(&self, session_id: &str) -> anyhow::Result<CheckoutSession> {
        let url = format!("{}/v1/checkout/sessions/{}", self.api_base, session_id);
        let session = self
            .http
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .context("checkout session request failed")?
            .error_for_status()
            .context("gateway rejected checkout session request")?
            .json::<CheckoutSession>()
            .await
            .context("checkout session response was not understood")?;
        Ok(session)
    }
}
