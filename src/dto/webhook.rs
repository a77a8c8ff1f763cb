use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Acknowledgement the gateway expects for every handled or skipped event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self { received: true }
    }
}
