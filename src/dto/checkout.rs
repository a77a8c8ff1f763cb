use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const SESSION_ID_PREFIX: &str = "cs_";

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyCheckoutRequest {
    pub session_id: String,
}

impl VerifyCheckoutRequest {
    pub fn session_id(&self) -> AppResult<&str> {
        let id = self.session_id.trim();
        let well_formed = id.len() > SESSION_ID_PREFIX.len()
            && id.starts_with(SESSION_ID_PREFIX)
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !well_formed {
            return Err(AppError::InvalidInput("Invalid checkout session".into()));
        }
        Ok(id)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutVerification {
    pub order_id: Uuid,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub item_count: u64,
    pub is_existing: bool,
}
