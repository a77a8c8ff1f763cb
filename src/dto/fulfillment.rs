use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::{OrderItemStatus, ShippingCarrier},
    error::{AppError, AppResult},
    services::transitions::Shipment,
};

pub const MAX_TRACKING_NUMBER_LEN: usize = 100;
pub const MAX_CANCEL_REASON_LEN: usize = 500;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderItemStatusRequest {
    pub order_item_id: String,
    pub new_status: String,
    pub tracking_number: Option<String>,
    pub shipping_carrier: Option<String>,
}

/// Validated seller status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerStatusUpdate {
    pub order_item_id: Uuid,
    pub new_status: OrderItemStatus,
    pub shipment: Shipment,
}

impl UpdateOrderItemStatusRequest {
    pub fn validate(self) -> AppResult<SellerStatusUpdate> {
        let order_item_id = parse_order_item_id(&self.order_item_id)?;
        let new_status = self
            .new_status
            .parse::<OrderItemStatus>()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        let tracking_number = self
            .tracking_number
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if tracking_number
            .as_ref()
            .is_some_and(|t| t.chars().count() > MAX_TRACKING_NUMBER_LEN)
        {
            return Err(AppError::InvalidInput(format!(
                "tracking number must be at most {MAX_TRACKING_NUMBER_LEN} characters"
            )));
        }

        let carrier = match self.shipping_carrier.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<ShippingCarrier>()
                    .map_err(|e| AppError::InvalidInput(e.to_string()))?,
            ),
        };

        Ok(SellerStatusUpdate {
            order_item_id,
            new_status,
            shipment: Shipment {
                tracking_number,
                carrier,
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ConfirmDeliveryRequest {
    pub order_item_id: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CancelOrderItemRequest {
    pub order_item_id: String,
    pub reason: Option<String>,
}

impl CancelOrderItemRequest {
    pub fn reason(&self) -> AppResult<Option<String>> {
        let reason = self
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        match reason {
            Some(r) if r.chars().count() > MAX_CANCEL_REASON_LEN => Err(AppError::InvalidInput(
                format!("reason must be at most {MAX_CANCEL_REASON_LEN} characters"),
            )),
            other => Ok(other.map(str::to_string)),
        }
    }
}

/// Returned to the buyer so the caller can notify the seller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BuyerActionResult {
    pub order_item_id: Uuid,
    pub seller_id: Uuid,
    pub status: OrderItemStatus,
}

pub fn parse_order_item_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::InvalidInput("order_item_id must be a UUID".into()))
}
