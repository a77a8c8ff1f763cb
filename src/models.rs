use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::sea_orm_active_enums::{OrderItemStatus, ShippingCarrier};

pub const ORDER_STATUS_PAID: &str = "paid";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub status: String,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub price_at_purchase: Decimal,
    pub status: OrderItemStatus,
    pub seller_received_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub tracking_number: Option<String>,
    pub shipping_carrier: Option<ShippingCarrier>,
    pub created_at: DateTime<Utc>,
}

/// Address snapshot taken from the checkout session at payment time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: PostalAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PostalAddress {
    pub city: Option<String>,
    pub country: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub postal_code: Option<String>,
    pub state: Option<String>,
}
