use std::{fmt, str::FromStr};

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Fulfillment status of a single order item.
///
/// `pending -> received -> processing -> shipped -> delivered`, with
/// `cancelled` reachable from any non-terminal state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OrderItemStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "received")]
    Received,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderItemStatus::Pending => "pending",
            OrderItemStatus::Received => "received",
            OrderItemStatus::Processing => "processing",
            OrderItemStatus::Shipped => "shipped",
            OrderItemStatus::Delivered => "delivered",
            OrderItemStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderItemStatus::Delivered | OrderItemStatus::Cancelled)
    }
}

impl fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderItemStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(OrderItemStatus::Pending),
            "received" => Ok(OrderItemStatus::Received),
            "processing" => Ok(OrderItemStatus::Processing),
            "shipped" => Ok(OrderItemStatus::Shipped),
            "delivered" => Ok(OrderItemStatus::Delivered),
            "cancelled" => Ok(OrderItemStatus::Cancelled),
            other => Err(UnknownVariant {
                kind: "order item status",
                value: other.to_string(),
            }),
        }
    }
}

/// Carriers a seller may attach to a shipment.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ShippingCarrier {
    #[sea_orm(string_value = "speedy")]
    Speedy,
    #[sea_orm(string_value = "econt")]
    Econt,
    #[sea_orm(string_value = "bulgarian_posts")]
    BulgarianPosts,
    #[sea_orm(string_value = "royal_mail")]
    RoyalMail,
    #[sea_orm(string_value = "parcelforce")]
    Parcelforce,
    #[sea_orm(string_value = "dhl")]
    Dhl,
    #[sea_orm(string_value = "dpd")]
    Dpd,
    #[sea_orm(string_value = "gls")]
    Gls,
    #[sea_orm(string_value = "ups")]
    Ups,
    #[sea_orm(string_value = "usps")]
    Usps,
    #[sea_orm(string_value = "fedex")]
    Fedex,
    #[sea_orm(string_value = "ems")]
    Ems,
    #[sea_orm(string_value = "other")]
    Other,
}

impl ShippingCarrier {
    pub const ALL: [ShippingCarrier; 13] = [
        ShippingCarrier::Speedy,
        ShippingCarrier::Econt,
        ShippingCarrier::BulgarianPosts,
        ShippingCarrier::RoyalMail,
        ShippingCarrier::Parcelforce,
        ShippingCarrier::Dhl,
        ShippingCarrier::Dpd,
        ShippingCarrier::Gls,
        ShippingCarrier::Ups,
        ShippingCarrier::Usps,
        ShippingCarrier::Fedex,
        ShippingCarrier::Ems,
        ShippingCarrier::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingCarrier::Speedy => "speedy",
            ShippingCarrier::Econt => "econt",
            ShippingCarrier::BulgarianPosts => "bulgarian_posts",
            ShippingCarrier::RoyalMail => "royal_mail",
            ShippingCarrier::Parcelforce => "parcelforce",
            ShippingCarrier::Dhl => "dhl",
            ShippingCarrier::Dpd => "dpd",
            ShippingCarrier::Gls => "gls",
            ShippingCarrier::Ups => "ups",
            ShippingCarrier::Usps => "usps",
            ShippingCarrier::Fedex => "fedex",
            ShippingCarrier::Ems => "ems",
            ShippingCarrier::Other => "other",
        }
    }
}

impl FromStr for ShippingCarrier {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ShippingCarrier::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or(UnknownVariant {
                kind: "shipping carrier",
                value: s.to_string(),
            })
    }
}
