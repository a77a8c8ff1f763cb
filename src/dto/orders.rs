use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemList {
    pub items: Vec<OrderItem>,
}
