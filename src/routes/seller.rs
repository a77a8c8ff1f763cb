use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::{fulfillment::UpdateOrderItemStatusRequest, orders::OrderItemList},
    error::AppResult,
    middleware::{auth::AuthUser, json::AppJson},
    models::OrderItem,
    response::ApiResponse,
    routes::params::OrderItemListQuery,
    services::fulfillment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/order-items", get(list_order_items))
        .route("/order-items/status", post(update_order_item_status))
}

#[utoipa::path(
    get,
    path = "/api/seller/order-items",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by item status"),
        ("sort_order" = Option<String>, Query, description = "asc or desc by created_at, default desc")
    ),
    responses(
        (status = 200, description = "Order items sold by the current seller", body = ApiResponse<OrderItemList>),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn list_order_items(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderItemListQuery>,
) -> AppResult<Json<ApiResponse<OrderItemList>>> {
    let resp = fulfillment_service::list_seller_order_items(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/seller/order-items/status",
    request_body = UpdateOrderItemStatusRequest,
    responses(
        (status = 200, description = "Order item updated", body = ApiResponse<OrderItem>),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Update failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn update_order_item_status(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<UpdateOrderItemStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp = fulfillment_service::update_order_item_status(&state, &user, payload).await?;
    Ok(Json(resp))
}
