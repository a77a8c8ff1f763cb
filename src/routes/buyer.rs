use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::fulfillment::{BuyerActionResult, CancelOrderItemRequest, ConfirmDeliveryRequest},
    error::AppResult,
    middleware::{auth::AuthUser, json::AppJson},
    response::ApiResponse,
    services::fulfillment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/order-items/confirm-delivery", post(confirm_delivery))
        .route("/order-items/cancel", post(cancel_order_item))
}

#[utoipa::path(
    post,
    path = "/api/buyer/order-items/confirm-delivery",
    request_body = ConfirmDeliveryRequest,
    responses(
        (status = 200, description = "Item marked delivered", body = ApiResponse<BuyerActionResult>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Item belongs to another buyer"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Item is not shipped"),
    ),
    security(("bearer_auth" = [])),
    tag = "Buyer"
)]
pub async fn confirm_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ConfirmDeliveryRequest>,
) -> AppResult<Json<ApiResponse<BuyerActionResult>>> {
    let resp = fulfillment_service::buyer_confirm_delivery(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/buyer/order-items/cancel",
    request_body = CancelOrderItemRequest,
    responses(
        (status = 200, description = "Item cancelled", body = ApiResponse<BuyerActionResult>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Item belongs to another buyer"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Item already shipped, delivered or cancelled"),
    ),
    security(("bearer_auth" = [])),
    tag = "Buyer"
)]
pub async fn cancel_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CancelOrderItemRequest>,
) -> AppResult<Json<ApiResponse<BuyerActionResult>>> {
    let resp = fulfillment_service::buyer_cancel_order_item(&state, &user, payload).await?;
    Ok(Json(resp))
}
