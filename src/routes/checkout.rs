use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::checkout::{CheckoutVerification, VerifyCheckoutRequest},
    error::AppResult,
    middleware::{auth::AuthUser, json::AppJson},
    response::ApiResponse,
    services::checkout_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/verify", post(verify_checkout))
}

#[utoipa::path(
    post,
    path = "/api/checkout/verify",
    request_body = VerifyCheckoutRequest,
    responses(
        (status = 200, description = "Order recorded or already present", body = ApiResponse<CheckoutVerification>),
        (status = 400, description = "Invalid session"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Session belongs to another buyer"),
        (status = 409, description = "Payment not completed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn verify_checkout(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<VerifyCheckoutRequest>,
) -> AppResult<Json<ApiResponse<CheckoutVerification>>> {
    let resp = checkout_service::verify_checkout_session(&state, &user, payload).await?;
    Ok(Json(resp))
}
