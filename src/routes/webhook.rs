use axum::{Json, Router, body::Bytes, extract::State, http::HeaderMap, routing::post};

use crate::{
    dto::webhook::WebhookAck,
    error::AppResult,
    gateway::signature::SIGNATURE_HEADER,
    services::webhook_service::{self, WebhookOutcome},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/stripe", post(stripe_webhook))
}

#[utoipa::path(
    post,
    path = "/api/webhooks/stripe",
    params(
        ("stripe-signature" = String, Header, description = "Gateway signature header")
    ),
    request_body(content = String, description = "Raw event payload", content_type = "application/json"),
    responses(
        (status = 200, description = "Event handled or skipped", body = WebhookAck),
        (status = 400, description = "Invalid signature or payload"),
        (status = 500, description = "Store unavailable, event will be redelivered"),
    ),
    tag = "Webhooks"
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match webhook_service::handle_webhook(&state, &body, signature).await? {
        WebhookOutcome::Recorded { order_id, items } => {
            tracing::debug!(%order_id, items, "webhook acknowledged");
        }
        WebhookOutcome::Skipped(reason) => {
            tracing::debug!(reason = reason.as_str(), "webhook acknowledged without action");
        }
    }
    Ok(Json(WebhookAck::received()))
}
