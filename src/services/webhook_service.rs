use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    gateway::{Route, SkipReason, classify_session},
    services::order_service::{record_paid_session, resolve_buyer_id},
    state::AppState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Recorded { order_id: Uuid, items: usize },
    Skipped(SkipReason),
}

/// Verify, classify and, for paid checkout sessions, record the order.
///
/// Nothing touches the store until the signature has been verified. Errors
/// that map to a 5xx ask the gateway to redeliver; 4xx errors are final.
pub async fn handle_webhook(
    state: &AppState,
    payload: &[u8],
    signature: Option<&str>,
) -> AppResult<WebhookOutcome> {
    let event = state.verifier.verify(payload, signature)?;
    tracing::debug!(event_id = %event.id, event_type = %event.event_type, "webhook verified");

    if !event.is_checkout_event() {
        tracing::debug!(event_type = %event.event_type, "event not owned by the order pipeline");
        return Ok(WebhookOutcome::Skipped(SkipReason::UnhandledEvent));
    }

    let session = event.checkout_session().map_err(|e| {
        AppError::InvalidInput(format!("checkout session payload not understood: {e}"))
    })?;

    if let Route::Skip(reason) = classify_session(&session) {
        tracing::info!(
            event_id = %event.id,
            session_id = %session.id,
            reason = reason.as_str(),
            "checkout session skipped"
        );
        return Ok(WebhookOutcome::Skipped(reason));
    }

    let buyer_id = resolve_buyer_id(&session).inspect_err(|_| {
        tracing::error!(
            event_id = %event.id,
            session_id = %session.id,
            "paid checkout session has no usable buyer identity"
        );
    })?;

    let recorded = record_paid_session(state, &session, buyer_id).await?;

    tracing::info!(
        event_id = %event.id,
        order_id = %recorded.order.id,
        items = recorded.items.len(),
        "checkout session recorded"
    );
    Ok(WebhookOutcome::Recorded {
        order_id: recorded.order.id,
        items: recorded.items.len(),
    })
}
