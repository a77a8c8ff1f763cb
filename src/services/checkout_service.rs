use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    dto::checkout::{CheckoutVerification, VerifyCheckoutRequest},
    entity::orders::{Column as OrderCol, Entity as Orders},
    error::{AppError, AppResult},
    gateway::{
        Route, SkipReason, classify_session,
        event::PaymentStatus,
        line_items::{line_items_from_metadata, total_quantity},
    },
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::order_service::{record_paid_session, resolve_buyer_id},
    state::AppState,
};

/// Success-page verification: records the order from the buyer's side in
/// case the webhook has not arrived yet. Converges with the webhook on the
/// same order row through the transaction id.
pub async fn verify_checkout_session(
    state: &AppState,
    user: &AuthUser,
    payload: VerifyCheckoutRequest,
) -> AppResult<ApiResponse<CheckoutVerification>> {
    let session_id = payload.session_id()?;
    let source = state.sessions.as_ref().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("checkout verification is not configured"))
    })?;

    let session = source.retrieve(session_id).await?;

    let buyer_id = resolve_buyer_id(&session).map_err(|_| AppError::NotAuthorized)?;
    if buyer_id != user.user_id {
        tracing::warn!(session_id, actor = %user.user_id, "checkout session belongs to another buyer");
        return Err(AppError::NotAuthorized);
    }

    // Unsettled payments fall through to the status check below.
    match classify_session(&session) {
        Route::Order | Route::Skip(SkipReason::PaymentNotSettled) => {}
        Route::Skip(reason) => {
            return Err(AppError::InvalidInput(format!(
                "checkout session is not an order ({})",
                reason.as_str()
            )));
        }
    }
    if session.payment_status != Some(PaymentStatus::Paid) {
        return Err(AppError::InvalidStatus("Payment not completed".into()));
    }

    let payment_intent_id = session
        .payment_intent_id()
        .ok_or_else(|| AppError::InvalidInput("Missing payment intent".into()))?;

    let total_amount = session.amount_major();
    let line_items = line_items_from_metadata(&session.metadata);

    let existing = Orders::find()
        .filter(OrderCol::PaymentIntentId.eq(payment_intent_id))
        .order_by_desc(OrderCol::CreatedAt)
        .one(state.orm.as_ref())
        .await?;
    if let Some(order) = existing {
        if order.user_id != user.user_id {
            return Err(AppError::NotAuthorized);
        }
        return Ok(ApiResponse::ok(
            "Order already recorded",
            CheckoutVerification {
                order_id: order.id,
                total_amount,
                item_count: total_quantity(&line_items),
                is_existing: true,
            },
        ));
    }

    if line_items.is_empty() {
        return Err(AppError::InvalidInput(
            "Checkout session items are missing".into(),
        ));
    }

    let recorded = record_paid_session(state, &session, buyer_id).await?;

    Ok(ApiResponse::ok(
        "Order recorded",
        CheckoutVerification {
            order_id: recorded.order.id,
            total_amount,
            item_count: recorded.item_count(),
            is_existing: false,
        },
    ))
}
