use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Func, SimpleExpr},
};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, log_audit},
    collaborators::{CACHE_TAG_CONVERSATIONS, CACHE_TAG_MESSAGES, CACHE_TAG_ORDERS},
    dto::{
        fulfillment::{
            BuyerActionResult, CancelOrderItemRequest, ConfirmDeliveryRequest,
            UpdateOrderItemStatusRequest, parse_order_item_id,
        },
        orders::OrderItemList,
    },
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel},
        orders::Entity as Orders,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::OrderItem,
    response::{ApiResponse, Meta},
    routes::params::{OrderItemListQuery, SortOrder},
    services::{
        order_service::order_item_from_entity,
        transitions::{StampedAt, Transition, TransitionPlan, TransitionRejected, plan_transition},
    },
    state::AppState,
};

const INVALIDATED_TAGS: [&str; 3] = [CACHE_TAG_ORDERS, CACHE_TAG_MESSAGES, CACHE_TAG_CONVERSATIONS];

/// Seller moves one of their own items to any status.
///
/// Items owned by someone else are reported as `NotFound` so their existence
/// is not leaked.
pub async fn update_order_item_status(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateOrderItemStatusRequest,
) -> AppResult<ApiResponse<OrderItem>> {
    let update = payload.validate()?;

    let current = OrderItems::find()
        .filter(
            Condition::all()
                .add(OrderItemCol::Id.eq(update.order_item_id))
                .add(OrderItemCol::SellerId.eq(user.user_id)),
        )
        .one(state.orm.as_ref())
        .await
        .map_err(lookup_failed)?
        .ok_or(AppError::NotFound)?;

    let plan = plan_transition(
        current.status,
        Transition::Seller {
            to: update.new_status,
            shipment: update.shipment,
        },
        state.seller_guard.as_ref(),
    )
    .map_err(rejected)?;

    let scope = Condition::all()
        .add(OrderItemCol::Id.eq(current.id))
        .add(OrderItemCol::SellerId.eq(user.user_id));
    let item = apply_plan(state, &plan, scope)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(
        order_item_id = %item.id,
        seller_id = %user.user_id,
        from = %plan.from,
        to = %plan.to,
        "order item status updated by seller"
    );
    after_change(
        state,
        user,
        AuditAction::OrderItemStatusUpdated,
        serde_json::json!({
            "order_item_id": item.id,
            "from": plan.from,
            "to": plan.to,
            "tracking_number": item.tracking_number,
            "shipping_carrier": item.shipping_carrier,
        }),
    )
    .await;

    Ok(ApiResponse::ok(
        "Order item updated",
        order_item_from_entity(item),
    ))
}

/// Buyer confirms a shipped item arrived. Only `shipped -> delivered` is allowed.
pub async fn buyer_confirm_delivery(
    state: &AppState,
    user: &AuthUser,
    payload: ConfirmDeliveryRequest,
) -> AppResult<ApiResponse<BuyerActionResult>> {
    let order_item_id = parse_order_item_id(&payload.order_item_id)?;
    let item = buyer_transition(state, user, order_item_id, Transition::BuyerConfirmDelivery).await?;

    after_change(
        state,
        user,
        AuditAction::DeliveryConfirmed,
        serde_json::json!({ "order_item_id": item.id, "seller_id": item.seller_id }),
    )
    .await;

    Ok(ApiResponse::ok(
        "Delivery confirmed",
        BuyerActionResult {
            order_item_id: item.id,
            seller_id: item.seller_id,
            status: item.status,
        },
    ))
}

/// Buyer cancels an item the seller has not shipped yet.
pub async fn buyer_cancel_order_item(
    state: &AppState,
    user: &AuthUser,
    payload: CancelOrderItemRequest,
) -> AppResult<ApiResponse<BuyerActionResult>> {
    let order_item_id = parse_order_item_id(&payload.order_item_id)?;
    let reason = payload.reason()?;
    let item = buyer_transition(state, user, order_item_id, Transition::BuyerCancel).await?;

    after_change(
        state,
        user,
        AuditAction::OrderItemCancelled,
        serde_json::json!({
            "order_item_id": item.id,
            "seller_id": item.seller_id,
            "reason": reason,
        }),
    )
    .await;

    Ok(ApiResponse::ok(
        "Order item cancelled",
        BuyerActionResult {
            order_item_id: item.id,
            seller_id: item.seller_id,
            status: item.status,
        },
    ))
}

pub async fn list_seller_order_items(
    state: &AppState,
    user: &AuthUser,
    query: OrderItemListQuery,
) -> AppResult<ApiResponse<OrderItemList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderItemCol::SellerId.eq(user.user_id));
    if let Some(status) = query.status_filter()? {
        condition = condition.add(OrderItemCol::Status.eq(status));
    }

    let mut finder = OrderItems::find().filter(condition);
    finder = match query.sort_order.unwrap_or_default() {
        SortOrder::Asc => finder.order_by_asc(OrderItemCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderItemCol::CreatedAt),
    };

    let total = finder.clone().count(state.orm.as_ref()).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(state.orm.as_ref())
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        OrderItemList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Buyer-side transition: ownership through the parent order, then a
/// compare-and-set on the status the plan was made against.
async fn buyer_transition(
    state: &AppState,
    user: &AuthUser,
    order_item_id: Uuid,
    transition: Transition,
) -> AppResult<OrderItemModel> {
    let current = OrderItems::find_by_id(order_item_id)
        .one(state.orm.as_ref())
        .await
        .map_err(lookup_failed)?
        .ok_or(AppError::NotFound)?;

    let order = Orders::find_by_id(current.order_id)
        .one(state.orm.as_ref())
        .await
        .map_err(lookup_failed)?
        .ok_or(AppError::NotFound)?;
    if order.user_id != user.user_id {
        return Err(AppError::NotAuthorized);
    }

    let plan = plan_transition(current.status, transition.clone(), state.seller_guard.as_ref())
        .map_err(rejected)?;

    let scope = Condition::all()
        .add(OrderItemCol::Id.eq(current.id))
        .add(OrderItemCol::OrderId.eq(order.id))
        .add(OrderItemCol::Status.eq(plan.from));

    match apply_plan(state, &plan, scope).await? {
        Some(item) => {
            tracing::info!(
                order_item_id = %item.id,
                buyer_id = %user.user_id,
                from = %plan.from,
                to = %plan.to,
                "order item status updated by buyer"
            );
            Ok(item)
        }
        None => {
            // Lost the race: re-plan against whatever status won.
            let latest = OrderItems::find_by_id(current.id)
                .one(state.orm.as_ref())
                .await
                .map_err(lookup_failed)?
                .ok_or(AppError::NotFound)?;
            plan_transition(latest.status, transition, state.seller_guard.as_ref())
                .map_err(rejected)?;
            Err(AppError::InvalidStatus(format!(
                "Order item status changed to {} concurrently",
                latest.status
            )))
        }
    }
}

/// Single row-scoped UPDATE. Entry timestamps are only filled when empty.
async fn apply_plan(
    state: &AppState,
    plan: &TransitionPlan,
    scope: Condition,
) -> AppResult<Option<OrderItemModel>> {
    let now: DateTimeWithTimeZone = Utc::now().fixed_offset();

    let mut update = OrderItems::update_many()
        .col_expr(OrderItemCol::Status, Expr::value(plan.to.as_str()))
        .filter(scope);

    if let Some(stamp) = plan.stamp {
        let column = match stamp {
            StampedAt::SellerReceived => OrderItemCol::SellerReceivedAt,
            StampedAt::Shipped => OrderItemCol::ShippedAt,
            StampedAt::Delivered => OrderItemCol::DeliveredAt,
        };
        update = update.col_expr(column, stamp_once(column, now));
    }

    if let Some(shipment) = &plan.shipment {
        if let Some(tracking_number) = &shipment.tracking_number {
            update = update.col_expr(
                OrderItemCol::TrackingNumber,
                Expr::value(tracking_number.clone()),
            );
        }
        if let Some(carrier) = shipment.carrier {
            update = update.col_expr(OrderItemCol::ShippingCarrier, Expr::value(carrier.as_str()));
        }
    }

    let mut rows = update
        .exec_with_returning(state.orm.as_ref())
        .await
        .map_err(AppError::UpdateFailed)?;
    Ok(rows.pop())
}

fn stamp_once(column: OrderItemCol, now: DateTimeWithTimeZone) -> SimpleExpr {
    Func::coalesce([Expr::col(column).into(), Expr::value(now)]).into()
}

// Seller and buyer actions report store trouble as `unexpected`, never as a
// store code.
fn lookup_failed(err: DbErr) -> AppError {
    AppError::Internal(anyhow::Error::new(err).context("order item lookup failed"))
}

fn rejected(err: TransitionRejected) -> AppError {
    AppError::InvalidStatus(err.to_string())
}

async fn after_change(
    state: &AppState,
    user: &AuthUser,
    action: AuditAction,
    metadata: serde_json::Value,
) {
    state.cache.invalidate(&INVALIDATED_TAGS).await;

    if let Err(err) = log_audit(
        state.orm.as_ref(),
        Some(user.user_id),
        action,
        Some("order_items"),
        Some(metadata),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
}

