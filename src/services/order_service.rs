use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, ActiveValue::NotSet, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    audit::{AuditAction, log_audit},
    collaborators::ConversationSeed,
    dto::orders::{OrderList, OrderWithItems},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        sea_orm_active_enums::OrderItemStatus,
    },
    error::{AppError, AppResult},
    gateway::{
        CheckoutSession, LineItem,
        line_items::{dedupe_by_product, line_items_from_metadata},
    },
    middleware::auth::AuthUser,
    models::{ORDER_STATUS_PAID, Order, OrderItem, ShippingAddress},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

/// One order item as handed to conversation seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReconciledItem {
    pub product_id: Uuid,
    pub seller_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct RecordedOrder {
    pub order: OrderModel,
    pub line_items: Vec<LineItem>,
    pub items: Vec<ReconciledItem>,
}

impl RecordedOrder {
    /// Purchased quantity across the line items that became order items.
    pub fn item_count(&self) -> u64 {
        self.line_items
            .iter()
            .filter(|line| self.items.iter().any(|item| item.product_id == line.id))
            .map(|line| u64::from(line.qty))
            .sum()
    }
}

/// Buyer from the client reference, falling back to session metadata.
pub fn resolve_buyer_id(session: &CheckoutSession) -> AppResult<Uuid> {
    let reference = session
        .buyer_reference()
        .ok_or(AppError::MissingBuyerIdentity)?;
    Uuid::parse_str(reference).map_err(|_| AppError::MissingBuyerIdentity)
}

pub fn build_order(session: &CheckoutSession, buyer_id: Uuid) -> AppResult<OrderActive> {
    let shipping_address = session
        .shipping_address()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(buyer_id),
        total_amount: Set(session.amount_major()),
        status: Set(ORDER_STATUS_PAID.to_string()),
        shipping_address: Set(shipping_address),
        payment_intent_id: Set(session.payment_intent_id().map(str::to_string)),
        created_at: NotSet,
    })
}

/// Create the order for a paid session, or resolve to the existing row when
/// the same transaction id was already recorded. Store failures propagate so
/// the gateway redelivers.
pub async fn materialize_order<C: ConnectionTrait>(
    db: &C,
    session: &CheckoutSession,
    buyer_id: Uuid,
) -> AppResult<OrderModel> {
    let active = build_order(session, buyer_id)?;

    let order = match session.payment_intent_id() {
        Some(payment_intent_id) => {
            let order = Orders::insert(active)
                .on_conflict(
                    OnConflict::column(OrderCol::PaymentIntentId)
                        .update_columns([OrderCol::TotalAmount, OrderCol::ShippingAddress])
                        .to_owned(),
                )
                .exec_with_returning(db)
                .await?;
            if order.user_id != buyer_id {
                tracing::warn!(
                    order_id = %order.id,
                    payment_intent_id,
                    "existing order belongs to a different buyer than the session"
                );
            }
            order
        }
        None => {
            tracing::warn!(
                session_id = %session.id,
                "checkout session has no transaction id; inserting order without idempotency key"
            );
            active.insert(db).await?
        }
    };

    tracing::info!(
        order_id = %order.id,
        buyer_id = %order.user_id,
        total = %order.total_amount,
        "order materialized"
    );
    Ok(order)
}

/// Populate order items exactly once. Failures are logged and yield an empty
/// list: the order row is already durable at this point.
pub async fn reconcile_order_items(
    state: &AppState,
    order: &OrderModel,
    line_items: &[LineItem],
) -> Vec<ReconciledItem> {
    match try_reconcile_order_items(state, order, line_items).await {
        Ok(items) => items,
        Err(err) => {
            tracing::error!(order_id = %order.id, error = %err, "order item reconciliation failed");
            Vec::new()
        }
    }
}

async fn try_reconcile_order_items(
    state: &AppState,
    order: &OrderModel,
    line_items: &[LineItem],
) -> AppResult<Vec<ReconciledItem>> {
    let existing = existing_items(state, order.id).await?;
    if !existing.is_empty() {
        tracing::debug!(order_id = %order.id, count = existing.len(), "order items already reconciled");
        return Ok(existing);
    }

    let line_items = dedupe_by_product(line_items.to_vec());
    if line_items.is_empty() {
        tracing::warn!(order_id = %order.id, "no line items to reconcile");
        return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = line_items.iter().map(|item| item.id).collect();
    let sellers = state.products.seller_ids(&product_ids).await?;

    let rows: Vec<OrderItemActive> = line_items
        .iter()
        .filter_map(|item| {
            let Some(seller_id) = sellers.get(&item.id) else {
                tracing::warn!(order_id = %order.id, product_id = %item.id, "line item product not found; skipped");
                return None;
            };
            let quantity = i32::try_from(item.qty).ok()?;
            Some(OrderItemActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                product_id: Set(item.id),
                seller_id: Set(*seller_id),
                variant_id: Set(item.variant_id),
                quantity: Set(quantity),
                price_at_purchase: Set(item.price),
                status: Set(OrderItemStatus::Pending),
                seller_received_at: Set(None),
                shipped_at: Set(None),
                delivered_at: Set(None),
                tracking_number: Set(None),
                shipping_carrier: Set(None),
                created_at: NotSet,
            })
        })
        .collect();

    if rows.is_empty() {
        tracing::warn!(order_id = %order.id, "no line item resolved to a seller");
        return Ok(Vec::new());
    }

    // A concurrent delivery may have inserted first; the unique key turns
    // that into a no-op and the re-read below picks up its rows.
    let inserted = OrderItems::insert_many(rows)
        .on_conflict(
            OnConflict::columns([OrderItemCol::OrderId, OrderItemCol::ProductId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(state.orm.as_ref())
        .await?;
    tracing::info!(order_id = %order.id, inserted, "order items inserted");

    existing_items(state, order.id).await
}

async fn existing_items(state: &AppState, order_id: Uuid) -> AppResult<Vec<ReconciledItem>> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .all(state.orm.as_ref())
        .await?
        .into_iter()
        .map(|item| ReconciledItem {
            product_id: item.product_id,
            seller_id: item.seller_id,
        })
        .collect();
    Ok(items)
}

/// Fire-and-log hand-off to conversation seeding.
pub async fn seed_conversations(state: &AppState, order: &OrderModel, items: &[ReconciledItem]) {
    if items.is_empty() {
        return;
    }
    let seeds: Vec<ConversationSeed> = items
        .iter()
        .map(|item| ConversationSeed {
            order_id: order.id,
            buyer_id: order.user_id,
            seller_id: item.seller_id,
            product_id: item.product_id,
        })
        .collect();

    if let Err(err) = state.conversations.ensure_conversations(&seeds).await {
        tracing::warn!(order_id = %order.id, error = %err, "conversation seeding failed");
    }
}

/// Shared tail of the webhook and checkout verification paths.
pub async fn record_paid_session(
    state: &AppState,
    session: &CheckoutSession,
    buyer_id: Uuid,
) -> AppResult<RecordedOrder> {
    let order = materialize_order(state.orm.as_ref(), session, buyer_id).await?;
    let line_items = line_items_from_metadata(&session.metadata);
    let items = reconcile_order_items(state, &order, &line_items).await;
    seed_conversations(state, &order, &items).await;

    if let Err(err) = log_audit(
        state.orm.as_ref(),
        Some(order.user_id),
        AuditAction::OrderRecorded,
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "payment_intent_id": order.payment_intent_id,
            "session_id": session.id,
            "items": items.len(),
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(RecordedOrder {
        order,
        line_items,
        items,
    })
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or_default() {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(state.orm.as_ref()).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(state.orm.as_ref())
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(state.orm.as_ref())
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(state.orm.as_ref())
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::ok(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
    ))
}

pub fn order_from_entity(model: OrderModel) -> Order {
    let shipping_address = model
        .shipping_address
        .and_then(|value| serde_json::from_value::<ShippingAddress>(value).ok());
    Order {
        id: model.id,
        user_id: model.user_id,
        total_amount: model.total_amount,
        status: model.status,
        shipping_address,
        payment_intent_id: model.payment_intent_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        seller_id: model.seller_id,
        variant_id: model.variant_id,
        quantity: model.quantity,
        price_at_purchase: model.price_at_purchase,
        status: model.status,
        seller_received_at: model.seller_received_at.map(|dt| dt.with_timezone(&Utc)),
        shipped_at: model.shipped_at.map(|dt| dt.with_timezone(&Utc)),
        delivered_at: model.delivered_at.map(|dt| dt.with_timezone(&Utc)),
        tracking_number: model.tracking_number,
        shipping_carrier: model.shipping_carrier,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
