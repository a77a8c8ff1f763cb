use sea_orm::{ActiveValue::NotSet, ConnectionTrait, EntityTrait, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    entity::audit_logs::{ActiveModel as AuditActive, Entity as AuditLogs},
    error::AppResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    OrderRecorded,
    OrderItemStatusUpdated,
    DeliveryConfirmed,
    OrderItemCancelled,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::OrderRecorded => "order_recorded",
            AuditAction::OrderItemStatusUpdated => "order_item_status_update",
            AuditAction::DeliveryConfirmed => "delivery_confirmed",
            AuditAction::OrderItemCancelled => "order_item_cancelled",
        }
    }
}

pub async fn log_audit<C: ConnectionTrait>(
    db: &C,
    user_id: Option<Uuid>,
    action: AuditAction,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    let entry = AuditActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        action: Set(action.as_str().to_string()),
        resource: Set(resource.map(str::to_string)),
        metadata: Set(metadata),
        created_at: NotSet,
    };
    AuditLogs::insert(entry).exec_without_returning(db).await?;

    Ok(())
}
