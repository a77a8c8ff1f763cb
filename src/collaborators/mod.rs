//! Services the order core depends on but does not own.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::gateway::event::CheckoutSession;

pub mod cache;
pub mod conversations;
pub mod products;

pub use cache::{CACHE_TAG_CONVERSATIONS, CACHE_TAG_MESSAGES, CACHE_TAG_ORDERS, LogCacheInvalidator};
pub use conversations::PgConversationSeeder;
pub use products::PgProductDirectory;

/// Batch product -> seller resolution. Unknown products are simply absent
/// from the returned map.
#[async_trait]
pub trait ProductDirectory: Send + Sync {
    async fn seller_ids(&self, product_ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, Uuid>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConversationSeed {
    pub order_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub product_id: Uuid,
}

/// Makes sure a buyer/seller thread exists for every seed. Must be idempotent.
#[async_trait]
pub trait ConversationSeeder: Send + Sync {
    async fn ensure_conversations(&self, seeds: &[ConversationSeed]) -> anyhow::Result<()>;
}

#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(&self, tags: &[&str]);
}

/// Fetches a checkout session straight from the gateway.
#[async_trait]
pub trait CheckoutSessionSource: Send + Sync {
    async fn retrieve(&self, session_id: &str) -> anyhow::Result<CheckoutSession>;
}
