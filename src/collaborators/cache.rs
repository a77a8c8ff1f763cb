use async_trait::async_trait;

use super::CacheInvalidator;

pub const CACHE_TAG_ORDERS: &str = "orders";
pub const CACHE_TAG_MESSAGES: &str = "messages";
pub const CACHE_TAG_CONVERSATIONS: &str = "conversations";

/// Publishes invalidations as tracing events for the host application's
/// cache layer to pick up.
#[derive(Debug, Default, Clone)]
pub struct LogCacheInvalidator;

#[async_trait]
impl CacheInvalidator for LogCacheInvalidator {
    async fn invalidate(&self, tags: &[&str]) {
        for tag in tags {
            tracing::info!(target: "cache_invalidation", tag = %tag, "cache tag invalidated");
        }
    }
}
