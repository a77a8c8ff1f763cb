use async_trait::async_trait;
use uuid::Uuid;

use super::{ConversationSeed, ConversationSeeder};
use crate::db::DbPool;

#[derive(Clone)]
pub struct PgConversationSeeder {
    pool: DbPool,
}

impl PgConversationSeeder {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationSeeder for PgConversationSeeder {
    async fn ensure_conversations(&self, seeds: &[ConversationSeed]) -> anyhow::Result<()> {
        if seeds.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = seeds.iter().map(|_| Uuid::new_v4()).collect();
        let order_ids: Vec<Uuid> = seeds.iter().map(|s| s.order_id).collect();
        let buyer_ids: Vec<Uuid> = seeds.iter().map(|s| s.buyer_id).collect();
        let seller_ids: Vec<Uuid> = seeds.iter().map(|s| s.seller_id).collect();
        let product_ids: Vec<Uuid> = seeds.iter().map(|s| s.product_id).collect();

        let inserted = sqlx::query(
            r#"
            INSERT INTO conversations (id, order_id, buyer_id, seller_id, product_id)
            SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::uuid[], $4::uuid[], $5::uuid[])
            ON CONFLICT (order_id, buyer_id, seller_id, product_id) DO NOTHING
            "#,
        )
        .bind(ids)
        .bind(order_ids)
        .bind(buyer_ids)
        .bind(seller_ids)
        .bind(product_ids)
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::debug!(requested = seeds.len(), inserted, "order conversations ensured");
        Ok(())
    }
}
