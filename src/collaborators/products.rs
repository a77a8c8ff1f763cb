use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use super::ProductDirectory;
use crate::db::DbPool;

#[derive(Clone)]
pub struct PgProductDirectory {
    pool: DbPool,
}

impl PgProductDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductDirectory for PgProductDirectory {
    async fn seller_ids(&self, product_ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, Uuid>> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, Uuid)> =
            sqlx::query_as("SELECT id, seller_id FROM products WHERE id = ANY($1)")
                .bind(product_ids.to_vec())
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }
}
