#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::Utc;
use marketplace_orders::{
    collaborators::{
        CacheInvalidator, CheckoutSessionSource, ConversationSeed, ConversationSeeder,
        ProductDirectory,
    },
    entity::{order_items, orders, sea_orm_active_enums::OrderItemStatus},
    gateway::{CheckoutSession, SignatureVerifier},
    middleware::auth::encode_token,
    services::transitions::AllowAnySellerTransition,
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Transaction};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const WEBHOOK_SECRET: &str = "whsec_test";

#[derive(Default)]
pub struct FakeProducts {
    pub sellers: HashMap<Uuid, Uuid>,
}

#[async_trait]
impl ProductDirectory for FakeProducts {
    async fn seller_ids(&self, product_ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, Uuid>> {
        Ok(product_ids
            .iter()
            .filter_map(|id| self.sellers.get(id).map(|seller| (*id, *seller)))
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingSeeder {
    pub seeds: Mutex<Vec<ConversationSeed>>,
}

#[async_trait]
impl ConversationSeeder for RecordingSeeder {
    async fn ensure_conversations(&self, seeds: &[ConversationSeed]) -> anyhow::Result<()> {
        self.seeds.lock().unwrap().extend_from_slice(seeds);
        Ok(())
    }
}

/// Directory lookup that always errors.
pub struct FailingProducts;

#[async_trait]
impl ProductDirectory for FailingProducts {
    async fn seller_ids(&self, _product_ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, Uuid>> {
        anyhow::bail!("product directory unavailable")
    }
}

pub struct FailingSeeder;

#[async_trait]
impl ConversationSeeder for FailingSeeder {
    async fn ensure_conversations(&self, _seeds: &[ConversationSeed]) -> anyhow::Result<()> {
        anyhow::bail!("messaging unavailable")
    }
}

#[derive(Default)]
pub struct RecordingCache {
    pub tags: Mutex<Vec<String>>,
}

#[async_trait]
impl CacheInvalidator for RecordingCache {
    async fn invalidate(&self, tags: &[&str]) {
        self.tags
            .lock()
            .unwrap()
            .extend(tags.iter().map(|t| t.to_string()));
    }
}

pub struct FixedSession(pub CheckoutSession);

#[async_trait]
impl CheckoutSessionSource for FixedSession {
    async fn retrieve(&self, _session_id: &str) -> anyhow::Result<CheckoutSession> {
        Ok(self.0.clone())
    }
}

pub struct Fakes {
    pub seeder: Arc<RecordingSeeder>,
    pub cache: Arc<RecordingCache>,
}

pub fn state_with(orm: DatabaseConnection, products: FakeProducts) -> (AppState, Fakes) {
    let seeder = Arc::new(RecordingSeeder::default());
    let cache = Arc::new(RecordingCache::default());
    let state = AppState {
        orm: Arc::new(orm),
        jwt_secret: Arc::from(JWT_SECRET),
        verifier: SignatureVerifier::new(vec![WEBHOOK_SECRET.to_string()], 300),
        products: Arc::new(products),
        conversations: seeder.clone(),
        cache: cache.clone(),
        sessions: None,
        seller_guard: Arc::new(AllowAnySellerTransition),
    };
    (state, Fakes { seeder, cache })
}

pub fn bearer(user_id: Uuid) -> String {
    let token = encode_token(user_id, JWT_SECRET, chrono::Duration::hours(1)).unwrap();
    format!("Bearer {token}")
}

pub fn order_model(id: Uuid, user_id: Uuid) -> orders::Model {
    orders::Model {
        id,
        user_id,
        total_amount: Decimal::new(2000, 2),
        status: "paid".to_string(),
        shipping_address: None,
        payment_intent_id: Some("pi_123".to_string()),
        created_at: Utc::now().fixed_offset(),
    }
}

pub fn order_item_model(
    id: Uuid,
    order_id: Uuid,
    seller_id: Uuid,
    status: OrderItemStatus,
) -> order_items::Model {
    order_items::Model {
        id,
        order_id,
        product_id: Uuid::new_v4(),
        seller_id,
        variant_id: None,
        quantity: 2,
        price_at_purchase: Decimal::new(1000, 2),
        status,
        seller_received_at: None,
        shipped_at: None,
        delivered_at: None,
        tracking_number: None,
        shipping_carrier: None,
        created_at: Utc::now().fixed_offset(),
    }
}

/// Minimal `checkout.session.completed` event for `buyer_id`.
pub fn checkout_event(session: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": "evt_test",
        "type": "checkout.session.completed",
        "created": Utc::now().timestamp(),
        "livemode": false,
        "data": { "object": session },
    }))
    .unwrap()
}

/// Statements the mock connection saw. Consumes the state so the connection
/// can be taken back out of its `Arc`.
pub fn transaction_log(state: AppState) -> Vec<Transaction> {
    Arc::into_inner(state.orm)
        .expect("connection still shared")
        .into_transaction_log()
}
