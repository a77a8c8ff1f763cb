use std::sync::Arc;

use crate::{
    collaborators::{
        CacheInvalidator, CheckoutSessionSource, ConversationSeeder, LogCacheInvalidator,
        PgConversationSeeder, PgProductDirectory, ProductDirectory,
    },
    config::AppConfig,
    db::{DbPool, OrmConn},
    gateway::{SignatureVerifier, session_client::StripeSessionClient},
    services::transitions::{AllowAnySellerTransition, SellerTransitionGuard},
};

#[derive(Clone)]
pub struct AppState {
    pub orm: Arc<OrmConn>,
    pub jwt_secret: Arc<str>,
    pub verifier: SignatureVerifier,
    pub products: Arc<dyn ProductDirectory>,
    pub conversations: Arc<dyn ConversationSeeder>,
    pub cache: Arc<dyn CacheInvalidator>,
    pub sessions: Option<Arc<dyn CheckoutSessionSource>>,
    pub seller_guard: Arc<dyn SellerTransitionGuard>,
}

impl AppState {
    /// State wired to the Postgres-backed collaborators.
    pub fn from_config(config: &AppConfig, pool: DbPool, orm: OrmConn) -> anyhow::Result<Self> {
        let sessions = match &config.stripe_secret_key {
            Some(key) => {
                let client = StripeSessionClient::new(config.stripe_api_base.clone(), key.clone())?;
                Some(Arc::new(client) as Arc<dyn CheckoutSessionSource>)
            }
            None => {
                tracing::warn!("STRIPE_SECRET_KEY not set; checkout verification disabled");
                None
            }
        };

        Ok(Self {
            orm: Arc::new(orm),
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
            verifier: SignatureVerifier::from_config(&config.webhook),
            products: Arc::new(PgProductDirectory::new(pool.clone())),
            conversations: Arc::new(PgConversationSeeder::new(pool)),
            cache: Arc::new(LogCacheInvalidator),
            sessions,
            seller_guard: Arc::new(AllowAnySellerTransition),
        })
    }
}
