use marketplace_orders::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marketplace_orders=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&create_orm_conn(pool)).await?;
    tracing::info!("migrations applied");
    Ok(())
}
