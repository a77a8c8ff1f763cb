use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketplace_orders::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    routes::create_app,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marketplace_orders=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let pool = create_pool(&config.database_url).await?;
    let orm = create_orm_conn(pool.clone());
    run_migrations(&orm).await?;

    let state = AppState::from_config(&config, pool, orm)?;
    let app = create_app(state);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
