use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfmark_core::{CoverStore, PostgresBookRepository};
use shelfmark_server::{AppState, Config, create_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config
        .ensure_directories()
        .context("failed to create cover storage directory")?;

    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    let books = Arc::new(PostgresBookRepository::new(pool));
    let covers = CoverStore::from_url(
        &config.blob_store_url,
        config.cover_public_base_url.clone(),
    )
    .context("failed to initialize cover store")?;

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let state = AppState::new(config, books, covers);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "shelfmark server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
