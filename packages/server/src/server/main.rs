// Main entry point for API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use server_core::domains::scraping::{DriverOptions, RequestDefaults};
use server_core::kernel::{ApifyAdapter, BaseSnapshotStore, PostgresSnapshotStore, ServerDeps};
use server_core::server::auth::{AdminCredentials, SessionStore};
use server_core::server::{build_app, AppState};
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,apify_client=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting comment scraper API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        run_mode = ?config.apify_run_mode,
        actor = %config.apify_actor_id,
        poll_interval = ?config.poll_interval,
        poll_deadline = ?config.poll_deadline,
        "Configuration loaded"
    );

    let snapshot_store = connect_snapshot_store(&config).await;

    let deps = ServerDeps::new(
        Arc::new(ApifyAdapter::new(&config.apify_base_url)),
        DriverOptions {
            actor_id: config.apify_actor_id.clone(),
            mode: config.apify_run_mode,
            poll_interval: config.poll_interval,
            poll_deadline: config.poll_deadline,
        },
        snapshot_store,
        RequestDefaults {
            credential_token: config.apify_token_default.clone(),
        },
    );

    let state = AppState::new(
        deps,
        SessionStore::new(config.session_ttl_hours),
        AdminCredentials {
            username: config.admin_user.clone(),
            password: config.admin_pass.clone(),
        },
    );

    // Sweep expired sessions once an hour
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            let removed = sessions.cleanup_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "Expired sessions cleaned up");
            }
        }
    });

    // Build application
    let app = build_app(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Operator UI: http://localhost:{}/", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Connect to Postgres and run migrations. Any failure leaves the service
/// running on the in-memory result cache alone.
async fn connect_snapshot_store(config: &Config) -> Option<Arc<dyn BaseSnapshotStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, results will be kept in memory only");
        return None;
    };

    tracing::info!("Connecting to database...");
    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("Failed to connect to database")
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "Database unavailable, results will be kept in memory only");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::warn!(error = %e, "Migrations failed, results will be kept in memory only");
        return None;
    }
    tracing::info!("Database ready");

    Some(Arc::new(PostgresSnapshotStore::new(pool)))
}
