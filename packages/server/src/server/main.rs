// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use fcm::{FcmOptions, FcmService};
use server_core::kernel::{BasePushNotificationService, FcmAdapter, NoopPushService, ServerDeps};
use server_core::server::build_app;
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Toolshare API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Push delivery: FCM when configured, otherwise log-and-drop
    let push: Arc<dyn BasePushNotificationService> = match config.fcm_server_key.clone() {
        Some(server_key) => {
            tracing::info!("FCM push delivery enabled");
            Arc::new(FcmAdapter::new(Arc::new(FcmService::new(FcmOptions {
                server_key,
            }))))
        }
        None => {
            tracing::warn!("FCM_SERVER_KEY not set; push notifications disabled");
            Arc::new(NoopPushService)
        }
    };

    // Build application
    let deps = Arc::new(ServerDeps::postgres(pool, push));
    let app = build_app(deps);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
