//! Nutrition Tracker Server - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Purge expired activation tokens
//! 5. Build services and HTTP router
//! 6. Start server on configured port

use std::sync::Arc;

use nutrition_tracker_server::{
    app, config::Config, db, services::SmtpEmailSender, state::AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!(environment = %config.environment, "Configuration loaded");

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let mailer = SmtpEmailSender::from_config(&config)?;
    let state = AppState::new(pool, &config, Arc::new(mailer));

    // A failed sweep is not worth refusing to start over.
    if let Err(e) = state.identity.purge_expired_activation_tokens().await {
        tracing::warn!(error = %e, "Expired activation token sweep failed");
    }

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
