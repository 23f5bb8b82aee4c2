//! Create an active user without email activation.
//!
//! ```text
//! create_user <email> <password> [language_code]
//! ```
//!
//! Intended for operators and local development. Prints the new user's id
//! and a session token.

use std::sync::Arc;

use anyhow::{Context, bail};
use nutrition_tracker_server::{
    config::Config,
    db,
    models::user::{DEFAULT_LANGUAGE, RegisterRequest},
    services::SmtpEmailSender,
    state::AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (email, password, language) = match args.as_slice() {
        [email, password] => (email, password, DEFAULT_LANGUAGE.to_string()),
        [email, password, language] => (email, password, language.clone()),
        _ => bail!("usage: create_user <email> <password> [language_code]"),
    };

    let request = RegisterRequest {
        email: email.trim().to_string(),
        password: password.clone(),
        language_code: language,
    };
    if let Err(reason) = request.validate() {
        bail!(reason);
    }

    let config = Config::from_env()?;
    let pool = db::create_pool(&config.database_url)
        .await
        .context("connecting to database")?;
    db::run_migrations(&pool).await?;

    // The mailer is never called on this path.
    let mailer = SmtpEmailSender::from_config(&config)?;
    let state = AppState::new(pool, &config, Arc::new(mailer));

    let purged = state.identity.purge_expired_activation_tokens().await?;
    if purged > 0 {
        println!("Removed {purged} expired activation token(s)");
    }

    let (user, token) = state
        .identity
        .register(
            &request.email,
            &request.password,
            &request.language_code,
            true,
        )
        .await
        .with_context(|| format!("creating user {}", request.email))?;

    println!("Created user {} (id {})", user.email, user.id);
    println!("Token: {token}");

    Ok(())
}
