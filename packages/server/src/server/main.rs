// Main entry point for API server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use stream_chat::{StreamChatClient, StreamChatOptions};
use tontine_core::domains::auth::{CodeVerifier, RealVerifier, SimulatedVerifier};
use tontine_core::kernel::{PostgresStore, ServerDeps, StreamChatAdapter, TwilioAdapter};
use tontine_core::server::{build_app, middleware::with_rate_limit};
use tontine_core::{Config, VerificationMode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twilio::{TwilioOptions, TwilioService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tontine_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tontine API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(verification_mode = ?config.verification_mode, "Configuration loaded");

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

    // Code verification strategy
    let verifier: Arc<dyn CodeVerifier> = match (config.verification_mode, &config.twilio) {
        (VerificationMode::Sms, Some(twilio)) => {
            let service = TwilioService::new(TwilioOptions {
                account_sid: twilio.account_sid.clone(),
                auth_token: twilio.auth_token.clone(),
                from: twilio.from_number.clone(),
            });
            let sms = Arc::new(TwilioAdapter::new(Arc::new(service)));
            Arc::new(RealVerifier::new(sms))
        }
        (VerificationMode::Sms, None) => {
            anyhow::bail!("VERIFICATION_MODE=sms requires Twilio credentials")
        }
        (VerificationMode::Simulated, _) => {
            tracing::warn!("Simulated verification: any 6-digit code signs in");
            Arc::new(SimulatedVerifier)
        }
    };

    // Chat provider
    let chat = StreamChatClient::new(StreamChatOptions {
        api_key: config.stream_api_key.clone(),
        api_secret: config.stream_api_secret.clone(),
    });

    let deps = ServerDeps::new(
        Arc::new(PostgresStore::new(pool)),
        verifier,
        Arc::new(StreamChatAdapter::new(Arc::new(chat))),
    );

    // Build application
    let app = build_app(deps, &config.allowed_origins);
    let app = with_rate_limit(app, config.rate_limit_per_second, config.rate_limit_burst)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
