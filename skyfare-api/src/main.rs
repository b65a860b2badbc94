use std::net::SocketAddr;

use anyhow::Context;
use skyfare_api::{app, AppState};
use skyfare_core::TokenKeys;
use skyfare_store::{app_config::Config, Repositories};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyfare_api=debug,skyfare_core=info,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Skyfare API on port {}", config.server.port);

    let repos = Repositories::connect(&config.database)
        .await
        .context("Failed to connect to the data store")?;

    let tokens = TokenKeys::new(
        config.auth.jwt_secret.expose(),
        config.auth.jwt_expiration_seconds,
    )?;

    let app_state = AppState::new(repos, tokens).with_cors_origin(config.cors.allowed_origin.clone());
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
