use anyhow::Context;

use ludo_duel::{config::AppConfig, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    // RUST_LOG wins over the per-environment default
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .init();

    tracing::info!("🎲 Ludo duel server starting ({:?})", config.environment);
    if let Some(seed) = config.dice_seed {
        tracing::info!("Using seeded dice (seed {})", seed);
    }

    let state = AppState::from_config(&config);
    let app = routes::build_router(state, &config.allowed_origins);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("✅ Server listening on http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;

    tracing::info!("👋 Shutting down game server...");
    Ok(())
}
