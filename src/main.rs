use ripple_goal::{
    backend::BackendClient, chat::ChatRelay, config::Config, identity::IdentityClient, load_data,
    router, AppState,
};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::load()?;
    let data = load_data(&config.data_path).await;

    let backend = BackendClient::new(config.api_base_url.clone(), config.http_timeout)?;
    let identity = IdentityClient::new(
        config.identity_base_url.clone(),
        config.identity_api_key.clone(),
        config.http_timeout,
    )?;
    let chat = if config.chat_enabled() {
        Some(ChatRelay::new(config.chat_webhook_url.clone(), config.http_timeout)?)
    } else {
        warn!("RIPPLE_CHAT_WEBHOOK_URL not set, chat relay disabled");
        None
    };
    if config.identity_api_key.is_empty() {
        warn!("RIPPLE_IDENTITY_API_KEY not set, sign-up and sign-in will be rejected by the provider");
    }

    let state = AppState::new(&config, data, backend, identity, chat);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(backend = %config.api_base_url, "listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
