#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use promptrelay_server::api::state::AppState;
use promptrelay_server::config::ServerConfig;

#[tokio::main]
async fn main() {
    // Initialize tracing logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,promptrelay_server=debug".into()),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting PromptRelay server");

    let config = ServerConfig::load().expect("Failed to load configuration");
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        upstream = %config.upstream_url,
        model = %config.model,
        auth = config.auth_url.is_some(),
        "Relay configured"
    );

    let state = AppState::new(config);
    let app = promptrelay_server::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|err| panic!("Failed to bind to {addr}: {err}"));

    tracing::info!("PromptRelay running on http://{addr}");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
