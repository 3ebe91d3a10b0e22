use jobboard::config::GatewayConfig;
use jobboard::{routes, state};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env().expect("invalid configuration");
    let port = config.port;
    tracing::info!(api_base_url = %config.api.base_url, rules = config.gate.rules.len(), "configuration loaded");

    let state = state::AppState::new(config).expect("http client init failed");
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "jobboard gateway listening");
    axum::serve(listener, app).await.expect("server failed");
}
