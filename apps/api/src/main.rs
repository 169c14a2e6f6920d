use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orchestrator_cell::AppState;
use shared_config::AppConfig;

mod router;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting ED decision-support API server");

    // Fatal at startup per spec.md §7 "Configuration".
    let config = match AppConfig::from_env_or_default() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let log_dir = std::env::var("ED_SIM_LOG_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."));
    let state = AppState::new(config, log_dir);

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!(%addr, "listening");

    let listener = TcpListener::bind(addr).await.expect("failed to bind TCP listener");
    axum::serve(listener, app).await.expect("server error");
}
