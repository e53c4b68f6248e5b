use axum::routing::get;
use axum::Router;
use tokio::sync::{broadcast, mpsc};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use volley_server::config::ServerConfig;
use volley_server::matchmaking::MatchmakingPool;
use volley_server::relay::{run_relay, RelayBroadcast, RelayCommand};
use volley_server::state::RelayState;
use volley_server::ws::{ws_handler, AppState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid server configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }

    let (relay_tx, relay_rx) = mpsc::channel::<RelayCommand>(config.command_capacity);
    let (broadcast_tx, _) = broadcast::channel::<RelayBroadcast>(config.broadcast_capacity);

    // Spawn relay loop
    let bc_tx = broadcast_tx.clone();
    tokio::spawn(async move {
        run_relay(relay_rx, bc_tx, RelayState::new(MatchmakingPool::new())).await;
    });

    let app_state = AppState {
        relay_tx,
        broadcast_tx,
        game: config.game,
    };
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on - {}", config.listen_addr);
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
