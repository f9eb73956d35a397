//! Kairo relay server.
//!
//! Keeps the most recent messages and broadcasts every new message to all
//! connected clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kairo-server
//! cargo run --bin kairo-server -- --host 0.0.0.0 --port 3000 --history-capacity 100
//! ```

use clap::Parser;
use kairo_server::{
    config::{DEFAULT_HOST, DEFAULT_PORT, ServerConfig},
    domain::DEFAULT_HISTORY_CAPACITY,
    ui::Server,
    usecase::RelayService,
};
use kairo_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kairo-server")]
#[command(about = "WebSocket message relay with bounded history", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Number of recent messages kept and replayed to new connections
    #[arg(short = 'c', long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,

    /// Default log level when RUST_LOG is not set
    #[arg(short = 'l', long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(&[env!("CARGO_CRATE_NAME"), "tower_http"], &args.log_level);

    let config = match ServerConfig::new(args.host, args.port, args.history_capacity) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        history_capacity = config.history_capacity,
        "Starting relay on {}",
        config.bind_addr()
    );

    let server = Server::new(RelayService::new(config.history_capacity));
    if let Err(e) = server.run(&config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
