//! LAN share server - Entry Point

use log::{error, info};
use std::process;

use lan_share_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // RUST_LOG overrides; info by default so the access URL is printed
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Launching LAN share server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        error!("{}", e);
        process::exit(1);
    }
}
