use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use log::{error, info, warn};
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::error::ServerError;
use crate::middleware::log_request;
use crate::protocol::handlers;
use crate::server::config::ServerConfig;
use crate::server::state::AppState;
use crate::storage::StoreRoot;
use crate::utils::network::lan_url;

/// URL prefix under which stored files are served as-is
pub const FILES_PREFIX: &str = "/files";

pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Prepares the store root and binds the listener.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let store = StoreRoot::open(config.store_root_path()).map_err(ServerError::StoreRoot)?;
        info!("Store root directory: {}", store.path().display());

        let public_dir = config.public_dir_path();
        let public_dir = if public_dir.is_dir() {
            info!("Serving UI assets from {}", public_dir.display());
            Some(public_dir)
        } else {
            warn!(
                "Public directory {} not found, serving API only",
                public_dir.display()
            );
            None
        };

        let addr = config.socket_addr();
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => {
                info!("Server bound to {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", addr, e);
                return Err(ServerError::Bind(addr, e));
            }
        };

        let router = build_router(AppState::new(store), public_dir.as_deref());
        Ok(Self { listener, router })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr = self.local_addr().map_err(ServerError::Serve)?;
        info!("LAN share server running");
        info!("Access URL on your local network: {}", lan_url(addr.port()));

        axum::serve(self.listener, self.router)
            .await
            .map_err(ServerError::Serve)
    }
}

/// Builds the HTTP router over the given state.
///
/// `public_dir`, when given, serves the browser UI for every path no API
/// route claims.
pub fn build_router(state: AppState, public_dir: Option<&Path>) -> Router {
    let stored_files = ServeDir::new(state.store.path());

    let mut router = Router::new()
        .route("/api/files", get(handlers::list_files))
        .route("/api/check-exists", post(handlers::check_exists))
        .route("/api/mkdir", post(handlers::make_directory))
        .route(
            "/api/upload",
            post(handlers::upload_files).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/delete", delete(handlers::delete_entry))
        .route("/api/content", get(handlers::read_content))
        .nest_service(FILES_PREFIX, stored_files);

    if let Some(dir) = public_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
