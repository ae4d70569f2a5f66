//! API Server - HTTP server for the scorer service

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::{self, AppState};
use crate::history::ScanHistory;
use crate::scorer::Scorer;

/// API Server configuration
pub struct ApiServer {
    state: Arc<AppState>,
    addr: String,
}

impl ApiServer {
    pub fn new(
        scorer: Scorer,
        history: Option<ScanHistory>,
        max_results: i64,
        addr: String,
    ) -> Self {
        let state = Arc::new(AppState {
            scorer: Arc::new(scorer),
            history: history.map(Arc::new),
            max_results,
        });

        Self { state, addr }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        // The web frontend is served from a different origin
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(handlers::root))
            .route("/health", get(handlers::health))
            .route("/predict", post(handlers::predict))
            .route(
                "/history",
                get(handlers::history).delete(handlers::clear_history),
            )
            .route("/analytics", get(handlers::analytics))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the API server
    pub async fn run(&self) -> std::io::Result<()> {
        let router = self.router();

        info!("Starting scorer service on {}", self.addr);
        if !self.state.scorer.is_ready() {
            info!("No model loaded; /predict will answer 503 until one is trained");
        }

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
