//! Web server implementation using Axum

use crate::backend::{BackendApi, Credentials};
use crate::config::{CollectionDefaults, WebConfig};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn BackendApi>,
    pub admin: Arc<Credentials>,
    pub collections: Arc<CollectionDefaults>,
}

/// Web server for the collection console
pub struct WebServer {
    config: WebConfig,
    app_state: AppState,
}

impl WebServer {
    /// Create a new web server
    pub fn new(
        config: WebConfig,
        backend: Arc<dyn BackendApi>,
        admin: Credentials,
        collections: CollectionDefaults,
    ) -> Self {
        let app_state = AppState {
            backend,
            admin: Arc::new(admin),
            collections: Arc::new(collections),
        };

        Self { config, app_state }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        // Static files (CSS, JS, images)
        let static_dir = ServeDir::new(&self.config.static_dir);

        Router::new()
            .route("/", get(routes::home))
            .route("/createapi", get(routes::create_collection_page))
            .route("/createapi/submit", post(routes::create_collection_submit))
            .route("/collections/{name}", get(routes::collection_detail))
            .route("/collections/{name}/delete", post(routes::collection_delete))
            .nest_service("/static", static_dir)
            .layer(TraceLayer::new_for_http())
            .with_state(self.app_state.clone())
    }

    /// Run the web server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(&self.config.bind).await?;

        tracing::info!(
            bind = %self.config.bind,
            static_dir = %self.config.static_dir.display(),
            "Starting collection console"
        );

        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Get the bind address
    pub fn bind_address(&self) -> &str {
        &self.config.bind
    }
}
