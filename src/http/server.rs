//! HTTP server for the space API

use super::handler;
use crate::space::SpaceManager;
use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Build the API router over a shared space manager
pub fn router(manager: Arc<SpaceManager>) -> Router {
    Router::new()
        .route("/api/status", get(handler::status_handler))
        .route("/api/users", post(handler::register_user))
        .route(
            "/api/spaces",
            post(handler::create_space).get(handler::list_spaces),
        )
        .route("/api/spaces/:space", get(handler::get_space))
        .route("/api/spaces/:space/members", get(handler::list_members))
        .route("/api/spaces/:space/people", post(handler::create_person))
        .route(
            "/api/spaces/:space/people/:person",
            patch(handler::update_person).delete(handler::delete_person),
        )
        .route(
            "/api/spaces/:space/relationships",
            post(handler::create_relationship),
        )
        .route(
            "/api/spaces/:space/relationships/:rel",
            axum::routing::delete(handler::delete_relationship),
        )
        .route("/api/spaces/:space/tree", get(handler::tree_handler))
        .route("/api/spaces/:space/search", get(handler::search_handler))
        .route(
            "/api/spaces/:space/invitations",
            post(handler::create_invitation),
        )
        .route(
            "/api/invitations/:token/accept",
            post(handler::accept_invitation),
        )
        .route(
            "/api/spaces/:space/claims",
            post(handler::submit_claim).get(handler::pending_claims),
        )
        .route(
            "/api/spaces/:space/claims/:claim/approve",
            post(handler::approve_claim),
        )
        .route(
            "/api/spaces/:space/claims/:claim/reject",
            post(handler::reject_claim),
        )
        .layer(CorsLayer::permissive())
        .with_state(manager)
}

/// HTTP server managing the space API
pub struct HttpServer {
    manager: Arc<SpaceManager>,
    address: String,
    port: u16,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(manager: Arc<SpaceManager>, address: impl Into<String>, port: u16) -> Self {
        Self {
            manager,
            address: address.into(),
            port,
        }
    }

    /// Bind and serve until the process exits
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = router(Arc::clone(&self.manager));

        let addr = format!("{}:{}", self.address, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("API available at http://{}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
