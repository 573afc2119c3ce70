//! API Server - HTTP server for the forwarder UI and JSON API

use axum::{
    extract::State,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::auth::{session_token, CredentialVerifier, OperatorAccount, SessionKeys};
use crate::api::handlers::{self, ApiError, AppState};
use crate::api::web;
use crate::config::Config;
use crate::directadmin::{ForwarderGateway, HttpPanelClient, PanelClient};
use crate::error::Result;

/// API Server configuration
pub struct ApiServer {
    state: Arc<AppState>,
    addr: String,
}

impl ApiServer {
    /// Create a server talking to the real panel
    pub fn new(config: &Config) -> Result<Self> {
        let client: Arc<dyn PanelClient> = Arc::new(HttpPanelClient::new(&config.directadmin)?);
        let verifier = Box::new(OperatorAccount::from_config(&config.auth));
        Ok(Self::with_parts(config, client, verifier))
    }

    /// Create a server from explicit collaborators
    pub fn with_parts(
        config: &Config,
        client: Arc<dyn PanelClient>,
        verifier: Box<dyn CredentialVerifier>,
    ) -> Self {
        let state = Arc::new(AppState {
            gateway: ForwarderGateway::new(&config.directadmin, client),
            verifier,
            sessions: SessionKeys::from_config(&config.auth),
        });

        Self {
            state,
            addr: config.server.listen_addr.clone(),
        }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        // Public routes (no auth required)
        let public_routes = Router::new()
            .route("/health", get(handlers::health))
            .route("/login", get(web::login_page).post(web::login_submit))
            .route("/logout", get(web::logout))
            .route("/", get(web::index));

        // Protected routes (session required)
        let api_routes = Router::new()
            .route("/forwarders", get(handlers::list_forwarders))
            .route("/create-forwarder", post(handlers::create_forwarder))
            .route("/delete-forwarder", post(handlers::delete_forwarder))
            .route("/debug-forwarders", get(handlers::debug_forwarders))
            .route(
                "/suggested-destinations",
                get(handlers::suggested_destinations),
            )
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware,
            ));

        Router::new()
            .merge(public_routes)
            .nest("/api", api_routes)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the API server
    pub async fn run(&self) -> std::io::Result<()> {
        let router = self.router();

        info!("Starting forwarder UI on {}", self.addr);
        info!("Managing forwarders for {}", self.state.gateway.domain());

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}

/// Authentication middleware - validates the session cookie
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match session_token(req.headers()) {
        Some(token) => token.to_string(),
        None => {
            warn!("Missing session cookie for {}", req.uri().path());
            return ApiError::unauthorized().into_response();
        }
    };

    match state.sessions.validate_token(&token) {
        Ok(claims) => {
            // Store claims in request extensions for handlers
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            warn!("Invalid session token: {}", e);
            ApiError::unauthorized().into_response()
        }
    }
}
