//! JSON API handlers
//!
//! Every endpoint answers with an envelope carrying `success`. Failures use
//! `{"success": false, "error": "..."}` and a status picked by [`ApiError`].

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::auth::{Claims, CredentialVerifier, SessionKeys};
use crate::directadmin::{Forwarder, ForwarderGateway};
use crate::error::ForwarderError;

/// Shared application state
pub struct AppState {
    pub gateway: ForwarderGateway,
    pub verifier: Box<dyn CredentialVerifier>,
    pub sessions: SessionKeys,
}

/// Body of `POST /api/create-forwarder`
#[derive(Debug, Default, Deserialize)]
pub struct CreateForwarderRequest {
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

/// Body of `POST /api/delete-forwarder`
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForwarderRequest {
    #[serde(default)]
    pub alias: Option<String>,
}

/// Forwarder list envelope
#[derive(Debug, Serialize)]
pub struct ForwardersResponse {
    pub success: bool,
    pub forwarders: Vec<Forwarder>,
    pub domain: String,
}

/// Create/delete envelope
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Raw list reply for troubleshooting the panel format
#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub success: bool,
    pub status: u16,
    pub raw: String,
    pub parsed: Vec<Forwarder>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub success: bool,
    pub destinations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    pub error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            success: false,
            error: msg.to_string(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authenticated")
    }
}

impl From<ForwarderError> for ApiError {
    fn from(err: ForwarderError) -> Self {
        let status = match &err {
            ForwarderError::Validation(_) | ForwarderError::Rejected(_) => StatusCode::BAD_REQUEST,
            ForwarderError::UpstreamStatus(_)
            | ForwarderError::Transport(_)
            | ForwarderError::Config(_)
            | ForwarderError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", err);
        }

        Self::new(status, &err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        Self::new(
            StatusCode::BAD_REQUEST,
            &format!("Invalid request body: {}", rejection.body_text()),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// GET /health - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/forwarders - List forwarders for the configured domain
pub async fn list_forwarders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ForwardersResponse>, ApiError> {
    let forwarders = state.gateway.list().await?;

    Ok(Json(ForwardersResponse {
        success: true,
        forwarders,
        domain: state.gateway.domain().to_string(),
    }))
}

/// POST /api/create-forwarder - Create a forwarder
pub async fn create_forwarder(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateForwarderRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    info!(
        "{} requested forwarder {:?} -> {:?}",
        claims.sub, req.alias, req.destination
    );

    let message = state
        .gateway
        .create(
            req.alias.as_deref().unwrap_or_default(),
            req.destination.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message,
    }))
}

/// POST /api/delete-forwarder - Delete a forwarder
pub async fn delete_forwarder(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<DeleteForwarderRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload?;
    info!("{} requested deletion of {:?}", claims.sub, req.alias);

    let message = state
        .gateway
        .delete(req.alias.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message,
    }))
}

/// GET /api/debug-forwarders - Raw panel reply next to the parsed result
pub async fn debug_forwarders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DebugResponse>, ApiError> {
    let response = state.gateway.raw_list().await?;
    let parsed = crate::directadmin::parse_forwarders(&response.body);

    Ok(Json(DebugResponse {
        success: response.is_http_success(),
        status: response.status,
        raw: response.body,
        parsed,
    }))
}

/// GET /api/suggested-destinations - Addresses already used as destinations
pub async fn suggested_destinations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let destinations = state.gateway.suggestions().await?;

    Ok(Json(SuggestionsResponse {
        success: true,
        destinations,
    }))
}
