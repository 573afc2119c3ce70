use askama_axum::Template;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::auth::clear_session_cookie;
use crate::api::handlers::AppState;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: String,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    operator: String,
    domain: String,
    version: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

// Login page (GET)
pub async fn login_page() -> impl IntoResponse {
    LoginTemplate { error: String::new() }
}

// Login form submission (POST)
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    if !state.verifier.verify(&form.username, &form.password) {
        warn!("Failed login for {:?}", form.username);
        return (
            StatusCode::UNAUTHORIZED,
            LoginTemplate {
                error: "Invalid username or password".to_string(),
            },
        )
            .into_response();
    }

    match state.sessions.create_token(&form.username) {
        Ok(token) => {
            info!("Operator {} logged in", form.username);
            (
                StatusCode::SEE_OTHER,
                [
                    (header::SET_COOKIE, state.sessions.session_cookie(&token)),
                    (header::LOCATION, "/".to_string()),
                ],
                "Redirecting...",
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to issue session token: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                LoginTemplate {
                    error: "Could not start a session".to_string(),
                },
            )
                .into_response()
        }
    }
}

// Logout
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, clear_session_cookie()),
            (header::LOCATION, "/login".to_string()),
        ],
        "Redirecting...",
    )
}

// Forwarder management page
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let operator = match state.sessions.session_user(&headers) {
        Some(user) => user,
        None => return Redirect::to("/login").into_response(),
    };

    IndexTemplate {
        operator,
        domain: state.gateway.domain().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
    .into_response()
}
