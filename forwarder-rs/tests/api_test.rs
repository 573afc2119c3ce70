//! Integration tests for the HTTP API, driven through the router

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use forwarder_rs::api::auth::{OperatorAccount, SessionKeys};
use forwarder_rs::api::ApiServer;
use forwarder_rs::directadmin::{PanelClient, PanelRequest, PanelResponse};
use forwarder_rs::{Config, ForwarderError, Result};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Panel double: replays canned replies and records what it was sent
#[derive(Default)]
struct FakePanel {
    replies: Mutex<VecDeque<Result<PanelResponse>>>,
    requests: Mutex<Vec<PanelRequest>>,
}

impl FakePanel {
    fn replying(replies: Vec<Result<PanelResponse>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<PanelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PanelClient for FakePanel {
    async fn send(&self, request: PanelRequest) -> Result<PanelResponse> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ForwarderError::Transport("no reply queued".to_string())))
    }
}

fn test_config() -> Config {
    let mut config = Config::development();
    config.directadmin.domain = "example.com".to_string();
    config.auth.session_secret = "integration-secret".to_string();
    config
}

fn app(panel: Arc<FakePanel>) -> Router {
    let server = ApiServer::with_parts(
        &test_config(),
        panel,
        Box::new(OperatorAccount::new("ops", "pw")),
    );
    server.router()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Log in and return the `name=value` session cookie
async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=ops&password=pw"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, cookie: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app(FakePanel::replying(vec![]));

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_api_requires_session() {
    let panel = FakePanel::replying(vec![]);
    let app = app(panel.clone());

    let response = app.oneshot(get("/api/forwarders", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["success"], false);
    assert!(panel.requests().is_empty());
}

#[tokio::test]
async fn test_api_rejects_forged_cookie() {
    let app = app(FakePanel::replying(vec![]));

    let response = app
        .oneshot(get("/api/forwarders", Some("forwarder_session=not-a-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = app(FakePanel::replying(vec![]));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=ops&password=nope"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("Invalid username or password"));
}

#[tokio::test]
async fn test_index_redirects_without_session() {
    let app = app(FakePanel::replying(vec![]));

    let response = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_index_renders_domain_after_login() {
    let app = app(FakePanel::replying(vec![]));
    let cookie = login(&app).await;

    let response = app.oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Forwarders for example.com"));
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = app(FakePanel::replying(vec![]));

    let response = app.oneshot(get("/logout", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("forwarder_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_list_forwarders() {
    let panel = FakePanel::replying(vec![Ok(PanelResponse::new(
        200,
        "sales=alice%40example.org%2Cbob%40example.org&info%40example.com=carol%40example.net",
    ))]);
    let app = app(panel.clone());
    let cookie = login(&app).await;

    let response = app.oneshot(get("/api/forwarders", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "success": true,
            "domain": "example.com",
            "forwarders": [
                {"alias": "sales", "destinations": ["alice@example.org", "bob@example.org"]},
                {"alias": "info", "destinations": ["carol@example.net"]}
            ]
        })
    );

    let requests = panel.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].command, "CMD_API_EMAIL_FORWARDERS");
    assert_eq!(requests[0].get("domain"), Some("example.com"));
    assert_eq!(requests[0].get("action"), None);
}

#[tokio::test]
async fn test_list_with_no_forwarders() {
    let app = app(FakePanel::replying(vec![Ok(PanelResponse::new(200, "error=1"))]));
    let cookie = login(&app).await;

    let response = app.oneshot(get("/api/forwarders", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["forwarders"], json!([]));
}

#[tokio::test]
async fn test_list_upstream_failure_is_500() {
    let app = app(FakePanel::replying(vec![Ok(PanelResponse::new(503, "down"))]));
    let cookie = login(&app).await;

    let response = app.oneshot(get("/api/forwarders", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "DirectAdmin returned HTTP 503");
}

#[tokio::test]
async fn test_list_transport_failure_is_500() {
    let app = app(FakePanel::replying(vec![Err(ForwarderError::Transport(
        "connection refused".to_string(),
    ))]));
    let cookie = login(&app).await;

    let response = app.oneshot(get("/api/forwarders", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn test_create_missing_destination_is_400_without_panel_call() {
    let panel = FakePanel::replying(vec![]);
    let app = app(panel.clone());
    let cookie = login(&app).await;

    let response = app
        .oneshot(post_json("/api/create-forwarder", &cookie, json!({"alias": "sales"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"success": false, "error": "Missing alias or destination"})
    );
    assert!(panel.requests().is_empty());
}

#[tokio::test]
async fn test_create_forwarder() {
    let panel = FakePanel::replying(vec![Ok(PanelResponse::new(200, "error=0&text=Created"))]);
    let app = app(panel.clone());
    let cookie = login(&app).await;

    let response = app
        .oneshot(post_json(
            "/api/create-forwarder",
            &cookie,
            json!({"alias": "sales", "destination": "alice@example.org"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "success": true,
            "message": "Forwarder sales@example.com → alice@example.org created!"
        })
    );

    let requests = panel.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].get("action"), Some("create"));
    assert_eq!(requests[0].get("user"), Some("sales"));
    assert_eq!(requests[0].get("email"), Some("alice@example.org"));
}

#[tokio::test]
async fn test_create_rejected_by_panel_is_400() {
    let app = app(FakePanel::replying(vec![Ok(PanelResponse::new(
        200,
        "error=1&text=Forwarder exists",
    ))]));
    let cookie = login(&app).await;

    let response = app
        .oneshot(post_json(
            "/api/create-forwarder",
            &cookie,
            json!({"alias": "sales", "destination": "alice@example.org"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "DirectAdmin API error: error=1&text=Forwarder exists"
    );
}

#[tokio::test]
async fn test_delete_missing_alias_is_400() {
    let panel = FakePanel::replying(vec![]);
    let app = app(panel.clone());
    let cookie = login(&app).await;

    let response = app
        .oneshot(post_json("/api/delete-forwarder", &cookie, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing alias");
    assert!(panel.requests().is_empty());
}

#[tokio::test]
async fn test_delete_forwarder() {
    let panel = FakePanel::replying(vec![Ok(PanelResponse::new(200, "error=0"))]);
    let app = app(panel.clone());
    let cookie = login(&app).await;

    let response = app
        .oneshot(post_json("/api/delete-forwarder", &cookie, json!({"alias": "sales"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Forwarder sales@example.com deleted!"
    );
    assert_eq!(panel.requests()[0].get("select0"), Some("sales"));
}

#[tokio::test]
async fn test_debug_forwarders_shows_raw_reply() {
    let raw = "error=0&sales=alice%40example.org";
    let app = app(FakePanel::replying(vec![Ok(PanelResponse::new(200, raw))]));
    let cookie = login(&app).await;

    let response = app
        .oneshot(get("/api/debug-forwarders", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["raw"], raw);
    assert_eq!(body["status"], 200);
    assert_eq!(body["parsed"][0]["alias"], "sales");
}

#[tokio::test]
async fn test_suggested_destinations() {
    let app = app(FakePanel::replying(vec![Ok(PanelResponse::new(
        200,
        "sales=bob%40example.org%2Cadmin%40example.com&info=bob%40example.org",
    ))]));
    let cookie = login(&app).await;

    let response = app
        .oneshot(get("/api/suggested-destinations", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(
        body_json(response).await,
        json!({"success": true, "destinations": ["bob@example.org"]})
    );
}

#[tokio::test]
async fn test_delete_with_form_body_is_json_400() {
    let panel = FakePanel::replying(vec![]);
    let app = app(panel.clone());
    let cookie = login(&app).await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/delete-forwarder")
                .header(header::COOKIE, &cookie)
                .body(Body::from("alias=sales"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
    assert!(panel.requests().is_empty());
}

#[tokio::test]
async fn test_create_with_mistyped_field_is_json_400() {
    let panel = FakePanel::replying(vec![]);
    let app = app(panel.clone());
    let cookie = login(&app).await;

    let response = app
        .oneshot(post_json(
            "/api/create-forwarder",
            &cookie,
            json!({"alias": 5, "destination": "x@y"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert!(panel.requests().is_empty());
}

#[tokio::test]
async fn test_placeholder_secret_cannot_forge_session() {
    let config = Config::load_with(None, |_| None).unwrap();
    let app = ApiServer::with_parts(
        &config,
        FakePanel::replying(vec![]),
        Box::new(OperatorAccount::new("ops", "pw")),
    )
    .router();

    let forged = SessionKeys::new("change-me-in-production".to_string(), 1)
        .create_token("ops")
        .unwrap();

    let response = app
        .oneshot(get(
            "/api/forwarders",
            Some(&format!("forwarder_session={}", forged)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
