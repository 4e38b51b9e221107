//! Integration tests for the web UI handlers
//!
//! Drives the router directly and checks the calls it makes to the backend.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use collection_console::backend::{
    BackendApi, BackendClient, BackendError, CollectionDescriptor, Credentials, FieldDescriptor,
    SessionToken, UserAuth, UserDescriptor,
};
use collection_console::config::{CollectionDefaults, WebConfig};
use collection_console::web::WebServer;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_json, header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn admin() -> Credentials {
    Credentials::new("admin@admin.com", "adminadmin")
}

fn router_with(backend: Arc<dyn BackendApi>) -> Router {
    WebServer::new(WebConfig::default(), backend, admin(), CollectionDefaults::default()).router()
}

fn router_for(server: &MockServer) -> Router {
    router_with(Arc::new(BackendClient::from_url_str(&server.uri()).unwrap()))
}

async fn mount_admin_auth(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/admins/auth-with-password"))
        .and(body_json(json!({ "identity": "admin@admin.com", "password": "adminadmin" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "admin-token" })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_admin_auth_rejected(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/admins/auth-with-password"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Failed to authenticate."))
        .expect(1)
        .mount(server)
        .await;
}

/// Fail the test if anything other than admin auth reaches the backend
async fn forbid_other_calls(server: &MockServer) {
    Mock::given(path("/api/collections"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

fn submit(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/createapi/submit")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ── Home ────────────────────────────────────────────────────────

/// Home page lists collections in backend order
#[tokio::test]
async fn test_home_lists_collections() {
    let server = MockServer::start().await;
    mount_admin_auth(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/collections"))
        .and(header_matcher("Authorization", "Bearer admin-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "name": "cats" }, { "name": "dogs" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = router_for(&server).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    let cats = html.find("cats").unwrap();
    let dogs = html.find("dogs").unwrap();
    assert!(cats < dogs);
}

/// Home stops after a failed admin login
#[tokio::test]
async fn test_home_admin_auth_failure() {
    let server = MockServer::start().await;
    mount_admin_auth_rejected(&server).await;
    forbid_other_calls(&server).await;

    let response = router_for(&server).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Unable to authenticate");
}

/// Backend error bodies stay out of the page
#[tokio::test]
async fn test_home_list_failure_hides_backend_body() {
    let server = MockServer::start().await;
    mount_admin_auth(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/collections"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database is locked"))
        .mount(&server)
        .await;

    let response = router_for(&server).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let text = body_text(response).await;
    assert_eq!(text, "Unable to retrieve collections");
    assert!(!text.contains("database is locked"));
}

// ── Create ──────────────────────────────────────────────────────

/// The create form is static
#[tokio::test]
async fn test_create_form_makes_no_backend_calls() {
    let backend = Arc::new(RecordingBackend::default());
    let response = router_with(backend.clone())
        .oneshot(get("/createapi"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("collectionName"));
    assert!(html.contains("payload"));
    assert_eq!(backend.total_calls(), 0);
}

/// Submit creates one collection and redirects home
#[tokio::test]
async fn test_create_submit_creates_and_redirects() {
    let server = MockServer::start().await;
    mount_admin_auth(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/collections"))
        .and(header_matcher("Authorization", "Bearer admin-token"))
        .and(body_json(json!({
            "name": "cats",
            "type": "base",
            "schema": [
                { "name": "title", "type": "text" },
                { "name": "payload", "type": "json" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "c1", "name": "cats" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = router_for(&server)
        .oneshot(submit("collectionName=cats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

/// Each submit issues exactly one create call
#[tokio::test]
async fn test_create_submit_issues_one_call_per_name() {
    for name in ["a", "cats_2024", "with space", "ünïcode"] {
        let backend = Arc::new(RecordingBackend::default());
        let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();

        let response = router_with(backend.clone())
            .oneshot(submit(&format!("collectionName={}", encoded)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "name {:?}", name);
        assert_eq!(backend.created_names(), vec![name.to_string()]);
    }
}

/// Empty names are rejected before any backend call
#[tokio::test]
async fn test_create_submit_empty_name_is_bad_request() {
    let backend = Arc::new(RecordingBackend::default());
    let response = router_with(backend.clone())
        .oneshot(submit("collectionName="))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Collection name cannot be empty");
    assert_eq!(backend.total_calls(), 0);
}

/// Missing collectionName field
#[tokio::test]
async fn test_create_submit_missing_field_is_bad_request() {
    let server = MockServer::start().await;
    let response = router_for(&server).oneshot(submit("")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

/// Submit stops after a failed admin login
#[tokio::test]
async fn test_create_submit_admin_auth_failure() {
    let server = MockServer::start().await;
    mount_admin_auth_rejected(&server).await;
    forbid_other_calls(&server).await;

    let response = router_for(&server)
        .oneshot(submit("collectionName=cats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

/// Backend rejection of a create
#[tokio::test]
async fn test_create_submit_backend_rejection() {
    let server = MockServer::start().await;
    mount_admin_auth(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/collections"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"data":{"name":{"code":"validation_collection_name_exists"}}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let response = router_for(&server)
        .oneshot(submit("collectionName=cats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Failed to create collection");
}

// ── Collection detail / delete ─────────────────────────────────

/// Detail page renders the collection's fields
#[tokio::test]
async fn test_collection_detail_renders_fields() {
    let server = MockServer::start().await;
    mount_admin_auth(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/collections/cats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c1",
            "name": "cats",
            "type": "base",
            "schema": [{ "name": "whiskers", "type": "number" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = router_for(&server)
        .oneshot(get("/collections/cats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("whiskers"));
}

/// Detail stops after a failed admin login
#[tokio::test]
async fn test_collection_detail_admin_auth_failure() {
    let server = MockServer::start().await;
    mount_admin_auth_rejected(&server).await;
    Mock::given(path("/api/collections/cats"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let response = router_for(&server)
        .oneshot(get("/collections/cats"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

/// Delete redirects home on success
#[tokio::test]
async fn test_collection_delete_redirects_home() {
    let server = MockServer::start().await;
    mount_admin_auth(&server, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/api/collections/cats"))
        .and(header_matcher("Authorization", "Bearer admin-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/collections/cats/delete")
        .body(Body::empty())
        .unwrap();
    let response = router_for(&server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

/// Delete must not reach the backend when admin authentication fails
#[tokio::test]
async fn test_collection_delete_admin_auth_failure() {
    let server = MockServer::start().await;
    mount_admin_auth_rejected(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/collections/cats"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/collections/cats/delete")
        .body(Body::empty())
        .unwrap();
    let response = router_for(&server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Unable to authenticate");
}

/// An encoded slash in the path stays a single collection name
#[tokio::test]
async fn test_collection_detail_decodes_encoded_name() {
    let server = MockServer::start().await;
    mount_admin_auth(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/collections/a%2Fb"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "name": "a/b", "type": "base" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = router_for(&server)
        .oneshot(get("/collections/a%2Fb"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"action="/collections/a%2Fb/delete""#));
}

/// Delete failures return a generic 500
#[tokio::test]
async fn test_collection_delete_failure() {
    let server = MockServer::start().await;
    mount_admin_auth(&server, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/api/collections/users"))
        .respond_with(ResponseTemplate::new(400).set_body_string("system collection"))
        .mount(&server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/collections/users/delete")
        .body(Body::empty())
        .unwrap();
    let response = router_for(&server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Failed to delete collection");
}

// ── Recording backend ──────────────────────────────────────────

/// In-process backend that records calls and always succeeds
#[derive(Default)]
struct RecordingBackend {
    calls: AtomicUsize,
    created: std::sync::Mutex<Vec<CollectionDescriptor>>,
}

impl RecordingBackend {
    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn created_names(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }
}

#[async_trait]
impl BackendApi for RecordingBackend {
    async fn authenticate_admin(&self, _: &Credentials) -> Result<SessionToken, BackendError> {
        self.record();
        Ok(SessionToken::new("admin-token"))
    }

    async fn authenticate_user(&self, _: &Credentials) -> Result<UserAuth, BackendError> {
        self.record();
        Err(BackendError::Auth("not supported".to_string()))
    }

    async fn list_collections(&self, _: &SessionToken) -> Result<Vec<String>, BackendError> {
        self.record();
        Ok(vec![])
    }

    async fn create_collection(
        &self,
        _: &SessionToken,
        descriptor: &CollectionDescriptor,
    ) -> Result<(), BackendError> {
        self.record();
        assert_eq!(
            descriptor.schema,
            vec![
                FieldDescriptor::new("title", "text"),
                FieldDescriptor::new("payload", "json")
            ]
        );
        self.created.lock().unwrap().push(descriptor.clone());
        Ok(())
    }

    async fn get_collection(
        &self,
        _: &SessionToken,
        _: &str,
    ) -> Result<Map<String, Value>, BackendError> {
        self.record();
        Ok(Map::new())
    }

    async fn delete_collection(&self, _: &SessionToken, _: &str) -> Result<(), BackendError> {
        self.record();
        Ok(())
    }

    async fn user_exists(&self, _: &SessionToken, _: &str) -> Result<bool, BackendError> {
        self.record();
        Ok(false)
    }

    async fn create_user(
        &self,
        _: &SessionToken,
        _: &UserDescriptor,
    ) -> Result<String, BackendError> {
        self.record();
        Ok("u1".to_string())
    }
}
