mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use common::{closed_base_url, user_json, MockService, Reply};
use searchlens_core::auth::{FileTokenStore, MemoryTokenStore, TokenStore};
use searchlens_core::models::{Credential, RegisterRequest};
use searchlens_core::{ApiClient, ApiError, AuthGateway};

fn client(base_url: &str, store: Arc<dyn TokenStore>) -> ApiClient {
    ApiClient::new(base_url, store, None).unwrap()
}

#[tokio::test]
async fn test_requests_without_token_are_unauthenticated() {
    let mock = MockService::builder().start().await;
    let api = client(&mock.base_url, Arc::new(MemoryTokenStore::new()));

    api.get("ping").await.unwrap();
    api.post("ping", &json!({"a": 1})).await.unwrap();

    for seen in mock.seen() {
        assert_eq!(seen.authorization, None);
        assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    }
}

#[tokio::test]
async fn test_stored_token_is_attached_to_every_request() {
    let mock = MockService::builder().start().await;
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
    let api = client(&mock.base_url, store.clone());

    api.get("ping").await.unwrap();
    store.set("T1");
    api.get("ping").await.unwrap();
    api.post("ping", &json!({})).await.unwrap();
    store.set("T2");
    api.get("ping").await.unwrap();
    store.clear();
    api.get("ping").await.unwrap();

    let auth: Vec<Option<String>> = mock.seen().into_iter().map(|r| r.authorization).collect();
    assert_eq!(
        auth,
        vec![
            None,
            Some("Bearer T1".to_string()),
            Some("Bearer T1".to_string()),
            Some("Bearer T2".to_string()),
            None,
        ]
    );
}

#[tokio::test]
async fn test_non_success_status_becomes_api_error() {
    let mock = MockService::builder().start().await;
    let api = client(&mock.base_url, Arc::new(MemoryTokenStore::new()));

    let err = api.get("missing").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref body) if body == "no such endpoint"));
    assert!(!err.is_transport());
    // No retries
    assert_eq!(mock.seen().len(), 1);
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let api = client(&closed_base_url().await, Arc::new(MemoryTokenStore::new()));
    let err = api.get("ping").await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_gateway_login_commits_token() {
    let mock = MockService::builder()
        .login(Reply::Json(json!({"access_token": "T1", "refresh_token": "R1"})))
        .start()
        .await;
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
    let gateway = AuthGateway::new(client(&mock.base_url, store.clone()));

    let response = gateway.login(&Credential::new("u@x.com", "pw")).await.unwrap();
    assert_eq!(response.access_token, "T1");
    assert_eq!(response.refresh_token.as_deref(), Some("R1"));
    assert!(response.user.is_none());
    assert_eq!(store.get().as_deref(), Some("T1"));

    let seen = mock.seen();
    assert_eq!(seen[0].path, "/login");
    assert_eq!(seen[0].body, json!({"email": "u@x.com", "password": "pw"}));
}

#[tokio::test]
async fn test_gateway_login_without_token_leaves_store() {
    let mock = MockService::builder()
        .login(Reply::Json(json!({"user": user_json("1", "u@x.com", "U", "X")})))
        .start()
        .await;
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::with_token("old"));
    let gateway = AuthGateway::new(client(&mock.base_url, store.clone()));

    let response = gateway.login(&Credential::new("u@x.com", "pw")).await.unwrap();
    assert_eq!(response.token(), None);
    assert_eq!(store.get().as_deref(), Some("old"));
}

#[tokio::test]
async fn test_gateway_login_failure_leaves_store() {
    let mock = MockService::builder().start().await;
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
    let gateway = AuthGateway::new(client(&mock.base_url, store.clone()));

    let err = gateway
        .login(&Credential::new("u@x.com", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert_eq!(store.get(), None);
}

#[tokio::test]
async fn test_gateway_register_does_not_touch_store() {
    let mock = MockService::builder()
        .register(Reply::Json(json!({"id": "42", "access_token": "not-for-us"})))
        .start()
        .await;
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
    let gateway = AuthGateway::new(client(&mock.base_url, store.clone()));

    let request = RegisterRequest::new("a@b.com", "p", "A", "B", None);
    let body = gateway.register(&request).await.unwrap();
    assert_eq!(body["id"], "42");
    assert_eq!(store.get(), None);
    assert_eq!(mock.seen_paths(), vec!["/register"]);
    assert_eq!(mock.seen()[0].body["app_name"], "DefaultApp");
}

#[tokio::test]
async fn test_gateway_register_plain_text_body() {
    let mock = MockService::builder()
        .register(Reply::Text("Created"))
        .start()
        .await;
    let gateway = AuthGateway::new(client(&mock.base_url, Arc::new(MemoryTokenStore::new())));

    let request = RegisterRequest::new("a@b.com", "p", "A", "B", Some("Dash"));
    let body = gateway.register(&request).await.unwrap();
    assert_eq!(body, json!("Created"));
}

#[tokio::test]
async fn test_gateway_register_conflict() {
    let mock = MockService::builder()
        .register(Reply::Status(StatusCode::CONFLICT, "email already registered"))
        .start()
        .await;
    let gateway = AuthGateway::new(client(&mock.base_url, Arc::new(MemoryTokenStore::new())));

    let request = RegisterRequest::new("a@b.com", "p", "A", "B", None);
    let err = gateway.register(&request).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn test_file_store_token_attached_after_reload() {
    let mock = MockService::builder()
        .login(Reply::Json(json!({"access_token": "persisted"})))
        .start()
        .await;
    let dir = tempfile::tempdir().unwrap();

    {
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(dir.path().to_path_buf()));
        let gateway = AuthGateway::new(client(&mock.base_url, store));
        gateway.login(&Credential::new("u@x.com", "pw")).await.unwrap();
    }

    let reloaded: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(dir.path().to_path_buf()));
    client(&mock.base_url, reloaded).get("ping").await.unwrap();

    let last = mock.seen().pop().unwrap();
    assert_eq!(last.authorization.as_deref(), Some("Bearer persisted"));
}
