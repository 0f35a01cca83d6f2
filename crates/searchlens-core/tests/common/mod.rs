//! In-process stand-in for the remote auth service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};

use searchlens_core::auth::{MemoryTokenStore, TokenStore};
use searchlens_core::{AuthContext, Config};

pub const API_PREFIX: &str = "/api/v1";

/// How the mock answers one endpoint
#[derive(Clone, Debug)]
pub enum Reply {
    Json(Value),
    Text(&'static str),
    Status(StatusCode, &'static str),
    Delayed(Duration, Box<Reply>),
    /// Never answers
    Hang,
}

#[derive(Clone, Debug)]
pub struct SeenRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

struct MockState {
    login: HashMap<String, Reply>,
    default_login: Reply,
    register: Reply,
    seen: Mutex<Vec<SeenRequest>>,
}

pub struct MockService {
    pub base_url: String,
    state: Arc<MockState>,
}

pub struct MockBuilder {
    login: HashMap<String, Reply>,
    default_login: Reply,
    register: Reply,
}

impl MockBuilder {
    /// Reply for logins from one specific email
    pub fn login_for(mut self, email: &str, reply: Reply) -> Self {
        self.login.insert(email.to_string(), reply);
        self
    }

    pub fn login(mut self, reply: Reply) -> Self {
        self.default_login = reply;
        self
    }

    pub fn register(mut self, reply: Reply) -> Self {
        self.register = reply;
        self
    }

    pub async fn start(self) -> MockService {
        let state = Arc::new(MockState {
            login: self.login,
            default_login: self.default_login,
            register: self.register,
            seen: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockService {
            base_url: format!("http://{}{}", addr, API_PREFIX),
            state,
        }
    }
}

impl MockService {
    pub fn builder() -> MockBuilder {
        MockBuilder {
            login: HashMap::new(),
            default_login: Reply::Status(StatusCode::UNAUTHORIZED, "invalid credentials"),
            register: Reply::Json(json!({"id": "new"})),
        }
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }

    pub fn seen_paths(&self) -> Vec<String> {
        self.seen().into_iter().map(|r| r.path).collect()
    }

    pub fn config(&self) -> Config {
        Config {
            api_base_url: Some(self.base_url.clone()),
            ..Default::default()
        }
    }

    /// Context over an in-memory token store
    pub fn context(&self, data_dir: &Path) -> (AuthContext, Arc<dyn TokenStore>) {
        context_with(self.config(), data_dir)
    }
}

pub fn context_with(config: Config, data_dir: &Path) -> (AuthContext, Arc<dyn TokenStore>) {
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
    let ctx = AuthContext::with_store(config, store.clone(), data_dir.to_path_buf()).unwrap();
    (ctx, store)
}

/// Base URL of a port nothing listens on
pub async fn closed_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, API_PREFIX)
}

pub fn user_json(id: &str, email: &str, first: &str, last: &str) -> Value {
    json!({"id": id, "email": email, "first_name": first, "last_name": last})
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.seen.lock().unwrap().push(SeenRequest {
        method,
        path: path.clone(),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: body.clone(),
    });

    let reply = match path.as_str() {
        "/login" => {
            let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
            state
                .login
                .get(email)
                .cloned()
                .unwrap_or_else(|| state.default_login.clone())
        }
        "/register" => state.register.clone(),
        "/ping" => Reply::Json(json!({"ok": true})),
        _ => Reply::Status(StatusCode::NOT_FOUND, "no such endpoint"),
    };

    respond(reply).await
}

async fn respond(mut reply: Reply) -> Response {
    loop {
        match reply {
            Reply::Json(value) => {
                return (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "application/json")],
                    value.to_string(),
                )
                    .into_response()
            }
            Reply::Text(text) => return (StatusCode::OK, text).into_response(),
            Reply::Status(status, text) => return (status, text).into_response(),
            Reply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                return StatusCode::GATEWAY_TIMEOUT.into_response();
            }
        }
    }
}
