//! Authorized request client for the searchlens API.
//!
//! Every outgoing request goes through `ApiClient::send`, which reads the
//! token store at dispatch time and decorates the request with the bearer
//! token and a JSON content type.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::auth::TokenStore;

use super::ApiError;

/// API client bound to one base URL and one token store.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Create a new API client. `timeout` of `None` leaves requests unbounded.
    pub fn new(
        base_url: &str,
        store: Arc<dyn TokenStore>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Headers attached to every request, built from the store's current token
    fn request_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.store.get() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Dispatch a request. The single path every outgoing call takes.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        let headers = self.request_headers()?;
        debug!(
            %method,
            url = %url,
            authorized = headers.contains_key(header::AUTHORIZATION),
            "Sending request"
        );

        let mut request = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        Self::check_response(response).await
    }

    pub async fn get(&self, path: &str) -> Result<Response, ApiError> {
        self.send::<()>(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        self.send(Method::POST, path, Some(body)).await
    }

    /// POST and parse the success body as `T`
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.post(path, body).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
