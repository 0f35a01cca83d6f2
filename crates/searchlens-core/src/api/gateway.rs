use serde_json::Value;
use tracing::{debug, info};

use crate::models::{Credential, LoginResponse, RegisterRequest};

use super::{ApiClient, ApiError};

const LOGIN_PATH: &str = "login";
const REGISTER_PATH: &str = "register";

/// Normalized outcome of a login call
pub type AuthResult = Result<LoginResponse, ApiError>;

/// Stateless wrappers around the service's two auth endpoints.
#[derive(Clone)]
pub struct AuthGateway {
    api: ApiClient,
}

impl AuthGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Exchange a credential for a token.
    ///
    /// A non-empty `access_token` in the response is committed to the token
    /// store before this returns. The full response is handed back whether or
    /// not it carried a user profile.
    pub async fn login(&self, credential: &Credential) -> AuthResult {
        let response: LoginResponse = self.api.post_json(LOGIN_PATH, credential).await?;

        if let Some(token) = response.token() {
            self.api.store().set(token);
            info!(email = %credential.email, "Login accepted, token stored");
        } else {
            debug!(email = %credential.email, "Login response carried no token");
        }

        Ok(response)
    }

    /// Create an account. Does not touch the token store and does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Value, ApiError> {
        let response = self.api.post(REGISTER_PATH, request).await?;
        let text = response.text().await?;
        info!(email = %request.email, app = %request.app_name, "Registration accepted");
        Ok(Self::opaque_body(&text))
    }

    /// Registration replies are not typed: empty becomes null, non-JSON a string
    fn opaque_body(text: &str) -> Value {
        if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        }
    }
}
