//! Application context wiring the token store, API client and session.
//!
//! `AuthContext` is built once at startup and shared by reference. It is the
//! only way to obtain a `SessionManager`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::api::{ApiClient, AuthGateway};
use crate::auth::{FileTokenStore, KeyringTokenStore, SessionManager, TokenStore};
use crate::cache::CacheManager;
use crate::config::{Config, TokenStorage};

pub struct AuthContext {
    config: Config,
    store: Arc<dyn TokenStore>,
    api: ApiClient,
    session: SessionManager,
    cache: CacheManager,
}

impl AuthContext {
    /// Build the context with the token backend named in `config`
    pub fn new(config: Config) -> Result<Self> {
        let origin = config.origin()?;
        let data_dir = config.data_dir()?;

        let store: Arc<dyn TokenStore> = match config.token_storage {
            TokenStorage::File => Arc::new(FileTokenStore::new(data_dir.clone())),
            TokenStorage::Keyring => Arc::new(KeyringTokenStore::new(&origin)),
        };
        debug!(%origin, storage = ?config.token_storage, ?data_dir, "Token store configured");

        Self::with_store(config, store, data_dir)
    }

    /// Build the context around an existing token store
    pub fn with_store(
        config: Config,
        store: Arc<dyn TokenStore>,
        data_dir: PathBuf,
    ) -> Result<Self> {
        let api = ApiClient::new(config.base_url(), store.clone(), config.request_timeout())
            .context("Failed to build HTTP client")?;
        let session = SessionManager::new(AuthGateway::new(api.clone()), config.app_name.clone());

        Ok(Self {
            config,
            store,
            api,
            session,
            cache: CacheManager::new(data_dir),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Client for any further authorized request the front end makes
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }
}
