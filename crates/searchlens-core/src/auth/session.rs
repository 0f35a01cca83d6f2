//! In-memory session state machine.
//!
//! `SessionManager` turns login/register/logout calls into session state:
//! the held `UserProfile` (memory only) and a loading flag. The bearer token
//! itself lives in the `TokenStore` and is written by the gateway.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::api::{ApiError, AuthGateway};
use crate::models::{Credential, RegisterRequest, UserProfile};

/// What the front end observes about the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<UserProfile>,
    pub is_loading: bool,
}

/// Token and profile have separate lifecycles: the token survives a restart,
/// the profile does not. `TokenOnly` is that in-between state and is left
/// for the front end to reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    TokenOnly,
    Authenticated,
}

/// Holds `is_loading` for as long as it lives.
/// Dropping it on any exit path (including a cancelled future) releases the flag.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SessionSnapshot>,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(state: &'a watch::Sender<SessionSnapshot>) -> Self {
        state.send_modify(|s| s.is_loading = true);
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.is_loading = false);
    }
}

pub struct SessionManager {
    gateway: AuthGateway,
    app_name: Option<String>,
    current: watch::Sender<SessionSnapshot>,
    /// Serializes login/register so overlapping calls cannot interleave
    op_lock: Mutex<()>,
    /// Bumped by logout; a login or register that started under an older epoch is discarded
    epoch: AtomicU64,
}

impl SessionManager {
    pub(crate) fn new(gateway: AuthGateway, app_name: Option<String>) -> Self {
        let (current, _) = watch::channel(SessionSnapshot::default());
        Self {
            gateway,
            app_name,
            current,
            op_lock: Mutex::new(()),
            epoch: AtomicU64::new(0),
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn user(&self) -> Option<UserProfile> {
        self.current.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.current.borrow().is_loading
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.current.borrow().clone()
    }

    /// Receiver that is notified on every user or loading change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.current.subscribe()
    }

    pub fn has_token(&self) -> bool {
        self.gateway.api().store().get().is_some()
    }

    pub fn state(&self) -> SessionState {
        match (self.current.borrow().user.is_some(), self.has_token()) {
            (true, _) => SessionState::Authenticated,
            (false, true) => SessionState::TokenOnly,
            (false, false) => SessionState::Anonymous,
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Log in with an email and password.
    ///
    /// The profile is only held when the service returns one; otherwise the
    /// session stays anonymous even though a token may now be stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::acquire(&self.current);
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.authenticate(email, password, epoch).await
    }

    /// Create an account, then log in with the same credentials.
    /// A failed registration returns before any login is attempted.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        app_name: Option<&str>,
    ) -> Result<(), ApiError> {
        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::acquire(&self.current);
        let epoch = self.epoch.load(Ordering::SeqCst);

        let app_name = app_name.or(self.app_name.as_deref());
        let request = RegisterRequest::new(email, password, first_name, last_name, app_name);
        self.gateway.register(&request).await?;

        if self.is_stale(epoch) {
            debug!("Logged out while registration was in flight, skipping login");
            return Ok(());
        }

        debug!(email = %email, "Registered, logging in");
        self.authenticate(email, password, epoch).await
    }

    /// Drop the token and the profile. Always succeeds.
    pub fn logout(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.gateway.api().store().clear();
        self.current.send_modify(|s| s.user = None);
        info!("Logged out");
    }

    /// True once a logout has happened since `epoch` was read
    fn is_stale(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) != epoch
    }

    /// Log in and hold the returned profile, unless a logout happened after
    /// the calling operation read `epoch`.
    async fn authenticate(&self, email: &str, password: &str, epoch: u64) -> Result<(), ApiError> {
        let credential = Credential::new(email, password);
        let response = self.gateway.login(&credential).await?;

        if self.is_stale(epoch) {
            debug!("Logged out while login was in flight, discarding result");
            self.gateway.api().store().clear();
            return Ok(());
        }

        let has_token = response.token().is_some();
        match (response.user, has_token) {
            (Some(user), true) => {
                info!(user_id = %user.id, "Session authenticated");
                self.current.send_modify(|s| s.user = Some(user));
            }
            (Some(_), false) => {
                warn!("Login returned a profile without a token, ignoring profile");
            }
            (None, _) => {
                debug!("Login returned no profile, session stays anonymous");
            }
        }
        Ok(())
    }
}
