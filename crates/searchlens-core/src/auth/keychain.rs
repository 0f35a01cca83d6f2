use keyring::Entry;
use tracing::{debug, warn};

use super::TokenStore;

const SERVICE_NAME: &str = "searchlens";

/// Token kept in the OS keychain, one entry per API origin.
pub struct KeyringTokenStore {
    account: String,
}

impl KeyringTokenStore {
    pub fn new(origin: &str) -> Self {
        Self {
            account: origin.to_string(),
        }
    }

    /// Keychain account the token is filed under
    pub fn account(&self) -> &str {
        &self.account
    }

    fn entry(&self) -> Option<Entry> {
        match Entry::new(SERVICE_NAME, &self.account) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Failed to create keyring entry");
                None
            }
        }
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> Option<String> {
        let entry = self.entry()?;
        match entry.get_password() {
            Ok(token) if !token.is_empty() => Some(token),
            Ok(_) | Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read token from keychain");
                None
            }
        }
    }

    fn set(&self, token: &str) {
        if let Some(entry) = self.entry() {
            match entry.set_password(token) {
                Ok(()) => debug!(account = %self.account, "Token stored in keychain"),
                Err(e) => warn!(error = %e, "Failed to store token in keychain"),
            }
        }
    }

    fn clear(&self) {
        if let Some(entry) = self.entry() {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => warn!(error = %e, "Failed to delete token from keychain"),
            }
        }
    }
}
