use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{bot_state_keys, BotConfig, TOKEN_KEY};
use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// Bearer credential persisted in local storage.
///
/// Logging out also drops the cached state of every known bot panel so the
/// next user starts from empty selections.
#[derive(Clone)]
pub struct SessionStore {
    store: Option<Arc<dyn KeyValueStore>>,
    bot_state_keys: Vec<String>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, bots: &[BotConfig]) -> Self {
        Self {
            store: Some(store),
            bot_state_keys: bot_state_keys(bots),
        }
    }

    /// A session with no backing store. Never authenticated.
    pub fn detached() -> Self {
        Self {
            store: None,
            bot_state_keys: Vec::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_auth_token().is_some_and(|t| !t.is_empty())
    }

    pub fn set_auth_token(&self, token: &str) -> Result<(), StorageError> {
        match &self.store {
            Some(store) => store.set(TOKEN_KEY, token),
            None => Ok(()),
        }
    }

    pub fn get_auth_token(&self) -> Option<String> {
        self.store.as_ref().and_then(|s| s.get(TOKEN_KEY))
    }

    /// Delete the token and every bot-state cache entry.
    ///
    /// Every key is attempted even if an earlier delete fails; the first
    /// failure is returned.
    pub fn remove_auth_token(&self) -> Result<(), StorageError> {
        let Some(store) = &self.store else {
            return Ok(());
        };

        let mut first_err = None;
        for key in std::iter::once(TOKEN_KEY).chain(self.bot_state_keys.iter().map(String::as_str)) {
            if let Err(e) = store.delete(key) {
                warn!("Failed to delete '{}' from local storage: {}", key, e);
                first_err.get_or_insert(e);
            }
        }
        info!("Session cleared");

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
