//! Explicit session context: the bearer token and who it belongs to.
//!
//! A session starts on login/signup ([`Session::begin`]) and ends on logout
//! or on any 401 ([`Session::end`]). It is restored from storage at startup.

use crate::api::{ApiClient, AuthData};
use crate::config::ApiConfig;
use crate::storage::{StorageError, storage_clear, storage_get, storage_set};
use serde::{Deserialize, Serialize};

const TOKEN_KEY: &str = "token";
const PROFILE_KEY: &str = "profile";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionStore {
    namespace: String,
}

impl SessionStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new("session")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    user: Option<UserProfile>,
}

impl Session {
    pub fn restore(store: &SessionStore) -> Self {
        let token = storage_get(store.namespace(), TOKEN_KEY)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        let user = token.as_ref().and_then(|_| {
            storage_get(store.namespace(), PROFILE_KEY)
                .and_then(|raw| serde_json::from_str::<UserProfile>(&raw).ok())
        });
        Self { token, user }
    }

    /// In-memory session for a fresh login, not yet persisted.
    pub fn from_auth(auth: AuthData) -> Self {
        Self {
            token: Some(auth.token),
            user: Some(UserProfile {
                name: auth.name,
                email: auth.email,
            }),
        }
    }

    /// Starts a session and persists it so it survives a restart.
    pub fn begin(store: &SessionStore, auth: AuthData) -> Result<Self, StorageError> {
        let session = Self::from_auth(auth);
        session.persist(store)?;
        if let Some(user) = &session.user {
            tracing::info!(email = %user.email, "session started");
        }
        Ok(session)
    }

    fn persist(&self, store: &SessionStore) -> Result<(), StorageError> {
        let Some(token) = &self.token else {
            return Ok(());
        };
        storage_set(store.namespace(), TOKEN_KEY, token)?;
        if let Some(user) = &self.user {
            match serde_json::to_string(user) {
                Ok(raw) => storage_set(store.namespace(), PROFILE_KEY, &raw)?,
                Err(err) => tracing::warn!(%err, "failed to encode user profile"),
            }
        }
        Ok(())
    }

    /// Drops the token in memory and in storage. Storage failures are logged;
    /// the in-memory session is cleared regardless.
    pub fn end(&mut self, store: &SessionStore) {
        if let Err(err) = storage_clear(store.namespace()) {
            tracing::error!(%err, "failed to clear stored session");
        }
        self.token = None;
        self.user = None;
        tracing::info!("session ended");
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn client(&self, config: &ApiConfig) -> ApiClient {
        ApiClient::new(config.clone()).with_token(self.token.clone())
    }
}
