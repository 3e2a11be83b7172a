//! Session Holder
//!
//! Tracks the authenticated user and the bearer token for the views that
//! need them. The holder is constructed explicitly and passed by reference;
//! nothing here is global.
//!
//! ## Lifecycle
//!
//! ```text
//! Anonymous --login/register--> Authenticating --ok--> Authenticated
//!     ^                              |                      |
//!     +---------- failure -----------+------ logout --------+
//! ```
//!
//! On startup, [`Session::restore`] turns a stored token into a cached user,
//! discarding the token if the backend rejects it. That is the only
//! automatic recovery in the client.

mod store;

pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore};

use std::sync::Arc;
use thiserror::Error;

use crate::api::{ApiError, LoginCredentials, RegisterPayload, Role, StoreClient, User};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Errors surfaced by session operations
#[derive(Error, Debug)]
pub enum SessionError {
    /// The backend rejected the call
    #[error("{0}")]
    Api(#[from] ApiError),

    /// The token could not be persisted
    #[error("Failed to persist session token: {0}")]
    Store(#[from] StoreError),

    #[error("You must be logged in to view this page")]
    NotAuthenticated,

    #[error("This page requires the {required} role")]
    Forbidden { required: Role },
}

/// Current user plus bearer token, shared by every view
pub struct Session {
    client: StoreClient,
    tokens: Arc<dyn TokenStore>,
    user: Option<User>,
    state: SessionState,
}

impl Session {
    /// Create an anonymous session over the client's token store
    pub fn new(client: StoreClient) -> Self {
        let tokens = Arc::clone(client.tokens());
        Self {
            client,
            tokens,
            user: None,
            state: SessionState::Anonymous,
        }
    }

    pub fn client(&self) -> &StoreClient {
        &self.client
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The stored bearer token, if any
    pub fn token(&self) -> Option<String> {
        match self.tokens.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read auth token");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated && self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().map(User::is_admin).unwrap_or(false)
    }

    /// Guard for pages that need any logged-in user
    pub fn require_user(&self) -> Result<&User, SessionError> {
        match &self.user {
            Some(user) if self.state == SessionState::Authenticated => Ok(user),
            _ => Err(SessionError::NotAuthenticated),
        }
    }

    /// Guard for pages that need a specific role
    pub fn require_role(&self, role: Role) -> Result<&User, SessionError> {
        let user = self.require_user()?;
        if user.role == role {
            Ok(user)
        } else {
            Err(SessionError::Forbidden { required: role })
        }
    }

    /// Resolve a stored token into a cached user.
    ///
    /// Runs once at startup. A token the backend rejects is discarded and
    /// the session stays anonymous.
    pub async fn restore(&mut self) -> SessionState {
        if self.user.is_some() {
            return self.state;
        }

        if self.token().is_none() {
            self.state = SessionState::Anonymous;
            return self.state;
        }

        self.state = SessionState::Authenticating;
        match self.client.current_user().await {
            Ok(user) => {
                tracing::debug!(username = %user.username, "Restored session");
                self.user = Some(user);
                self.state = SessionState::Authenticated;
            }
            Err(e) => {
                tracing::warn!(error = %e, status = e.status, "Stored token rejected, discarding it");
                self.discard_token();
                self.user = None;
                self.state = SessionState::Anonymous;
            }
        }

        self.state
    }

    /// Exchange credentials for a token, persist it and cache the user.
    ///
    /// On failure the previous state, token and user are left in place.
    pub async fn login(&mut self, credentials: &LoginCredentials) -> Result<&User, SessionError> {
        let previous_state = self.state;
        let previous_token = self.token();
        self.state = SessionState::Authenticating;

        let token = match self.client.login(credentials).await {
            Ok(response) => response.token,
            Err(e) => {
                self.state = previous_state;
                return Err(e.into());
            }
        };

        if let Err(e) = self.tokens.save(&token) {
            self.state = previous_state;
            return Err(e.into());
        }

        match self.client.current_user().await {
            Ok(user) => {
                tracing::info!(username = %user.username, role = %user.role, "Logged in");
                self.state = SessionState::Authenticated;
                Ok(&*self.user.insert(user))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Fetching the new user failed, rolling back login");
                match previous_token {
                    Some(token) => {
                        if let Err(store_err) = self.tokens.save(&token) {
                            tracing::warn!(error = %store_err, "Failed to restore previous token");
                        }
                    }
                    None => self.discard_token(),
                }
                self.state = previous_state;
                Err(e.into())
            }
        }
    }

    /// Create an account. Does not log in.
    ///
    /// Field-level validation problems are joined into the error message.
    pub async fn register(&mut self, payload: &RegisterPayload) -> Result<Option<User>, SessionError> {
        let previous_state = self.state;
        self.state = SessionState::Authenticating;

        let result = self.client.register(payload).await;
        self.state = previous_state;

        match result {
            Ok(user) => {
                tracing::info!(username = %payload.username, "Registered account");
                Ok(user)
            }
            Err(e) => Err(SessionError::Api(e.with_validation_message(", "))),
        }
    }

    /// Forget the token and user. Always succeeds.
    pub fn logout(&mut self) {
        self.discard_token();
        if let Some(user) = self.user.take() {
            tracing::info!(username = %user.username, "Logged out");
        }
        self.state = SessionState::Anonymous;
    }

    fn discard_token(&self) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "Failed to clear auth token");
        }
    }
}
