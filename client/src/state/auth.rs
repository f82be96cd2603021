//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards, the HTTP client, and user-aware components. The
//! session (token + user) is persisted in `localStorage` so a reload keeps
//! the user signed in. Restoring happens after hydration; until then the
//! state reports `loading` so SSR and first client render agree.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;

use crate::net::api::{ApiClient, ApiError};
use crate::net::types::{AuthUser, Session};
use crate::util::storage;

/// `localStorage` key holding the serialized [`Session`].
pub const SESSION_STORAGE_KEY: &str = "aihangout_session";

/// Authentication state tracking the current user, token, and loading status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub token: Option<String>,
    pub loading: bool,
}

impl AuthState {
    pub fn from_session(session: Session) -> Self {
        Self { user: Some(session.user), token: Some(session.token), loading: false }
    }

    /// State after reading persisted storage; `None` means signed out.
    pub fn restored(session: Option<Session>) -> Self {
        session.map_or_else(Self::signed_out, Self::from_session)
    }

    pub fn signed_out() -> Self {
        Self { user: None, token: None, loading: false }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token().is_some()
    }
}

/// Reactive handle over [`AuthState`], shared through context.
#[derive(Clone, Copy)]
pub struct AuthStore {
    state: RwSignal<AuthState>,
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStore {
    pub fn new() -> Self {
        Self { state: RwSignal::new(AuthState { loading: true, ..AuthState::default() }) }
    }

    /// Load the persisted session. Call once after hydration.
    pub fn restore_persisted(&self) {
        let session = storage::load_json::<Session>(SESSION_STORAGE_KEY);
        self.state.set(AuthState::restored(session));
    }

    pub fn state(&self) -> RwSignal<AuthState> {
        self.state
    }

    /// Current state without subscribing; used from timers and callbacks.
    pub fn snapshot_untracked(&self) -> AuthState {
        self.state.try_get_untracked().unwrap_or_default()
    }

    pub fn token_untracked(&self) -> Option<String> {
        self.state.try_with_untracked(|s| s.token().map(str::to_owned)).flatten()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with(AuthState::is_authenticated)
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.state.with(|s| s.user.clone())
    }

    pub fn sign_in(&self, session: Session) {
        storage::save_json(SESSION_STORAGE_KEY, &session);
        self.state.set(AuthState::from_session(session));
    }

    pub fn sign_out(&self) {
        storage::remove(SESSION_STORAGE_KEY);
        let _ = self.state.try_set(AuthState::signed_out());
    }

    /// `POST /api/auth/login`, then persist the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthUser, ApiError> {
        let session = ApiClient::new(*self).login(username, password).await?;
        let user = session.user.clone();
        self.sign_in(session);
        Ok(user)
    }

    /// `POST /api/auth/register`, then persist the session.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        let session = ApiClient::new(*self).register(username, email, password).await?;
        let user = session.user.clone();
        self.sign_in(session);
        Ok(user)
    }
}
