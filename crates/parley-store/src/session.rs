//! Process-wide session state.
//!
//! Written only by the auth and profile use-cases (sign in, sign out,
//! restore, profile update); read by every repository call. Readers must
//! cope with the session being absent and report `Unauthorized`.

use std::sync::Arc;

use tokio::sync::watch;

use parley_shared::error::{ApiError, ApiResult};
use parley_shared::models::User;
use parley_shared::types::UserId;

/// Bearer token plus the signed-in user, once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: Option<User>,
}

/// Cloneable, observable handle to the current session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// The bearer token, or `Unauthorized` when signed out.
    pub fn token(&self) -> ApiResult<String> {
        self.tx
            .borrow()
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or_else(ApiError::unauthorized)
    }

    pub fn current_user(&self) -> Option<User> {
        self.tx.borrow().as_ref().and_then(|s| s.user.clone())
    }

    pub fn current_user_id(&self) -> Option<UserId> {
        self.tx
            .borrow()
            .as_ref()
            .and_then(|s| s.user.as_ref().map(|u| u.id))
    }

    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn sign_in(&self, token: impl Into<String>, user: Option<User>) {
        let token = token.into();
        self.tx.send_replace(Some(Session { token, user }));
        tracing::info!("session started");
    }

    /// Replace the user snapshot. Ignored when signed out.
    pub fn update_user(&self, user: User) {
        self.tx.send_if_modified(|session| match session {
            Some(s) if s.user.as_ref() != Some(&user) => {
                s.user = Some(user);
                true
            }
            _ => false,
        });
    }

    /// Drop the token locally. The server-side session is left alone.
    pub fn sign_out(&self) {
        if self.tx.send_replace(None).is_some() {
            tracing::info!("session ended");
        }
    }

    /// Watch for sign-in, sign-out and profile changes.
    pub fn observe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
