//! Session lifecycle: restore, login, register, logout and expiry.
//!
//! [`SessionStore`] is the only writer of the persisted session fields. It
//! also coordinates the reaction to a rejected token: whoever sees an
//! [`ApiError::Auth`] hands it to [`SessionStore::observe`], which clears the
//! storage and sends the user back to [`LOGIN_ROUTE`].
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use api_types::{
    auth::{AuthResponse, Credentials, Registration},
    user::UserLookup,
};
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::{
    api::{ApiClient, ApiError},
    storage::{SessionStorage, StorageError, keys},
    validation::{RegisterForm, ValidationError},
};

/// Unauthenticated entry point.
pub const LOGIN_ROUTE: &str = "/";

const LOGIN_PATH: [&str; 3] = ["api", "auth", "login"];
const REGISTER_PATH: [&str; 3] = ["api", "auth", "register"];

/// Moves the user interface to another route.
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: &str);
}

/// Navigator for front-ends without routes: it only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, route: &str) {
        tracing::info!(route, "redirect requested");
    }
}

/// Read-only projection of the authenticated user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated(SessionUser),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("user id lookup returned no id")]
    MissingUserId,
}

impl SessionError {
    /// Message meant for the login/register form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::Api { status, .. }) if *status == StatusCode::NOT_FOUND => {
                "Account not found. Check the email or create a new account.".to_string()
            }
            Self::Api(ApiError::Auth { .. }) => {
                "Wrong email or password. Try again.".to_string()
            }
            Self::Api(ApiError::Api { status, .. }) if *status == StatusCode::FORBIDDEN => {
                "Wrong email or password. Try again.".to_string()
            }
            Self::Api(ApiError::Network(_)) => {
                "Server unreachable. Try again later.".to_string()
            }
            Self::Api(err) => err
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| "Login failed. Try again.".to_string()),
            Self::Validation(err) => err.to_string(),
            Self::Storage(_) | Self::MissingUserId => "Login failed. Try again.".to_string(),
        }
    }
}

pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<SessionState>,
}

impl SessionStore {
    pub fn new(
        api: ApiClient,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            storage,
            navigator,
            state: Mutex::new(SessionState::Unauthenticated),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SessionState) {
        *self.lock_state() = state;
    }

    pub fn state(&self) -> SessionState {
        self.lock_state().clone()
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        match &*self.lock_state() {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.lock_state(), SessionState::Authenticated(_))
    }

    /// Advisory only: nothing prevents a second login while this is `true`.
    pub fn is_loading(&self) -> bool {
        matches!(*self.lock_state(), SessionState::Authenticating)
    }

    fn stored(&self, key: &str) -> Option<String> {
        self.storage.get(key).filter(|value| !value.trim().is_empty())
    }

    /// Rebuilds the session from durable storage, if a complete one is there.
    ///
    /// A missing user id is resolved again by email. A rejected token expires
    /// the session; any other failure leaves the storage untouched so the
    /// next start can retry.
    pub async fn restore(&self) -> SessionState {
        let (Some(_token), Some(email), Some(name)) = (
            self.stored(keys::TOKEN),
            self.stored(keys::USER_EMAIL),
            self.stored(keys::USER_NAME),
        ) else {
            tracing::debug!("no complete session in storage");
            self.set_state(SessionState::Unauthenticated);
            return SessionState::Unauthenticated;
        };

        let id = match self.stored(keys::USER_ID) {
            Some(id) => id,
            None => {
                tracing::info!(%email, "stored session has no user id, resolving it");
                self.set_state(SessionState::Authenticating);
                match self.resolve_and_store_id(&email).await {
                    Ok(id) => id,
                    Err(SessionError::Api(err)) if err.is_auth() => {
                        tracing::warn!("stored token rejected while restoring session");
                        self.expire();
                        return SessionState::Unauthenticated;
                    }
                    Err(err) => {
                        tracing::warn!("failed to restore session: {err}");
                        self.set_state(SessionState::Unauthenticated);
                        return SessionState::Unauthenticated;
                    }
                }
            }
        };

        let state = SessionState::Authenticated(SessionUser { id, name, email });
        tracing::debug!("session restored");
        self.set_state(state.clone());
        state
    }

    /// Signs in with email and password.
    ///
    /// On any failure the persisted fields are cleared and the error is
    /// returned to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, SessionError> {
        tracing::info!(email, "logging in");
        self.set_state(SessionState::Authenticating);

        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let result = self.authenticate(&LOGIN_PATH, &credentials).await;
        self.finish(result)
    }

    /// Creates an account and signs it in.
    pub async fn register(&self, form: &RegisterForm) -> Result<SessionUser, SessionError> {
        let registration: Registration = form.validate()?;

        tracing::info!(email = %registration.email, "registering account");
        self.set_state(SessionState::Authenticating);

        let result = self.authenticate(&REGISTER_PATH, &registration).await;
        self.finish(result)
    }

    async fn authenticate<T>(&self, path: &[&str], body: &T) -> Result<SessionUser, SessionError>
    where
        T: Serialize + ?Sized,
    {
        let auth: AuthResponse = self.api.post(path, body).await?;

        self.storage.set(keys::TOKEN, &auth.token)?;
        self.storage.set(keys::USER_EMAIL, &auth.email)?;
        self.storage.set(keys::USER_NAME, &auth.name)?;

        // The auth response carries no id; it is looked up by email.
        let id = self.resolve_and_store_id(&auth.email).await?;

        Ok(SessionUser {
            id,
            name: auth.name,
            email: auth.email,
        })
    }

    async fn resolve_and_store_id(&self, email: &str) -> Result<String, SessionError> {
        let lookup: UserLookup = self.api.get(&["usuarios", "email", email]).await?;
        let id = lookup.into_id().ok_or(SessionError::MissingUserId)?;
        self.storage.set(keys::USER_ID, &id)?;
        Ok(id)
    }

    fn finish(
        &self,
        result: Result<SessionUser, SessionError>,
    ) -> Result<SessionUser, SessionError> {
        match result {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "session started");
                self.set_state(SessionState::Authenticated(user.clone()));
                Ok(user)
            }
            Err(err) => {
                tracing::warn!("authentication failed: {err}");
                self.clear_storage();
                self.set_state(SessionState::Unauthenticated);
                Err(err)
            }
        }
    }

    fn clear_storage(&self) {
        if let Err(err) = self.storage.clear() {
            tracing::error!("failed to clear session storage: {err}");
        }
    }

    /// Ends the session locally. No network call is made.
    ///
    /// The state only changes once storage is cleared, so a failed logout
    /// leaves the session as the next start would restore it.
    pub fn logout(&self) -> Result<(), StorageError> {
        tracing::info!("logging out");
        self.storage.clear()?;
        self.set_state(SessionState::Unauthenticated);
        Ok(())
    }

    /// Drops a session the backend no longer accepts and redirects to login.
    pub fn expire(&self) {
        tracing::warn!("token invalid or expired, redirecting to login");
        self.clear_storage();
        self.set_state(SessionState::Unauthenticated);
        self.navigator.redirect(LOGIN_ROUTE);
    }

    /// Routes an API failure through the session: only auth failures matter.
    pub fn observe(&self, err: &ApiError) {
        if err.is_auth() {
            self.expire();
        }
    }
}
