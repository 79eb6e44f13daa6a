//! Session store: who is signed in, and the transitions between states.

mod state;

pub(crate) use state::SessionCell;
pub use state::{Session, SessionEvent};

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::{
    api::AccountApi,
    client::ClientInner,
    error::{Error, Result},
    models::{Credentials, PasswordChange, ProfileUpdate, Registration, User},
    notify::Notice,
    validation,
};

/// Single source of truth for the signed-in identity.
///
/// Obtained from [`StorefrontClient::session`](crate::StorefrontClient::session);
/// every handle shares the same state.
#[derive(Clone)]
pub struct SessionStore {
    client: Arc<ClientInner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.client.session)
            .finish()
    }
}

impl SessionStore {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    fn accounts(&self) -> AccountApi {
        AccountApi::new(self.client.clone())
    }

    /// Sign in. On failure nothing is stored and the session stays as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let result = match self.accounts().login(credentials).await {
            Ok(payload) => self.client.session.establish(payload),
            Err(e) => Err(e),
        };

        match result {
            Ok(session) => {
                self.client.notify(Notice::success("Login successful!"));
                Ok(session)
            }
            Err(e) => {
                log::debug!("login failed: {e}");
                self.client
                    .notify(Notice::error(e.user_message("Login failed")));
                Err(e)
            }
        }
    }

    /// Create an account and sign in with it.
    ///
    /// A password mismatch is rejected before any request. Server-side
    /// validation failures are reported with their raw payload.
    pub async fn register(&self, registration: &Registration) -> Result<Session> {
        if let Err(e) = validation::registration(registration) {
            self.client.notify(Notice::error(e.to_string()));
            return Err(e);
        }

        let result = match self.accounts().register(registration).await {
            Ok(payload) => self.client.session.establish(payload),
            Err(e) => Err(e),
        };

        match result {
            Ok(session) => {
                self.client
                    .notify(Notice::success("Registration successful!"));
                Ok(session)
            }
            Err(e) => {
                log::debug!("registration failed: {e}");
                let message = e
                    .raw_payload()
                    .unwrap_or_else(|| "Registration failed".to_owned());
                self.client.notify(Notice::error(message));
                Err(e)
            }
        }
    }

    /// Sign out. The server is told to drop the refresh token if one is
    /// stored; whatever happens there, local state is cleared.
    pub async fn logout(&self) {
        if let Some(refresh) = self.client.session.refresh_token() {
            if let Err(e) = self.accounts().logout(&refresh).await {
                log::warn!("logout request failed: {e}");
            }
        }

        self.client.session.teardown();
        self.client
            .notify(Notice::success("Logged out successfully!"));
    }

    /// Replace the stored user after the server already accepted a profile change.
    pub fn update_session(&self, user: User) -> Result<()> {
        self.client.session.replace_user(user)
    }

    /// Synchronous snapshot for gating decisions.
    pub fn get_session(&self) -> Session {
        self.client.session.current()
    }

    /// Watch session snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.client.session.subscribe()
    }

    /// Receive lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.client.session.events()
    }

    /// Fetch the profile from the service and store it.
    pub async fn refresh_profile(&self) -> Result<User> {
        self.client.require_auth()?;
        let user = self.accounts().profile().await?;
        self.update_session(user.clone())?;
        Ok(user)
    }

    /// Edit the profile. The local record changes only after the server accepts.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.client.require_auth()?;
        if update.is_empty() {
            return Err(Error::InvalidArgument("no profile fields to update".into()));
        }
        let user = self.accounts().update_profile(update).await?;
        self.update_session(user.clone())?;
        Ok(user)
    }

    /// Change the account password.
    pub async fn change_password(&self, change: &PasswordChange) -> Result<()> {
        self.client.require_auth()?;
        if change.new_password.is_empty() {
            return Err(Error::validation("New password is required"));
        }
        self.accounts().change_password(change).await
    }
}
