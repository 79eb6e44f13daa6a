//! Application shell: gates each command behind its route and turns session
//! invalidation into a navigation to login.

use std::future::Future;

use anyhow::Result;
use storefront::routes::redirect_for;
use storefront::{
    navigate, Navigation, Notice, Notifier, Route, SessionEvent, StorefrontClient,
};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::output::{print_navigation, ConsoleNotifier};

/// An error the user has already been shown.
#[derive(Debug, thiserror::Error)]
#[error("already reported")]
pub struct Reported;

pub struct Shell {
    client: StorefrontClient,
    events: broadcast::Receiver<SessionEvent>,
}

/// What happened to a command run through the shell.
#[derive(Debug, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    /// The route guard sent the user elsewhere before anything ran.
    Redirected(Route),
    /// The service rejected the stored credential.
    Expired,
}

impl<T> Outcome<T> {
    /// The command's result, if it ran to completion.
    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            _ => None,
        }
    }
}

impl Shell {
    pub fn new(client: StorefrontClient) -> Self {
        let events = client.events();
        Self { client, events }
    }

    pub fn client(&self) -> &StorefrontClient {
        &self.client
    }

    /// Run `command` as a visit to `route`.
    ///
    /// Guards run first against the current session. A 401 anywhere in the
    /// command ends in [`Outcome::Expired`] and never surfaces as an error.
    pub async fn visit<T, F, Fut>(&mut self, route: Route, command: F) -> Result<Outcome<T>>
    where
        F: FnOnce(StorefrontClient) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Navigation::Redirect(target) =
            navigate(&route.path(), &self.client.current_session())
        {
            tracing::debug!("{} redirected to {}", route, target);
            if target == Route::Login {
                ConsoleNotifier.notify(Notice::info("Please log in to continue"));
            }
            print_navigation(target);
            return Ok(Outcome::Redirected(target));
        }

        let result = command(self.client.clone()).await;

        let expired = self.take_redirect() == Some(Route::Login);
        match result {
            Err(e) if expired || is_unauthorized(&e) => {
                tracing::debug!("session expired during {}: {e:#}", route);
                self.expire();
                Ok(Outcome::Expired)
            }
            Ok(_) if expired => {
                self.expire();
                Ok(Outcome::Expired)
            }
            Ok(value) => Ok(Outcome::Done(value)),
            Err(e) => Err(e),
        }
    }

    /// Drain pending session events; the last redirect wins.
    fn take_redirect(&mut self) -> Option<Route> {
        let mut redirect = None;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if let Some(route) = redirect_for(&event) {
                        redirect = Some(route);
                    }
                }
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        redirect
    }

    fn expire(&self) {
        ConsoleNotifier.notify(Notice::warning("Session expired, please log in"));
        print_navigation(Route::Login);
    }
}

fn is_unauthorized(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<storefront::Error>()
        .is_some_and(|e| matches!(e, storefront::Error::Unauthorized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storefront::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};
    use storefront::{MemoryStorage, MemoryNotifier};

    fn client(signed_in: bool) -> StorefrontClient {
        let storage = if signed_in {
            MemoryStorage::with_entries([
                (ACCESS_TOKEN_KEY, "A"),
                (REFRESH_TOKEN_KEY, "R"),
                (USER_KEY, r#"{"id": 1, "username": "alice"}"#),
            ])
        } else {
            MemoryStorage::new()
        };
        StorefrontClient::builder()
            .storage(Arc::new(storage))
            .notifier(Arc::new(MemoryNotifier::new()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_guard_redirects_before_running() {
        let mut shell = Shell::new(client(false));
        let mut ran = false;

        let outcome = shell
            .visit(Route::Cart, |_| {
                ran = true;
                async { Ok::<_, anyhow::Error>(()) }
            })
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Redirected(Route::Login));
        assert!(!ran);
    }

    #[tokio::test]
    async fn test_public_route_runs() {
        let mut shell = Shell::new(client(false));
        let outcome = shell
            .visit(Route::Home, |_| async { Ok::<_, anyhow::Error>(5) })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Done(5));
    }

    #[tokio::test]
    async fn test_unauthorized_becomes_expired() {
        let mut shell = Shell::new(client(true));
        let outcome: Outcome<()> = shell
            .visit(Route::Orders, |_| async {
                Err::<(), _>(anyhow::Error::new(storefront::Error::Unauthorized))
            })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Expired);
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        let mut shell = Shell::new(client(true));
        let result: Result<Outcome<()>> = shell
            .visit(Route::Orders, |_| async {
                Err::<(), _>(anyhow::Error::new(storefront::Error::validation("nope")))
            })
            .await;
        assert!(result.is_err());
    }
}
