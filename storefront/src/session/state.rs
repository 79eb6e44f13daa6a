//! Session snapshot and the shared cell behind the store and dispatcher.

use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{broadcast, watch};

use crate::error::{Error, Result};
use crate::models::{AuthPayload, User, UserId};
use crate::storage::{
    SessionStorage, SessionStorageExt, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_KEY,
};

const EVENT_CAPACITY: usize = 16;

/// Point-in-time view of who is signed in.
///
/// The authentication and admin flags are derived from the user record, so
/// they can never disagree with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    /// A session with nobody signed in.
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    /// A session for the given user.
    pub fn authenticated(user: User) -> Self {
        Self { user: Some(user) }
    }

    /// The signed-in user.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// ID of the signed-in user.
    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }

    /// True iff a user is present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// True iff a user is present and flagged as administrator.
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }
}

/// Lifecycle notifications published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Login or registration succeeded.
    Established { user_id: UserId },
    /// The stored profile was replaced.
    Updated,
    /// The user logged out.
    LoggedOut,
    /// The service rejected the credential; the session was torn down.
    Invalidated,
}

/// The access token a request is sent with, and the session instance it
/// belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Credential {
    pub generation: u64,
    pub access: Option<String>,
}

/// State shared by the session store and the request dispatcher.
pub(crate) struct SessionCell {
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<Session>,
    events: broadcast::Sender<SessionEvent>,
    credential: RwLock<Credential>,
    cart_count: AtomicU32,
}

impl std::fmt::Debug for SessionCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCell")
            .field("storage", &self.storage)
            .field("authenticated", &self.state.borrow().is_authenticated())
            .field("generation", &self.generation())
            .finish()
    }
}

impl SessionCell {
    /// Resolve the initial session from storage.
    pub fn rehydrate(storage: Arc<dyn SessionStorage>) -> Self {
        let (session, access) = match restore(storage.as_ref()) {
            Some((token, user)) => {
                log::info!("restored session for user {}", user.id);
                (Session::authenticated(user), Some(token))
            }
            None => (Session::anonymous(), None),
        };

        let (state, _) = watch::channel(session);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            storage,
            state,
            events,
            credential: RwLock::new(Credential {
                generation: 0,
                access,
            }),
            cart_count: AtomicU32::new(0),
        }
    }

    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn read_credential(&self) -> RwLockReadGuard<'_, Credential> {
        self.credential.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_credential(&self) -> RwLockWriteGuard<'_, Credential> {
        self.credential.write().unwrap_or_else(|e| e.into_inner())
    }

    /// The access token together with the session instance it belongs to.
    pub fn credential(&self) -> Credential {
        self.read_credential().clone()
    }

    /// Identifies the current session instance; advances on every establish and teardown.
    pub fn generation(&self) -> u64 {
        self.read_credential().generation
    }

    pub fn access_token(&self) -> Option<String> {
        self.read_credential().access.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read_key(REFRESH_TOKEN_KEY)
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                log::warn!("failed to read {key}: {e}");
                None
            }
        }
    }

    /// Persist a fresh credential pair and user, then publish.
    pub fn establish(&self, payload: AuthPayload) -> Result<Session> {
        let AuthPayload { user, tokens } = payload;
        let user_json = serde_json::to_string(&user)?;

        let mut credential = self.write_credential();
        let written = self.storage.set_many(&[
            (ACCESS_TOKEN_KEY, tokens.access.as_str()),
            (REFRESH_TOKEN_KEY, tokens.refresh.as_str()),
            (USER_KEY, user_json.as_str()),
        ]);
        if let Err(e) = written {
            if let Err(cleanup) = self.storage.remove_many(&SESSION_KEYS) {
                log::warn!("failed to roll back partial session write: {cleanup}");
            }
            credential.generation += 1;
            credential.access = None;
            drop(credential);
            self.state.send_replace(Session::anonymous());
            return Err(e);
        }

        credential.generation += 1;
        credential.access = Some(tokens.access);
        self.cart_count.store(0, Ordering::SeqCst);

        let user_id = user.id;
        let session = Session::authenticated(user);
        self.state.send_replace(session.clone());
        drop(credential);
        log::info!("session established for user {user_id}");
        let _ = self.events.send(SessionEvent::Established { user_id });

        Ok(session)
    }

    /// Replace the stored user of the current session.
    pub fn replace_user(&self, user: User) -> Result<()> {
        if !self.is_authenticated() || self.access_token().is_none() {
            return Err(Error::AuthRequired);
        }

        self.storage.set_json(USER_KEY, &user)?;
        self.state.send_replace(Session::authenticated(user));
        let _ = self.events.send(SessionEvent::Updated);
        Ok(())
    }

    /// Clear every session key and publish the anonymous session.
    pub fn teardown(&self) {
        let mut credential = self.write_credential();
        credential.generation += 1;
        self.clear(credential, SessionEvent::LoggedOut);
    }

    /// Tear down on a rejected credential, unless a newer session replaced the
    /// one the request was issued under. Returns whether a teardown happened.
    pub fn invalidate_if_current(&self, generation: u64) -> bool {
        let mut credential = self.write_credential();
        if credential.generation != generation {
            return false;
        }
        credential.generation += 1;
        self.clear(credential, SessionEvent::Invalidated);
        true
    }

    fn clear(&self, mut credential: RwLockWriteGuard<'_, Credential>, event: SessionEvent) {
        if let Err(e) = self.storage.remove_many(&SESSION_KEYS) {
            log::warn!("failed to clear session storage: {e}");
        }
        credential.access = None;
        self.cart_count.store(0, Ordering::SeqCst);
        self.state.send_replace(Session::anonymous());
        drop(credential);
        log::info!("session cleared ({event:?})");
        let _ = self.events.send(event);
    }

    pub fn cart_count(&self) -> u32 {
        if self.is_authenticated() {
            self.cart_count.load(Ordering::SeqCst)
        } else {
            0
        }
    }

    pub fn set_cart_count(&self, count: u32) {
        self.cart_count.store(count, Ordering::SeqCst);
    }
}

/// Read the persisted pair. Anything short of a token plus a parseable user is
/// discarded from storage, as is a store that cannot be read.
fn restore(storage: &dyn SessionStorage) -> Option<(String, User)> {
    let unreadable = Cell::new(false);
    let read = |key: &str| match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("failed to read {key} during rehydration: {e}");
            unreadable.set(true);
            None
        }
    };

    let token = read(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty());
    let raw_user = read(USER_KEY);
    let user = raw_user.as_deref().and_then(|raw| {
        serde_json::from_str::<User>(raw)
            .map_err(|e| log::warn!("stored user record is unreadable: {e}"))
            .ok()
    });

    if let (Some(token), Some(user)) = (token.clone(), user) {
        return Some((token, user));
    }

    let leftovers = token.is_some() || raw_user.is_some() || read(REFRESH_TOKEN_KEY).is_some();
    if leftovers || unreadable.get() {
        log::warn!("discarding partial session state");
        if let Err(e) = storage.remove_many(&SESSION_KEYS) {
            log::warn!("failed to clear partial session state: {e}");
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenPair;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    fn payload() -> AuthPayload {
        AuthPayload {
            user: User::new(1, "alice"),
            tokens: TokenPair {
                access: "A".into(),
                refresh: "R".into(),
            },
        }
    }

    fn keys_present(storage: &MemoryStorage) -> [bool; 3] {
        SESSION_KEYS.map(|k| storage.get(k).unwrap().is_some())
    }

    #[test]
    fn test_session_flags() {
        assert!(!Session::anonymous().is_authenticated());
        assert!(!Session::anonymous().is_admin());

        let mut admin = User::new(2, "root");
        admin.is_admin = true;
        assert!(Session::authenticated(admin).is_admin());
        assert!(!Session::authenticated(User::new(3, "bob")).is_admin());
    }

    #[test]
    fn test_round_trip_rehydration() {
        let storage = Arc::new(MemoryStorage::new());
        let cell = SessionCell::rehydrate(storage.clone());
        cell.establish(payload()).unwrap();

        let reloaded = SessionCell::rehydrate(storage.clone());
        assert_eq!(reloaded.current(), Session::authenticated(User::new(1, "alice")));
        assert_eq!(reloaded.access_token().as_deref(), Some("A"));
        assert_eq!(reloaded.refresh_token().as_deref(), Some("R"));
    }

    #[test]
    fn test_user_without_token_is_rejected() {
        let storage = Arc::new(MemoryStorage::with_entries([(
            USER_KEY,
            r#"{"id":1,"username":"alice"}"#,
        )]));

        let cell = SessionCell::rehydrate(storage.clone());
        assert!(!cell.is_authenticated());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_token_without_user_is_rejected() {
        let storage = Arc::new(MemoryStorage::with_entries([
            (ACCESS_TOKEN_KEY, "A"),
            (REFRESH_TOKEN_KEY, "R"),
        ]));

        let cell = SessionCell::rehydrate(storage.clone());
        assert!(!cell.is_authenticated());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_corrupt_user_is_rejected() {
        let storage = Arc::new(MemoryStorage::with_entries([
            (ACCESS_TOKEN_KEY, "A"),
            (REFRESH_TOKEN_KEY, "R"),
            (USER_KEY, "{broken"),
        ]));

        let cell = SessionCell::rehydrate(storage.clone());
        assert!(!cell.is_authenticated());
        assert_eq!(keys_present(&storage), [false, false, false]);
    }

    /// A store whose contents cannot be parsed until it is rewritten.
    #[derive(Debug, Default)]
    struct Unreadable {
        cleared: std::sync::atomic::AtomicBool,
    }

    impl SessionStorage for Unreadable {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            if self.cleared.load(Ordering::SeqCst) {
                Ok(None)
            } else {
                Err(Error::storage("corrupt session file"))
            }
        }

        fn set_many(&self, _entries: &[(&str, &str)]) -> Result<()> {
            Ok(())
        }

        fn remove_many(&self, _keys: &[&str]) -> Result<()> {
            self.cleared.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_unreadable_store_is_cleared() {
        let storage = Arc::new(Unreadable::default());

        let cell = SessionCell::rehydrate(storage.clone());
        assert!(!cell.is_authenticated());
        assert!(storage.cleared.load(Ordering::SeqCst));
        assert_eq!(cell.refresh_token(), None);
    }

    #[test]
    fn test_credential_follows_session() {
        let cell = SessionCell::rehydrate(Arc::new(MemoryStorage::new()));
        assert_eq!(cell.credential(), Credential::default());

        cell.establish(payload()).unwrap();
        assert_eq!(
            cell.credential(),
            Credential {
                generation: 1,
                access: Some("A".into()),
            }
        );

        cell.teardown();
        assert_eq!(
            cell.credential(),
            Credential {
                generation: 2,
                access: None,
            }
        );
    }

    #[test]
    fn test_keys_written_and_cleared_together() {
        let storage = Arc::new(MemoryStorage::new());
        let cell = SessionCell::rehydrate(storage.clone());
        assert_eq!(keys_present(&storage), [false, false, false]);

        cell.establish(payload()).unwrap();
        assert_eq!(keys_present(&storage), [true, true, true]);

        cell.replace_user(User::new(1, "alice2")).unwrap();
        assert_eq!(keys_present(&storage), [true, true, true]);

        cell.teardown();
        assert_eq!(keys_present(&storage), [false, false, false]);

        cell.establish(payload()).unwrap();
        assert!(cell.invalidate_if_current(cell.generation()));
        assert_eq!(keys_present(&storage), [false, false, false]);
    }

    #[test]
    fn test_replace_user_requires_session() {
        let storage = Arc::new(MemoryStorage::new());
        let cell = SessionCell::rehydrate(storage.clone());

        let err = cell.replace_user(User::new(1, "alice")).unwrap_err();
        assert!(matches!(err, Error::AuthRequired));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_stale_generation_does_not_invalidate() {
        let storage = Arc::new(MemoryStorage::new());
        let cell = SessionCell::rehydrate(storage.clone());

        let before_login = cell.generation();
        cell.establish(payload()).unwrap();

        assert!(!cell.invalidate_if_current(before_login));
        assert!(cell.is_authenticated());
        assert_eq!(keys_present(&storage), [true, true, true]);
    }

    #[tokio::test]
    async fn test_subscribers_observe_transitions() {
        let cell = SessionCell::rehydrate(Arc::new(MemoryStorage::new()));
        let mut state = cell.subscribe();
        let mut events = cell.events();

        cell.establish(payload()).unwrap();
        state.changed().await.unwrap();
        assert!(state.borrow_and_update().is_authenticated());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::Established { user_id: UserId(1) }
        );

        assert!(cell.invalidate_if_current(cell.generation()));
        state.changed().await.unwrap();
        assert!(!state.borrow_and_update().is_authenticated());
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Invalidated);
    }

    #[test]
    fn test_cart_count_hidden_when_anonymous() {
        let cell = SessionCell::rehydrate(Arc::new(MemoryStorage::new()));
        cell.set_cart_count(4);
        assert_eq!(cell.cart_count(), 0);

        cell.establish(payload()).unwrap();
        cell.set_cart_count(4);
        assert_eq!(cell.cart_count(), 4);

        cell.teardown();
        assert_eq!(cell.cart_count(), 0);
    }
}
