use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::utils::HobbyError;

/// Account role as the backend names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    AdminKomunitas,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::AdminKomunitas => "admin_komunitas",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HobbyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin_komunitas" => Ok(Role::AdminKomunitas),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(HobbyError::Session(format!("unknown role: {}", other))),
        }
    }
}

/// The persisted authentication triple. Every field may be absent
/// independently (fresh install, partially written file).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub role: Option<Role>,
    pub user_id: Option<i64>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().map_or(false, |t| !t.is_empty())
    }
}

/// Durable storage seam for the session triple
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionPersistence: Send + Sync {
    async fn load(&self) -> Result<Session, HobbyError>;
    async fn save(&self, session: &Session) -> Result<(), HobbyError>;
    async fn clear(&self) -> Result<(), HobbyError>;
}

/// Persistence that keeps nothing. Used for sessions that should not
/// outlive the process.
struct Ephemeral;

#[async_trait]
impl SessionPersistence for Ephemeral {
    async fn load(&self) -> Result<Session, HobbyError> {
        Ok(Session::default())
    }

    async fn save(&self, _session: &Session) -> Result<(), HobbyError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), HobbyError> {
        Ok(())
    }
}

/// Single source of truth for "am I authenticated, as whom, and has my
/// session just been invalidated".
///
/// The triple lives behind one lock so readers always observe a consistent
/// snapshot (never a token from one login paired with a role from another).
/// The expiry flag is a separate in-memory watch channel; it is never
/// persisted.
pub struct SessionStore {
    current: RwLock<Session>,
    expired_tx: watch::Sender<bool>,
    persistence: Box<dyn SessionPersistence>,
}

impl SessionStore {
    /// Create a store backed by durable storage, seeding the in-memory
    /// snapshot from whatever was persisted.
    pub async fn new(persistence: Box<dyn SessionPersistence>) -> Result<Self, HobbyError> {
        let current = persistence.load().await?;
        let (expired_tx, _) = watch::channel(false);
        Ok(Self {
            current: RwLock::new(current),
            expired_tx,
            persistence,
        })
    }

    /// Create a store with no durable backing
    pub fn ephemeral() -> Self {
        let (expired_tx, _) = watch::channel(false);
        Self {
            current: RwLock::new(Session::default()),
            expired_tx,
            persistence: Box::new(Ephemeral),
        }
    }

    /// Overwrite the session triple. No validation of the token format;
    /// subsequent requests pick up the new token immediately.
    pub async fn set_session(
        &self,
        token: impl Into<String>,
        role: Role,
        user_id: i64,
    ) -> Result<(), HobbyError> {
        let session = Session {
            token: Some(token.into()),
            role: Some(role),
            user_id: Some(user_id),
        };
        self.persistence.save(&session).await?;
        *self.current.write() = session;
        Ok(())
    }

    /// Erase the persisted triple. Subsequent requests carry no bearer token.
    pub async fn clear_session(&self) -> Result<(), HobbyError> {
        self.persistence.clear().await?;
        *self.current.write() = Session::default();
        Ok(())
    }

    /// Consistent snapshot of the whole triple
    pub fn snapshot(&self) -> Session {
        self.current.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().token.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.current.read().role
    }

    pub fn user_id(&self) -> Option<i64> {
        self.current.read().user_id
    }

    /// Raise the expiry signal. Idempotent: concurrent failing requests
    /// collapse to a single observable false -> true transition.
    pub fn mark_expired(&self) {
        self.expired_tx.send_if_modified(|expired| {
            if *expired {
                false
            } else {
                *expired = true;
                true
            }
        });
    }

    /// Lower the expiry signal. Called together with [`clear_session`]
    /// when the user acknowledges the forced logout.
    ///
    /// [`clear_session`]: SessionStore::clear_session
    pub fn acknowledge_expiry(&self) {
        self.expired_tx.send_if_modified(|expired| {
            if *expired {
                *expired = false;
                true
            } else {
                false
            }
        });
    }

    pub fn is_expired(&self) -> bool {
        *self.expired_tx.borrow()
    }

    /// Raw watch receiver for callers that want `changed().await`
    pub fn subscribe_expiry(&self) -> watch::Receiver<bool> {
        self.expired_tx.subscribe()
    }

    /// Push-based expiry observable. Emits the current value immediately on
    /// subscription and every subsequent change, in mutation order.
    pub fn observe_expiry(&self) -> WatchStream<bool> {
        WatchStream::new(self.expired_tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn fresh_store_is_unauthenticated_and_not_expired() {
        let store = SessionStore::ephemeral();
        assert_eq!(store.snapshot(), Session::default());
        assert!(!store.is_expired());
        assert!(!store.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn set_session_overwrites_the_whole_triple() {
        let store = SessionStore::ephemeral();
        store.set_session("abc123", Role::User, 7).await.unwrap();
        store
            .set_session("newtok", Role::AdminKomunitas, 9)
            .await
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.token.as_deref(), Some("newtok"));
        assert_eq!(snapshot.role, Some(Role::AdminKomunitas));
        assert_eq!(snapshot.user_id, Some(9));
    }

    #[tokio::test]
    async fn clear_session_empties_every_field() {
        let store = SessionStore::ephemeral();
        store.set_session("abc123", Role::User, 7).await.unwrap();
        store.clear_session().await.unwrap();
        assert_eq!(store.snapshot(), Session::default());
    }

    #[tokio::test]
    async fn mark_expired_is_idempotent() {
        let store = SessionStore::ephemeral();
        let mut rx = store.subscribe_expiry();
        assert!(!*rx.borrow_and_update());

        store.mark_expired();
        store.mark_expired();
        store.mark_expired();

        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
        // Exactly one transition: no further notification is pending
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn acknowledge_resets_the_flag_once() {
        let store = SessionStore::ephemeral();
        store.mark_expired();
        store.acknowledge_expiry();
        assert!(!store.is_expired());

        // Acknowledging an already-clear flag makes no new emission
        let mut rx = store.subscribe_expiry();
        rx.borrow_and_update();
        store.acknowledge_expiry();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn observe_emits_current_value_on_subscription() {
        let store = SessionStore::ephemeral();
        let mut stream = store.observe_expiry();
        assert_eq!(stream.next().await, Some(false));

        store.mark_expired();
        assert_eq!(stream.next().await, Some(true));

        store.acknowledge_expiry();
        assert_eq!(stream.next().await, Some(false));
    }

    #[tokio::test]
    async fn acknowledge_then_login_restores_normal_operation() {
        let store = SessionStore::ephemeral();
        store.set_session("abc123", Role::User, 7).await.unwrap();
        store.mark_expired();

        store.clear_session().await.unwrap();
        store.acknowledge_expiry();
        store
            .set_session("newtok", Role::AdminKomunitas, 9)
            .await
            .unwrap();

        assert!(!store.is_expired());
        assert_eq!(store.token().as_deref(), Some("newtok"));
    }

    #[tokio::test]
    async fn persistence_is_written_on_set_and_clear() {
        let expected = Session {
            token: Some("abc123".to_string()),
            role: Some(Role::User),
            user_id: Some(7),
        };

        let mut persistence = MockSessionPersistence::new();
        persistence
            .expect_load()
            .times(1)
            .returning(|| Ok(Session::default()));
        persistence
            .expect_save()
            .with(eq(expected))
            .times(1)
            .returning(|_| Ok(()));
        persistence.expect_clear().times(1).returning(|| Ok(()));

        let store = SessionStore::new(Box::new(persistence)).await.unwrap();
        store.set_session("abc123", Role::User, 7).await.unwrap();
        store.clear_session().await.unwrap();
    }

    #[tokio::test]
    async fn persistence_failure_leaves_memory_untouched() {
        let mut persistence = MockSessionPersistence::new();
        persistence
            .expect_load()
            .returning(|| Ok(Session::default()));
        persistence
            .expect_save()
            .returning(|_| Err(HobbyError::Session("disk full".to_string())));

        let store = SessionStore::new(Box::new(persistence)).await.unwrap();
        assert!(store.set_session("abc123", Role::User, 7).await.is_err());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn role_parses_wire_names_and_rejects_others() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!(
            "admin_komunitas".parse::<Role>().unwrap(),
            Role::AdminKomunitas
        );
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("moderator".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::AdminKomunitas).unwrap(),
            "\"admin_komunitas\""
        );
    }
}
