use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::session::store::SessionStore;
use crate::utils::HobbyError;

/// Spawn a task that invokes `on_expired` once per false -> true transition
/// of the expiry flag. However many in-flight requests fail at once, the
/// callback fires a single time until the flag is acknowledged.
///
/// The task ends when the store is dropped.
pub fn watch_forced_logout<F>(store: Arc<SessionStore>, on_expired: F) -> JoinHandle<()>
where
    F: Fn() + Send + 'static,
{
    let mut rx = store.subscribe_expiry();
    drop(store);
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if *rx.borrow_and_update() {
                on_expired();
            }
        }
    })
}

/// The acknowledgment half of the forced-logout flow: erase the persisted
/// session, then lower the expiry flag. Run after the user has acknowledged
/// the expiry notice; any cached per-session state must be discarded by the
/// caller alongside this.
pub async fn acknowledge_and_logout(store: &SessionStore) -> Result<(), HobbyError> {
    store.clear_session().await?;
    store.acknowledge_expiry();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::Role;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn callback_fires_once_per_transition() {
        let store = Arc::new(SessionStore::ephemeral());
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        let handle = watch_forced_logout(Arc::clone(&store), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.mark_expired();
        store.mark_expired();
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        store.acknowledge_expiry();
        store.mark_expired();
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);

        drop(store);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn acknowledge_and_logout_clears_both_pieces_of_state() {
        let store = SessionStore::ephemeral();
        store.set_session("abc123", Role::User, 7).await.unwrap();
        store.mark_expired();

        acknowledge_and_logout(&store).await.unwrap();

        assert!(!store.is_expired());
        assert_eq!(store.token(), None);
        assert!(!store.snapshot().is_authenticated());
    }
}
