//! In-memory wishlist state with write-through persistence.

use tokio::task::JoinHandle;

use optica_core::{Collection, ProductRefId, ProductReference, SessionState};

use super::{LocalAdapter, RemoteAdapter};
use crate::session_status::{SessionListener, SessionTransition};

/// Holds one visitor's wishlist for the duration of a request.
///
/// Mutations apply in memory first and are then persisted to whichever
/// adapter the session state selects. Persistence failures are logged and
/// never roll back the in-memory collection.
pub struct CollectionManager<L, R> {
    local: L,
    remote: R,
    state: SessionState,
    collection: Collection,
    loading: bool,
    pending: Option<JoinHandle<()>>,
}

impl<L: LocalAdapter, R: RemoteAdapter> CollectionManager<L, R> {
    /// New manager in the `Loading` state with an empty collection.
    #[must_use]
    pub fn new(local: L, remote: R) -> Self {
        Self {
            local,
            remote,
            state: SessionState::Loading,
            collection: Collection::new(),
            loading: true,
            pending: None,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    #[must_use]
    pub const fn items(&self) -> &Collection {
        &self.collection
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn session_state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn is_present(&self, id: &ProductRefId) -> bool {
        self.collection.contains(id)
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Load the collection from the authoritative adapter.
    ///
    /// While `Loading` there is no authoritative adapter and the collection
    /// stays empty. A failed load is logged and yields an empty collection.
    pub async fn fetch(&mut self) {
        let loaded = match &self.state {
            SessionState::Loading => {
                self.collection = Collection::new();
                self.loading = true;
                return;
            }
            SessionState::Unauthenticated => self.local.load().await,
            SessionState::Authenticated(customer) => self.remote.load(customer).await,
        };

        self.collection = match loaded {
            Ok(items) => Collection::from_items(items),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    state = self.state.label(),
                    "Failed to load wishlist, starting empty"
                );
                Collection::new()
            }
        };
        self.loading = false;
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `item` unless its id is already present. Returns whether it was added.
    pub async fn add(&mut self, item: ProductReference) -> bool {
        let added = self.collection.add(item);
        if added {
            self.persist().await;
        }
        added
    }

    /// Remove the item with `id`. Returns whether anything was removed.
    pub async fn remove(&mut self, id: &ProductRefId) -> bool {
        let removed = self.collection.remove(id);
        if removed {
            self.persist().await;
        }
        removed
    }

    /// Replace the whole collection.
    pub async fn replace(&mut self, items: Vec<ProductReference>) {
        self.collection = Collection::from_items(items);
        self.persist().await;
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the whole collection to the authoritative adapter.
    ///
    /// Guest writes complete before this returns. Customer writes are
    /// spawned; each waits for the previous one so the latest snapshot is
    /// the last to land.
    pub async fn persist(&mut self) {
        match &self.state {
            SessionState::Loading => {}
            SessionState::Unauthenticated => {
                if let Err(e) = self.local.store(self.collection.as_slice()).await {
                    tracing::warn!(error = %e, "Failed to save guest wishlist");
                }
            }
            SessionState::Authenticated(customer) => {
                let previous = self.pending.take();
                let remote = self.remote.clone();
                let customer = customer.clone();
                let items = self.collection.as_slice().to_vec();

                self.pending = Some(tokio::spawn(async move {
                    if let Some(previous) = previous
                        && let Err(e) = previous.await
                    {
                        tracing::warn!(error = %e, "Previous wishlist write task failed");
                    }
                    if let Err(e) = remote.store(&customer, items).await {
                        tracing::warn!(
                            error = %e,
                            customer_id = %customer,
                            "Failed to save wishlist"
                        );
                    }
                }));
            }
        }
    }

    /// Wait for the customer write this manager spawned, if any.
    ///
    /// Writes are ordered within one manager only; a later request gets its own.
    pub async fn flush(&mut self) {
        if let Some(pending) = self.pending.take()
            && let Err(e) = pending.await
        {
            tracing::warn!(error = %e, "Wishlist write task failed");
        }
    }
}

impl<L: LocalAdapter, R: RemoteAdapter> SessionListener for CollectionManager<L, R> {
    async fn on_transition(&mut self, transition: &SessionTransition) {
        self.state = transition.to.clone();
        // Full re-fetch from the new adapter; the previous collection is discarded
        self.fetch().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use optica_core::CustomerId;

    use super::*;
    use crate::collection::StoreError;
    use crate::db::RepositoryError;

    // =========================================================================
    // Recording fakes
    // =========================================================================

    #[derive(Clone, Default)]
    struct FakeLocal {
        items: Arc<Mutex<Vec<ProductReference>>>,
        writes: Arc<Mutex<Vec<Vec<ProductReference>>>>,
    }

    impl LocalAdapter for FakeLocal {
        async fn load(&self) -> Result<Vec<ProductReference>, StoreError> {
            Ok(self.items.lock().unwrap().clone())
        }

        async fn store(&self, items: &[ProductReference]) -> Result<(), StoreError> {
            *self.items.lock().unwrap() = items.to_vec();
            self.writes.lock().unwrap().push(items.to_vec());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeRemote {
        items: Arc<Mutex<Vec<ProductReference>>>,
        loads: Arc<Mutex<usize>>,
        writes: Arc<Mutex<Vec<Vec<ProductReference>>>>,
        fail: bool,
    }

    impl RemoteAdapter for FakeRemote {
        async fn load(&self, _customer: &CustomerId) -> Result<Vec<ProductReference>, StoreError> {
            *self.loads.lock().unwrap() += 1;
            if self.fail {
                return Err(RepositoryError::DataCorruption("bad row".to_string()).into());
            }
            Ok(self.items.lock().unwrap().clone())
        }

        async fn store(
            &self,
            _customer: &CustomerId,
            items: Vec<ProductReference>,
        ) -> Result<(), StoreError> {
            if self.fail {
                return Err(RepositoryError::DataCorruption("bad write".to_string()).into());
            }
            *self.items.lock().unwrap() = items.clone();
            self.writes.lock().unwrap().push(items);
            Ok(())
        }
    }

    fn item(id: &str) -> ProductReference {
        ProductReference {
            id: ProductRefId::parse(id).unwrap(),
            name: format!("Frame {id}"),
            href: format!("/products/{id}"),
            price: "$95.00".to_string(),
            image_src: format!("https://cdn.shopify.com/{id}.jpg"),
            image_alt: format!("Frame {id}"),
            tags: vec![],
        }
    }

    fn customer() -> SessionState {
        SessionState::Authenticated(CustomerId::parse("gid://shopify/Customer/7").unwrap())
    }

    fn ids(collection: &Collection) -> Vec<&str> {
        collection.iter().map(|i| i.id.as_str()).collect()
    }

    async fn manager_in(
        state: SessionState,
        local: FakeLocal,
        remote: FakeRemote,
    ) -> CollectionManager<FakeLocal, FakeRemote> {
        let mut manager = CollectionManager::new(local, remote);
        manager
            .on_transition(&SessionTransition {
                from: SessionState::Loading,
                to: state,
            })
            .await;
        manager
    }

    // =========================================================================
    // Tests
    // =========================================================================

    #[tokio::test]
    async fn test_loading_has_no_adapter() {
        let local = FakeLocal::default();
        let remote = FakeRemote::default();
        let mut manager = CollectionManager::new(local.clone(), remote.clone());

        manager.fetch().await;
        assert!(manager.is_loading());

        assert!(manager.add(item("a")).await);
        manager.flush().await;

        assert!(local.writes.lock().unwrap().is_empty());
        assert!(remote.writes.lock().unwrap().is_empty());
        assert_eq!(*remote.loads.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let local = FakeLocal::default();
        let mut manager =
            manager_in(SessionState::Unauthenticated, local.clone(), FakeRemote::default()).await;

        assert!(manager.add(item("a")).await);
        assert!(!manager.add(item("a")).await);

        assert_eq!(manager.items().len(), 1);
        assert_eq!(local.writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let local = FakeLocal::default();
        *local.items.lock().unwrap() = vec![item("a"), item("b")];
        let mut manager =
            manager_in(SessionState::Unauthenticated, local.clone(), FakeRemote::default()).await;

        assert!(!manager.remove(&ProductRefId::parse("zzz").unwrap()).await);

        assert_eq!(ids(manager.items()), vec!["a", "b"]);
        assert!(local.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guest_persists_full_list() {
        let local = FakeLocal::default();
        *local.items.lock().unwrap() = vec![item("a"), item("b"), item("c")];
        let mut manager =
            manager_in(SessionState::Unauthenticated, local.clone(), FakeRemote::default()).await;

        assert!(manager.remove(&ProductRefId::parse("b").unwrap()).await);

        let writes = local.writes.lock().unwrap();
        let last = writes.last().unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(last.first().unwrap().id.as_str(), "a");
    }

    #[tokio::test]
    async fn test_customer_persists_full_list_in_order() {
        let remote = FakeRemote::default();
        *remote.items.lock().unwrap() = vec![item("a"), item("b"), item("c")];
        let mut manager = manager_in(customer(), FakeLocal::default(), remote.clone()).await;

        manager.remove(&ProductRefId::parse("c").unwrap()).await;
        manager.add(item("d")).await;
        manager.remove(&ProductRefId::parse("a").unwrap()).await;
        manager.flush().await;

        let writes = remote.writes.lock().unwrap();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes.first().unwrap().len(), 2);
        let stored: Vec<_> = remote.items.lock().unwrap().iter().map(|i| i.id.as_str().to_string()).collect();
        assert_eq!(stored, vec!["b", "d"]);
    }

    #[tokio::test]
    async fn test_login_refetches_from_remote_without_merge() {
        let local = FakeLocal::default();
        *local.items.lock().unwrap() = vec![item("guest")];
        let remote = FakeRemote::default();
        *remote.items.lock().unwrap() = vec![item("saved-1"), item("saved-2")];

        let mut manager = manager_in(SessionState::Unauthenticated, local, remote.clone()).await;
        assert_eq!(ids(manager.items()), vec!["guest"]);

        manager
            .on_transition(&SessionTransition {
                from: SessionState::Unauthenticated,
                to: customer(),
            })
            .await;

        assert_eq!(*remote.loads.lock().unwrap(), 1);
        assert_eq!(ids(manager.items()), vec!["saved-1", "saved-2"]);
        assert!(remote.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logout_returns_to_guest_copy() {
        let local = FakeLocal::default();
        *local.items.lock().unwrap() = vec![item("guest")];
        let remote = FakeRemote::default();
        *remote.items.lock().unwrap() = vec![item("saved")];

        let mut manager = manager_in(customer(), local, remote).await;
        manager
            .on_transition(&SessionTransition {
                from: customer(),
                to: SessionState::Unauthenticated,
            })
            .await;

        assert_eq!(ids(manager.items()), vec!["guest"]);
        assert!(!manager.is_loading());
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_empty() {
        let remote = FakeRemote {
            fail: true,
            ..FakeRemote::default()
        };
        let manager = manager_in(customer(), FakeLocal::default(), remote).await;

        assert!(manager.items().is_empty());
        assert!(!manager.is_loading());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory() {
        let remote = FakeRemote {
            fail: true,
            ..FakeRemote::default()
        };
        let mut manager = manager_in(customer(), FakeLocal::default(), remote).await;

        assert!(manager.add(item("a")).await);
        manager.flush().await;

        assert!(manager.is_present(&ProductRefId::parse("a").unwrap()));
    }

    #[tokio::test]
    async fn test_replace_dedupes() {
        let local = FakeLocal::default();
        let mut manager =
            manager_in(SessionState::Unauthenticated, local.clone(), FakeRemote::default()).await;

        manager.replace(vec![item("a"), item("b"), item("a")]).await;

        assert_eq!(ids(manager.items()), vec!["a", "b"]);
        assert_eq!(local.writes.lock().unwrap().last().unwrap().len(), 2);
    }
}
