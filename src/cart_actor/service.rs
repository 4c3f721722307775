use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::app_system::CartConfig;
use crate::clients::CartClient;
use crate::domain::{Cart, CartChange, CartSnapshot, LineItem, NewLineItem};
use crate::messages::{CartRequest, MutationOutcome, ServiceResponse};
use crate::storage::KeyValueStore;

use super::{snapshot, CartError};

/// Single owner of the cart.
///
/// Every request goes through one mailbox, so mutations are applied strictly
/// one after another and each sees the result of the previous one. A change
/// is written to storage first; memory and subscribers are only updated once
/// the write succeeded.
pub struct CartService {
    receiver: mpsc::Receiver<CartRequest>,
    publisher: watch::Sender<Arc<CartSnapshot>>,
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
    persist_retries: u32,
    retry_backoff: Duration,
    cart: Cart,
    version: u64,
}

impl CartService {
    pub fn new(config: &CartConfig, store: Arc<dyn KeyValueStore>) -> (Self, CartClient) {
        let (sender, receiver) = mpsc::channel(config.mailbox_size);
        let (publisher, snapshots) = watch::channel(Arc::new(CartSnapshot::default()));
        let service = Self {
            receiver,
            publisher,
            store,
            storage_key: config.storage_key.clone(),
            persist_retries: config.persist_retries,
            retry_backoff: config.retry_backoff,
            cart: Cart::new(),
            version: 0,
        };
        let client = CartClient::new(sender, snapshots);
        (service, client)
    }

    /// Main actor loop.
    ///
    /// Hydration runs before the first message is taken from the mailbox.
    /// Subscribers see the empty snapshot until then, and early mutations wait
    /// in the queue instead of being applied to the placeholder.
    #[instrument(name = "cart_service", skip(self), fields(storage_key = %self.storage_key))]
    pub async fn run(mut self) {
        info!("CartService starting");

        self.hydrate().await;

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CartRequest::AddToCart { item, respond_to } => {
                    self.handle_add_to_cart(item, respond_to).await;
                }
                CartRequest::Increment { id, respond_to } => {
                    self.handle_increment(id, respond_to).await;
                }
                CartRequest::Decrement { id, respond_to } => {
                    self.handle_decrement(id, respond_to).await;
                }
                CartRequest::GetProducts { respond_to } => {
                    self.handle_get_products(respond_to);
                }
                CartRequest::Shutdown => {
                    info!("CartService shutting down");
                    break;
                }
            }
        }

        info!(item_count = self.cart.len(), "CartService stopped");
    }

    /// Loads the stored cart once. Anything unreadable is treated as absent.
    #[instrument(skip(self))]
    async fn hydrate(&mut self) {
        let blob = match self.store.get(&self.storage_key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("No stored cart, starting empty");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Reading stored cart failed, starting empty");
                return;
            }
        };

        match snapshot::decode(&blob) {
            Ok(cart) => {
                info!(item_count = cart.len(), "Cart restored from storage");
                self.cart = cart;
                self.publish();
            }
            Err(e) => warn!(error = %e, "Stored cart is malformed, starting empty"),
        }
    }

    #[instrument(fields(item_id = %item.id, title = %item.title), skip(self, item, respond_to))]
    async fn handle_add_to_cart(
        &mut self,
        item: NewLineItem,
        respond_to: ServiceResponse<MutationOutcome, CartError>,
    ) {
        debug!("Processing add_to_cart request");

        // JSON has no NaN or infinity; such a price would be stored as null.
        if !item.price.is_finite() {
            error!(price = item.price, "Validation failed: price is not a finite number");
            let _ = respond_to.send(Err(CartError::InvalidItem(format!(
                "price of {} must be a finite number",
                item.id
            ))));
            return;
        }

        let result = self.apply(|cart| cart.add(item)).await;
        let _ = respond_to.send(result);
    }

    #[instrument(fields(item_id = %id), skip(self, respond_to))]
    async fn handle_increment(
        &mut self,
        id: String,
        respond_to: ServiceResponse<MutationOutcome, CartError>,
    ) {
        debug!("Processing increment request");
        let result = self.apply(|cart| cart.increment(&id)).await;
        let _ = respond_to.send(result);
    }

    /// Unknown ids are a no-op, same as increment: nothing is written or published.
    #[instrument(fields(item_id = %id), skip(self, respond_to))]
    async fn handle_decrement(
        &mut self,
        id: String,
        respond_to: ServiceResponse<MutationOutcome, CartError>,
    ) {
        debug!("Processing decrement request");
        let result = self.apply(|cart| cart.decrement(&id)).await;
        let _ = respond_to.send(result);
    }

    #[instrument(skip(self, respond_to))]
    fn handle_get_products(&self, respond_to: ServiceResponse<Vec<LineItem>, CartError>) {
        debug!(item_count = self.cart.len(), "Processing get_products request");
        let _ = respond_to.send(Ok(self.cart.items().to_vec()));
    }

    /// Runs `mutate` on a copy of the cart, then persists and publishes it.
    ///
    /// On a storage failure the copy is discarded, leaving memory and the
    /// published snapshot as they were.
    async fn apply(
        &mut self,
        mutate: impl FnOnce(&mut Cart) -> CartChange,
    ) -> Result<MutationOutcome, CartError> {
        let mut next = self.cart.clone();
        let change = mutate(&mut next);

        if !change.is_changed() {
            debug!("Item not in cart, nothing to do");
            return Ok(MutationOutcome {
                change,
                snapshot: self.publisher.borrow().clone(),
            });
        }

        self.persist(&next).await?;
        self.cart = next;
        let snapshot = self.publish();

        info!(
            change = ?change,
            version = snapshot.version,
            item_count = snapshot.cart.len(),
            "Cart updated"
        );
        Ok(MutationOutcome { change, snapshot })
    }

    async fn persist(&self, cart: &Cart) -> Result<(), CartError> {
        let blob = snapshot::encode(cart)?;
        let mut attempt = 0;

        loop {
            match self.store.set(&self.storage_key, &blob).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.persist_retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, "Persisting cart failed, retrying");
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => {
                    error!(error = %e, attempts = attempt + 1, "Persisting cart failed");
                    return Err(e.into());
                }
            }
        }
    }

    fn publish(&mut self) -> Arc<CartSnapshot> {
        self.version += 1;
        let snapshot = Arc::new(CartSnapshot {
            version: self.version,
            cart: self.cart.clone(),
        });
        self.publisher.send_replace(Arc::clone(&snapshot));
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    const DEFAULT_KEY: &str = crate::app_system::DEFAULT_STORAGE_KEY;

    /// Fails the first `failures` writes, then delegates to an inner memory store.
    struct FlakyStore {
        inner: MemoryStore,
        failures: AtomicU32,
    }

    impl FlakyStore {
        fn new(inner: MemoryStore, failures: u32) -> Self {
            Self {
                inner,
                failures: AtomicU32::new(failures),
            }
        }
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(StorageError::Backend("disk full".to_string()));
            }
            self.inner.set(key, value).await
        }
    }

    struct UnreadableStore;

    #[async_trait]
    impl KeyValueStore for UnreadableStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io("permission denied".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn test_config(persist_retries: u32) -> CartConfig {
        CartConfig {
            persist_retries,
            retry_backoff: Duration::from_millis(1),
            ..CartConfig::default()
        }
    }

    fn start(config: &CartConfig, store: Arc<dyn KeyValueStore>) -> CartClient {
        let (service, client) = CartService::new(config, store);
        tokio::spawn(service.run());
        client
    }

    fn apple() -> NewLineItem {
        NewLineItem::new("A", "Apple", "a.png", 10.0)
    }

    #[tokio::test]
    async fn mutation_is_persisted_and_published() {
        let store = MemoryStore::new();
        let client = start(&test_config(0), Arc::new(store.clone()));
        let mut updates = client.subscribe();

        let outcome = client.add_to_cart(apple()).await.unwrap();

        assert_eq!(outcome.change, CartChange::Added);
        assert_eq!(outcome.snapshot.version, 1);
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow().cart, outcome.snapshot.cart);

        let stored = store.get(DEFAULT_KEY).await.unwrap().unwrap();
        assert_eq!(snapshot::decode(&stored).unwrap(), outcome.snapshot.cart);
    }

    #[tokio::test]
    async fn unknown_ids_neither_persist_nor_publish() {
        let store = MemoryStore::new();
        let client = start(&test_config(0), Arc::new(store.clone()));
        client.add_to_cart(apple()).await.unwrap();
        let writes = store.writes();

        let inc = client.increment("missing".to_string()).await.unwrap();
        let dec = client.decrement("missing".to_string()).await.unwrap();

        assert!(!inc.changed());
        assert!(!dec.changed());
        assert_eq!(dec.snapshot.version, 1);
        assert_eq!(store.writes(), writes);
        assert_eq!(client.current().version, 1);
    }

    #[tokio::test]
    async fn non_finite_price_is_rejected_without_writing() {
        let store = MemoryStore::new();
        let client = start(&test_config(0), Arc::new(store.clone()));

        for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let item = NewLineItem::new("N", "Broken", "n.png", price);
            let err = client.add_to_cart(item).await.unwrap_err();
            assert!(matches!(err, CartError::InvalidItem(_)));
        }

        assert!(client.products().await.unwrap().is_empty());
        assert_eq!(client.current().version, 0);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn hydrates_from_stored_cart() {
        let stored = r#"[{"id":"A","title":"Apple","image_url":"a.png","price":10.0,"quantity":3}]"#;
        let store = MemoryStore::with_entry(DEFAULT_KEY, stored);
        let client = start(&test_config(0), Arc::new(store));

        let products = client.products().await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity, 3);
        assert_eq!(client.current().version, 1);
    }

    #[tokio::test]
    async fn malformed_stored_cart_starts_empty() {
        let store = MemoryStore::with_entry(DEFAULT_KEY, "{definitely not a cart");
        let client = start(&test_config(0), Arc::new(store));

        assert!(client.products().await.unwrap().is_empty());
        assert_eq!(client.current().version, 0);
    }

    #[tokio::test]
    async fn unreadable_storage_starts_empty() {
        let client = start(&test_config(0), Arc::new(UnreadableStore));

        assert!(client.products().await.unwrap().is_empty());
        let outcome = client.add_to_cart(apple()).await.unwrap();
        assert_eq!(outcome.items().len(), 1);
    }

    #[tokio::test]
    async fn failed_write_is_reported_and_state_is_kept() {
        let store = MemoryStore::new();
        let flaky = FlakyStore::new(store.clone(), 1);
        let client = start(&test_config(0), Arc::new(flaky));

        let err = client.add_to_cart(apple()).await.unwrap_err();

        assert!(matches!(err, CartError::Storage(StorageError::Backend(_))));
        assert!(client.products().await.unwrap().is_empty());
        assert_eq!(client.current().version, 0);
        assert_eq!(store.writes(), 0);

        let outcome = client.add_to_cart(apple()).await.unwrap();
        assert_eq!(outcome.change, CartChange::Added);
    }

    #[tokio::test]
    async fn transient_write_failures_are_retried() {
        let store = MemoryStore::new();
        let flaky = FlakyStore::new(store.clone(), 2);
        let client = start(&test_config(2), Arc::new(flaky));

        let outcome = client.add_to_cart(apple()).await.unwrap();

        assert_eq!(outcome.change, CartChange::Added);
        assert_eq!(store.writes(), 1);
    }
}
