//! Shopping cart store.
//!
//! [`CartStore`] owns the authoritative list of line items for one shopper and
//! mirrors it into a [`KeyValueStorage`] slot after every mutation. The mirror
//! is read once, when the store is opened.
//!
//! Storage problems never escape a cart operation: an unreadable snapshot
//! opens as an empty cart, and a failed write is logged while the in-memory
//! cart stays usable. Callers that care about durability can check
//! [`CartStore::is_durable`] or call [`CartStore::flush`].

pub mod snapshot;
pub mod storage;
pub mod subscription;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use shieldline_core::{CartItem, CartLineItem, ProductId};

pub use snapshot::SnapshotError;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use subscription::{CartEvent, CartSummary, Subscription};

use subscription::Listeners;

/// Storage slot used when none is configured.
pub const DEFAULT_CART_KEY: &str = "cart";

/// Errors reported by [`CartStore::flush`].
#[derive(Debug, Error)]
pub enum CartError {
    /// The storage backend rejected the write.
    #[error("cart storage error: {0}")]
    Storage(#[from] StorageError),

    /// The snapshot could not be encoded.
    #[error("cart snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// The shopper's cart.
///
/// Cheaply cloneable; every clone is a handle to the same cart, so a header
/// badge, the cart page and checkout all observe one state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    items: RwLock<Vec<CartLineItem>>,
    durable: AtomicBool,
    listeners: Arc<Listeners>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("items", &self.items().len())
            .field("durable", &self.is_durable())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open the cart persisted under `key`, hydrating from storage.
    ///
    /// A missing slot, a read failure, or a snapshot that does not decode all
    /// produce an empty cart.
    #[must_use]
    pub fn open(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (items, durable) = hydrate(storage.as_ref(), &key);

        Self {
            inner: Arc::new(CartStoreInner {
                storage,
                key,
                items: RwLock::new(items),
                durable: AtomicBool::new(durable),
                listeners: Arc::new(Listeners::default()),
            }),
        }
    }

    /// Open an empty cart backed by process memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()), DEFAULT_CART_KEY)
    }

    /// The storage slot this cart is mirrored into.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of a product.
    ///
    /// An existing line for the same id has its quantity increased; otherwise a
    /// new line is appended. Adding zero units does nothing.
    pub fn add_to_cart(&self, item: CartItem, quantity: u32) {
        if quantity == 0 {
            debug!(product_id = %item.id, "Ignoring add of zero units");
            return;
        }

        self.mutate(|items| {
            let (id, new_quantity) =
                if let Some(line) = items.iter_mut().find(|line| line.id == item.id) {
                    line.quantity = line.quantity.saturating_add(quantity);
                    (line.id.clone(), line.quantity)
                } else {
                    let id = item.id.clone();
                    items.push(CartLineItem::from_item(item, quantity));
                    (id, quantity)
                };
            debug!(product_id = %id, quantity = new_quantity, "Added to cart");
            Some(CartEvent::Added {
                id,
                quantity: new_quantity,
            })
        });
    }

    /// Add a single unit of a product.
    pub fn add_one(&self, item: CartItem) {
        self.add_to_cart(item, 1);
    }

    /// Remove the line for `id`. Unknown ids are ignored.
    pub fn remove_from_cart(&self, id: &ProductId) {
        self.mutate(|items| {
            let before = items.len();
            items.retain(|line| &line.id != id);
            (items.len() != before).then(|| {
                debug!(product_id = %id, "Removed from cart");
                CartEvent::Removed { id: id.clone() }
            })
        });
    }

    /// Set the quantity of the line for `id`.
    ///
    /// Zero or below removes the line. Values above `u32::MAX` are clamped.
    /// Unknown ids are ignored.
    pub fn update_quantity(&self, id: &ProductId, new_quantity: i64) {
        if new_quantity <= 0 {
            self.remove_from_cart(id);
            return;
        }
        let quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);

        self.mutate(|items| {
            let line = items.iter_mut().find(|line| &line.id == id)?;
            if line.quantity == quantity {
                return None;
            }
            line.quantity = quantity;
            debug!(product_id = %id, quantity, "Updated cart quantity");
            Some(CartEvent::QuantityUpdated {
                id: id.clone(),
                quantity,
            })
        });
    }

    /// Empty the cart and persist the empty state.
    pub fn clear_cart(&self) {
        self.mutate_always(|items| {
            let removed = items.len();
            items.clear();
            info!(removed, "Cleared cart");
            CartEvent::Cleared
        });
    }

    /// Take the units of an accepted order out of the cart.
    ///
    /// Each ordered line loses the quantity that was ordered. Lines and units
    /// added after the order was read are kept. The result is always written.
    pub fn remove_ordered(&self, ordered: &[CartLineItem]) {
        self.mutate_always(|items| {
            for line in ordered {
                if let Some(current) = items.iter_mut().find(|item| item.id == line.id) {
                    current.quantity = current.quantity.saturating_sub(line.quantity);
                }
            }
            items.retain(|item| item.quantity > 0);

            if items.is_empty() {
                info!(ordered = ordered.len(), "Cleared cart after order");
                CartEvent::Cleared
            } else {
                info!(
                    ordered = ordered.len(),
                    remaining = items.len(),
                    "Removed ordered lines; newer lines kept"
                );
                CartEvent::Ordered {
                    remaining: items.len(),
                }
            }
        });
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All line items, in the order they were first added.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.read(<[CartLineItem]>::to_vec)
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn line(&self, id: &ProductId) -> Option<CartLineItem> {
        self.read(|items| items.iter().find(|line| &line.id == id).cloned())
    }

    /// Whether a line for `id` exists.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.read(|items| items.iter().any(|line| &line.id == id))
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read(<[CartLineItem]>::is_empty)
    }

    /// Sum of `price × quantity` over every line. Zero for an empty cart.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.read(total_of)
    }

    /// Total number of units across every line. Zero for an empty cart.
    #[must_use]
    pub fn cart_items_count(&self) -> u64 {
        self.read(count_of)
    }

    /// Count, line count and total from one consistent read.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.read(summarize)
    }

    /// Line items and total from one consistent read.
    #[must_use]
    pub fn checkout_view(&self) -> (Vec<CartLineItem>, Decimal) {
        self.read(|items| (items.to_vec(), total_of(items)))
    }

    // =========================================================================
    // Subscriptions and durability
    // =========================================================================

    /// Register a listener called after every change.
    ///
    /// The listener runs on the thread that made the change, after the cart's
    /// lock is released. Keep the returned guard alive for as long as the
    /// listener should fire.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CartEvent, &CartSummary) + Send + Sync + 'static,
    {
        self.inner.listeners.add(Arc::new(listener))
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Whether storage currently mirrors the in-memory cart.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.inner.durable.load(Ordering::Acquire)
    }

    /// Write the current cart to storage.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the snapshot cannot be encoded or written. The
    /// in-memory cart is unaffected either way.
    pub fn flush(&self) -> Result<(), CartError> {
        let items = self
            .inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let result = write_snapshot(self.inner.storage.as_ref(), &self.inner.key, &items);
        self.inner.durable.store(result.is_ok(), Ordering::Release);
        result
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn read<T>(&self, f: impl FnOnce(&[CartLineItem]) -> T) -> T {
        let items = self
            .inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&items)
    }

    /// Apply a change. `f` returns `None` when nothing changed.
    ///
    /// The snapshot is written while the write lock is held so storage sees
    /// mutations in the same order as memory. Listeners run after the lock is
    /// released.
    fn mutate(&self, f: impl FnOnce(&mut Vec<CartLineItem>) -> Option<CartEvent>) {
        let mut items = self
            .inner
            .items
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let event = f(&mut items);
        if event.is_none() && self.is_durable() {
            return;
        }

        self.persist(&items);
        let summary = summarize(&items);
        drop(items);

        if let Some(event) = event {
            self.inner.listeners.notify(&event, &summary);
        }
    }

    fn mutate_always(&self, f: impl FnOnce(&mut Vec<CartLineItem>) -> CartEvent) {
        self.mutate(|items| Some(f(items)));
    }

    fn persist(&self, items: &[CartLineItem]) {
        match write_snapshot(self.inner.storage.as_ref(), &self.inner.key, items) {
            Ok(()) => self.inner.durable.store(true, Ordering::Release),
            Err(e) => {
                self.inner.durable.store(false, Ordering::Release);
                warn!(
                    key = %self.inner.key,
                    error = %e,
                    "Failed to persist cart; continuing in memory"
                );
            }
        }
    }
}

fn write_snapshot(
    storage: &dyn KeyValueStorage,
    key: &str,
    items: &[CartLineItem],
) -> Result<(), CartError> {
    let encoded = snapshot::encode(items)?;
    storage.set(key, &encoded)?;
    Ok(())
}

/// Load the persisted cart. Returns the items and whether storage already
/// holds them in the current format.
fn hydrate(storage: &dyn KeyValueStorage, key: &str) -> (Vec<CartLineItem>, bool) {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "No persisted cart; starting empty");
            return (Vec::new(), true);
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read persisted cart; starting empty");
            return (Vec::new(), false);
        }
    };

    match snapshot::decode(&raw) {
        Ok(decoded) => {
            let durable = !decoded.needs_upgrade();
            if !durable {
                info!(
                    key,
                    from_version = decoded.version,
                    "Persisted cart uses an older layout; it will be rewritten on the next change"
                );
            }
            debug!(key, lines = decoded.items.len(), "Hydrated cart");
            (decoded.items, durable)
        }
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable persisted cart");
            (Vec::new(), false)
        }
    }
}

fn total_of(items: &[CartLineItem]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.line_total()))
}

fn count_of(items: &[CartLineItem]) -> u64 {
    items.iter().map(|line| u64::from(line.quantity)).sum()
}

fn summarize(items: &[CartLineItem]) -> CartSummary {
    CartSummary {
        item_count: count_of(items),
        distinct_items: items.len(),
        total: total_of(items),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Mutex;

    use shieldline_core::Price;

    use super::*;

    fn item(id: &str, price: &str) -> CartItem {
        CartItem::new(id, format!("Product {id}"), price.parse::<Price>().unwrap())
            .with_image(format!("/images/{id}.jpg"))
            .with_category("cameras")
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    /// Storage that fails every write and every read.
    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
    }

    #[test]
    fn test_empty_cart_queries() {
        let cart = CartStore::in_memory();
        assert!(cart.is_empty());
        assert_eq!(cart.cart_total(), Decimal::ZERO);
        assert_eq!(cart.cart_items_count(), 0);
        assert!(cart.items().is_empty());
    }

    #[test]
    fn test_add_merges_same_id() {
        let cart = CartStore::in_memory();
        cart.add_to_cart(item("cam1", "1299"), 2);
        cart.add_to_cart(item("cam1", "1299"), 3);

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let cart = CartStore::in_memory();
        cart.add_one(item("a", "1"));
        cart.add_one(item("b", "1"));
        cart.add_one(item("a", "1"));

        let ids: Vec<String> = cart.items().into_iter().map(|l| l.id.into_inner()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let cart = CartStore::in_memory();
        cart.add_to_cart(item("a", "10"), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let cart = CartStore::in_memory();
        cart.add_to_cart(item("a", "10"), 2);
        let before = cart.items();

        cart.remove_from_cart(&ProductId::new("missing"));

        assert_eq!(cart.items(), before);
        assert_eq!(cart.cart_total(), dec("20"));
        assert_eq!(cart.cart_items_count(), 2);
    }

    #[test]
    fn test_update_quantity_sets_exact_value() {
        let cart = CartStore::in_memory();
        cart.add_to_cart(item("a", "10"), 2);
        cart.update_quantity(&ProductId::new("a"), 7);
        assert_eq!(cart.line(&ProductId::new("a")).unwrap().quantity, 7);
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes() {
        let cart = CartStore::in_memory();
        cart.add_one(item("a", "10"));
        cart.add_one(item("b", "10"));

        cart.update_quantity(&ProductId::new("a"), 0);
        cart.update_quantity(&ProductId::new("b"), -1);

        assert!(!cart.contains(&ProductId::new("a")));
        assert!(!cart.contains(&ProductId::new("b")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_unknown_id_is_noop() {
        let cart = CartStore::in_memory();
        cart.add_one(item("a", "10"));
        cart.update_quantity(&ProductId::new("zzz"), 4);
        assert_eq!(cart.cart_items_count(), 1);
        assert!(!cart.contains(&ProductId::new("zzz")));
    }

    #[test]
    fn test_update_quantity_clamps_huge_values() {
        let cart = CartStore::in_memory();
        cart.add_one(item("a", "0"));
        cart.update_quantity(&ProductId::new("a"), i64::MAX);
        assert_eq!(cart.line(&ProductId::new("a")).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_security_scenario_totals() {
        let cart = CartStore::in_memory();
        cart.add_to_cart(item("cam1", "1299"), 1);
        cart.add_to_cart(item("ext1", "450"), 3);
        cart.add_to_cart(item("cam1", "1299"), 1);

        let items = cart.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id.as_str(), "cam1");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].id.as_str(), "ext1");
        assert_eq!(items[1].quantity, 3);
        assert_eq!(cart.cart_total(), dec("3948"));
        assert_eq!(cart.cart_items_count(), 5);
    }

    #[test]
    fn test_total_uses_decimal_prices() {
        let cart = CartStore::in_memory();
        cart.add_to_cart(item("a", "19.99"), 3);
        cart.add_to_cart(item("b", "0.10"), 2);
        assert_eq!(cart.cart_total(), dec("60.17"));
    }

    #[test]
    fn test_clear_resets_everything() {
        let cart = CartStore::in_memory();
        cart.add_to_cart(item("a", "10"), 2);
        cart.add_to_cart(item("b", "5"), 1);
        cart.clear_cart();

        assert!(cart.items().is_empty());
        assert_eq!(cart.cart_total(), Decimal::ZERO);
        assert_eq!(cart.cart_items_count(), 0);
    }

    #[test]
    fn test_reload_restores_cart() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let cart = CartStore::open(Arc::clone(&storage), DEFAULT_CART_KEY);
        cart.add_to_cart(item("p1", "100"), 2);

        let reloaded = CartStore::open(storage, DEFAULT_CART_KEY);
        let items = reloaded.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "p1");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(reloaded.cart_total(), dec("200"));
    }

    #[test]
    fn test_cleared_state_survives_reload() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let cart = CartStore::open(Arc::clone(&storage), DEFAULT_CART_KEY);
        cart.add_to_cart(item("p1", "100"), 2);
        cart.clear_cart();

        let reloaded = CartStore::open(storage, DEFAULT_CART_KEY);
        assert!(reloaded.is_empty());
        assert_eq!(reloaded.cart_total(), Decimal::ZERO);
    }

    #[test]
    fn test_corrupt_snapshot_opens_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(DEFAULT_CART_KEY, "{{{ definitely not json").unwrap();

        let cart = CartStore::open(storage.clone(), DEFAULT_CART_KEY);
        assert!(cart.is_empty());
        assert!(!cart.is_durable());

        // The first change overwrites the corrupt payload.
        cart.add_one(item("a", "1"));
        assert!(cart.is_durable());
        let reloaded = CartStore::open(storage, DEFAULT_CART_KEY);
        assert_eq!(reloaded.cart_items_count(), 1);
    }

    #[test]
    fn test_legacy_snapshot_upgraded_on_next_write() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                DEFAULT_CART_KEY,
                r#"[{"id":"cam1","name":"Camera","price":1299,"image":"","category":"cameras","quantity":1}]"#,
            )
            .unwrap();

        let cart = CartStore::open(storage.clone(), DEFAULT_CART_KEY);
        assert_eq!(cart.cart_total(), dec("1299"));

        cart.add_one(item("cam1", "1299"));
        let raw = storage.get(DEFAULT_CART_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["items"][0]["quantity"], 2);
    }

    #[test]
    fn test_write_failures_keep_memory_usable() {
        let cart = CartStore::open(Arc::new(BrokenStorage), DEFAULT_CART_KEY);
        assert!(cart.is_empty());

        cart.add_to_cart(item("a", "10"), 2);
        cart.update_quantity(&ProductId::new("a"), 3);
        cart.add_one(item("b", "1"));

        assert_eq!(cart.cart_items_count(), 4);
        assert_eq!(cart.cart_total(), dec("31"));
        assert!(!cart.is_durable());
        assert!(matches!(cart.flush(), Err(CartError::Storage(_))));
    }

    #[test]
    fn test_quota_exceeded_then_flush_recovers() {
        let storage = Arc::new(MemoryStorage::with_quota(200));
        let cart = CartStore::open(storage.clone(), DEFAULT_CART_KEY);
        cart.add_one(item("a", "1"));
        assert!(cart.is_durable());

        for n in 0..10 {
            cart.add_one(item(&format!("bulk-{n}"), "1"));
        }
        assert!(!cart.is_durable());
        assert_eq!(cart.items().len(), 11);

        // Shrinking the cart makes it fit again.
        for n in 0..10 {
            cart.remove_from_cart(&ProductId::new(format!("bulk-{n}")));
        }
        cart.flush().unwrap();
        assert!(cart.is_durable());
        assert_eq!(CartStore::open(storage, DEFAULT_CART_KEY).items().len(), 1);
    }

    #[test]
    fn test_remove_ordered_keeps_later_additions() {
        let cart = CartStore::in_memory();
        cart.add_to_cart(item("cam1", "1299"), 2);
        cart.add_to_cart(item("ext1", "450"), 1);
        let (ordered, _) = cart.checkout_view();

        // Arrives while the order is in flight
        cart.add_to_cart(item("cam1", "1299"), 1);
        cart.add_one(item("late", "75"));

        cart.remove_ordered(&ordered);

        assert!(!cart.contains(&ProductId::new("ext1")));
        assert_eq!(cart.line(&ProductId::new("cam1")).unwrap().quantity, 1);
        assert!(cart.contains(&ProductId::new("late")));
        assert_eq!(cart.cart_total(), Decimal::new(1374, 0));
    }

    #[test]
    fn test_remove_ordered_everything_clears() {
        let cart = CartStore::in_memory();
        cart.add_to_cart(item("cam1", "1299"), 2);
        let (ordered, _) = cart.checkout_view();

        cart.remove_ordered(&ordered);

        assert!(cart.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let cart = CartStore::in_memory();
        let badge = cart.clone();
        cart.add_to_cart(item("a", "5"), 4);
        assert_eq!(badge.cart_items_count(), 4);
    }

    #[test]
    fn test_subscribers_see_changes_until_dropped() {
        let cart = CartStore::in_memory();
        let seen: Arc<Mutex<Vec<(CartEvent, u64)>>> = Arc::default();

        let sink = Arc::clone(&seen);
        let sub = cart.subscribe(move |event, summary| {
            sink.lock().unwrap().push((event.clone(), summary.item_count));
        });
        assert_eq!(cart.subscriber_count(), 1);

        cart.add_to_cart(item("a", "5"), 2);
        cart.update_quantity(&ProductId::new("a"), 3);
        cart.remove_from_cart(&ProductId::new("missing"));
        cart.remove_from_cart(&ProductId::new("a"));
        cart.clear_cart();

        drop(sub);
        assert_eq!(cart.subscriber_count(), 0);
        cart.add_one(item("b", "1"));

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (
                    CartEvent::Added {
                        id: ProductId::new("a"),
                        quantity: 2
                    },
                    2
                ),
                (
                    CartEvent::QuantityUpdated {
                        id: ProductId::new("a"),
                        quantity: 3
                    },
                    3
                ),
                (
                    CartEvent::Removed {
                        id: ProductId::new("a")
                    },
                    0
                ),
                (CartEvent::Cleared, 0),
            ]
        );
    }

    #[test]
    fn test_listener_can_read_store() {
        let cart = CartStore::in_memory();
        let reader = cart.clone();
        let totals: Arc<Mutex<Vec<Decimal>>> = Arc::default();
        let sink = Arc::clone(&totals);

        let _sub = cart.subscribe(move |_, _| {
            sink.lock().unwrap().push(reader.cart_total());
        });
        cart.add_to_cart(item("a", "2.50"), 2);

        assert_eq!(*totals.lock().unwrap(), vec![dec("5.00")]);
    }
}
