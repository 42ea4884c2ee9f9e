//! Change notifications for cart consumers.
//!
//! A cart badge and a cart page both render from the same store. Each one
//! subscribes with a listener and holds the returned [`Subscription`] for as
//! long as it is mounted; dropping the guard unsubscribes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use rust_decimal::Decimal;

use shieldline_core::ProductId;

/// What changed in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// Units of a product were added; `quantity` is the line's new quantity.
    Added { id: ProductId, quantity: u32 },
    /// A line item was removed.
    Removed { id: ProductId },
    /// A line item's quantity was set.
    QuantityUpdated { id: ProductId, quantity: u32 },
    /// The cart was emptied.
    Cleared,
    /// An accepted order took its lines; `remaining` lines were added while
    /// it was being placed and stay in the cart.
    Ordered { remaining: usize },
}

/// Derived figures a consumer typically renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    /// Total units across all lines.
    pub item_count: u64,
    /// Number of line items.
    pub distinct_items: usize,
    /// Sum of `price × quantity`.
    pub total: Decimal,
}

pub(crate) type Listener = Arc<dyn Fn(&CartEvent, &CartSummary) + Send + Sync>;

/// Registered listeners of one store.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener)>>,
}

impl Listeners {
    pub(crate) fn add(self: &Arc<Self>, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        Subscription {
            id,
            listeners: Arc::downgrade(self),
        }
    }

    fn remove(&self, id: u64) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(entry_id, _)| *entry_id != id);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Invoke every listener.
    ///
    /// The list is copied first so listeners may read the store, subscribe,
    /// or drop their own subscription while being notified.
    pub(crate) fn notify(&self, event: &CartEvent, summary: &CartSummary) {
        let current: Vec<Listener> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in current {
            listener(event, summary);
        }
    }
}

/// Handle to a registered listener. Unsubscribes on drop.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    /// Unsubscribe now rather than at scope end.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counting(counter: &Arc<AtomicUsize>) -> Listener {
        let counter = Arc::clone(counter);
        Arc::new(move |_: &CartEvent, _: &CartSummary| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_drop_unsubscribes() {
        let listeners = Arc::new(Listeners::default());
        let hits = Arc::new(AtomicUsize::new(0));

        let sub = listeners.add(counting(&hits));
        listeners.notify(&CartEvent::Cleared, &CartSummary::default());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(sub);
        assert_eq!(listeners.len(), 0);
        listeners.notify(&CartEvent::Cleared, &CartSummary::default());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_only_removes_own_listener() {
        let listeners = Arc::new(Listeners::default());
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let a = listeners.add(counting(&first));
        let _b = listeners.add(counting(&second));
        a.unsubscribe();

        listeners.notify(&CartEvent::Cleared, &CartSummary::default());
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_outliving_listeners_is_harmless() {
        let listeners = Arc::new(Listeners::default());
        let sub = listeners.add(Arc::new(|_: &CartEvent, _: &CartSummary| {}));
        drop(listeners);
        drop(sub);
    }
}
