//! # Reconciliation Bus Module
//!
//! A typed, synchronous publish/subscribe bus that keeps the derived views
//! consistent after a mutation of the shared store.
//!
//! ## Delivery
//!
//! - handlers run on the publishing thread, in subscription order
//! - an event published from inside a handler is delivered depth-first
//! - a handler that is already running is skipped rather than re-entered
//!
//! Payloads are advisory. Subscribers re-read the [`crate::storage::Store`]
//! to recompute their view and never treat the payload as the source of truth.
//!
//! ## Usage
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use whattoeat::reconciliation_bus::{Event, ReconciliationBus, Topic};
//!
//! let bus = ReconciliationBus::new();
//! let seen = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&seen);
//! let subscription = bus.subscribe(Topic::PantryChanged, move |_| counter.set(counter.get() + 1));
//!
//! assert_eq!(bus.publish(&Event::PantryChanged), 1);
//! subscription.unsubscribe();
//! assert_eq!(bus.publish(&Event::PantryChanged), 0);
//! assert_eq!(seen.get(), 1);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Notification topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Pantry membership changed
    PantryChanged,
    /// A recipe was added to or removed from the menu
    MenuChanged,
    /// Items were checked off on a shopping run
    PurchaseMade,
    /// The shopping list was regenerated
    ShoppingListReset,
    /// Someone asked for the shopping list to be shown
    ShoppingListOpenRequest,
    /// The recipe list should be recomputed
    RecipesNeedRefresh,
    /// A recipe was removed from favorites
    FavoriteRemoved,
}

/// Tagged event, one variant per topic
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PantryChanged,
    MenuChanged {
        /// Recipe added or removed, `None` for a bulk change
        recipe_id: Option<String>,
    },
    PurchaseMade {
        /// Names newly added to the purchased set
        ingredients: Vec<String>,
    },
    ShoppingListReset,
    ShoppingListOpenRequest,
    RecipesNeedRefresh,
    FavoriteRemoved {
        recipe_id: String,
    },
}

impl Event {
    /// Topic this event is delivered on
    pub fn topic(&self) -> Topic {
        match self {
            Event::PantryChanged => Topic::PantryChanged,
            Event::MenuChanged { .. } => Topic::MenuChanged,
            Event::PurchaseMade { .. } => Topic::PurchaseMade,
            Event::ShoppingListReset => Topic::ShoppingListReset,
            Event::ShoppingListOpenRequest => Topic::ShoppingListOpenRequest,
            Event::RecipesNeedRefresh => Topic::RecipesNeedRefresh,
            Event::FavoriteRemoved { .. } => Topic::FavoriteRemoved,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Topic::PantryChanged => "pantry-changed",
            Topic::MenuChanged => "menu-changed",
            Topic::PurchaseMade => "purchase-made",
            Topic::ShoppingListReset => "shopping-list-reset",
            Topic::ShoppingListOpenRequest => "shopping-list-open-request",
            Topic::RecipesNeedRefresh => "recipes-need-refresh",
            Topic::FavoriteRemoved => "favorite-removed",
        };
        write!(f, "{}", name)
    }
}

type Handler = Rc<RefCell<dyn FnMut(&Event)>>;

struct HandlerEntry {
    id: u64,
    topic: Topic,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    handlers: Vec<HandlerEntry>,
}

/// Synchronous single-threaded event bus
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct ReconciliationBus {
    inner: Rc<RefCell<BusInner>>,
}

/// Handle returned by [`ReconciliationBus::subscribe`]
///
/// Dropping the handle keeps the subscription alive; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    topic: Topic,
    bus: Weak<RefCell<BusInner>>,
}

impl Subscription {
    /// Topic of this subscription
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Remove the handler from the bus
    pub fn unsubscribe(self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.borrow_mut().handlers.retain(|entry| entry.id != self.id);
            debug!("Unsubscribed handler {} from {}", self.id, self.topic);
        }
    }
}

impl ReconciliationBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a topic
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: FnMut(&Event) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.handlers.push(HandlerEntry {
            id,
            topic,
            handler: Rc::new(RefCell::new(handler)),
        });
        debug!("Subscribed handler {} to {}", id, topic);

        Subscription {
            id,
            topic,
            bus: Rc::downgrade(&self.inner),
        }
    }

    /// Deliver an event to every handler of its topic
    ///
    /// # Returns
    ///
    /// Number of handlers invoked
    pub fn publish(&self, event: &Event) -> usize {
        let topic = event.topic();
        // Snapshot so handlers may subscribe, unsubscribe or publish
        let handlers: Vec<(u64, Handler)> = self
            .inner
            .borrow()
            .handlers
            .iter()
            .filter(|entry| entry.topic == topic)
            .map(|entry| (entry.id, Rc::clone(&entry.handler)))
            .collect();

        trace!("Publishing {} to {} handlers", topic, handlers.len());

        let mut delivered = 0;
        for (id, handler) in handlers {
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    (&mut *handler)(event);
                    delivered += 1;
                }
                Err(_) => warn!("Handler {} is already running, skipping re-entrant {}", id, topic),
            }
        }
        delivered
    }

    /// Number of handlers currently subscribed to a topic
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner
            .borrow()
            .handlers
            .iter()
            .filter(|entry| entry.topic == topic)
            .count()
    }
}

impl fmt::Debug for ReconciliationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconciliationBus")
            .field("handlers", &self.inner.borrow().handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_in_subscription_order() {
        let bus = ReconciliationBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            let _ = bus.subscribe(Topic::MenuChanged, move |_| log.borrow_mut().push(name));
        }

        let delivered = bus.publish(&Event::MenuChanged { recipe_id: None });
        assert_eq!(delivered, 3);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_topics_are_isolated() {
        let bus = ReconciliationBus::new();
        let _sub = bus.subscribe(Topic::PantryChanged, |_| {});
        assert_eq!(bus.publish(&Event::ShoppingListReset), 0);
        assert_eq!(bus.subscriber_count(Topic::PantryChanged), 1);
    }

    #[test]
    fn test_nested_publish_is_depth_first() {
        let bus = ReconciliationBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_bus = bus.clone();
        let outer_log = Rc::clone(&log);
        let _a = bus.subscribe(Topic::PurchaseMade, move |_| {
            outer_log.borrow_mut().push("purchase");
            inner_bus.publish(&Event::PantryChanged);
        });
        let pantry_log = Rc::clone(&log);
        let _b = bus.subscribe(Topic::PantryChanged, move |_| pantry_log.borrow_mut().push("pantry"));
        let tail_log = Rc::clone(&log);
        let _c = bus.subscribe(Topic::PurchaseMade, move |_| tail_log.borrow_mut().push("purchase-2"));

        bus.publish(&Event::PurchaseMade { ingredients: vec![] });
        assert_eq!(*log.borrow(), vec!["purchase", "pantry", "purchase-2"]);
    }

    #[test]
    fn test_reentrant_handler_is_skipped() {
        let bus = ReconciliationBus::new();
        let calls = Rc::new(RefCell::new(0));

        let inner_bus = bus.clone();
        let counter = Rc::clone(&calls);
        let _sub = bus.subscribe(Topic::RecipesNeedRefresh, move |_| {
            *counter.borrow_mut() += 1;
            // Would recurse forever without the re-entrancy guard
            assert_eq!(inner_bus.publish(&Event::RecipesNeedRefresh), 0);
        });

        assert_eq!(bus.publish(&Event::RecipesNeedRefresh), 1);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_unsubscribe_after_bus_dropped_is_noop() {
        let bus = ReconciliationBus::new();
        let sub = bus.subscribe(Topic::FavoriteRemoved, |_| {});
        drop(bus);
        sub.unsubscribe();
    }

    #[test]
    fn test_topic_names() {
        assert_eq!(Topic::ShoppingListOpenRequest.to_string(), "shopping-list-open-request");
        assert_eq!(
            Event::FavoriteRemoved { recipe_id: "3".into() }.topic(),
            Topic::FavoriteRemoved
        );
    }
}
