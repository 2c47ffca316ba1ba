//! # Favorites Module
//!
//! Favorite recipes and a capped, most-recent-first view history, stored
//! together under one key.

use crate::reconciliation_bus::{Event, ReconciliationBus};
use crate::storage::Store;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::debug;

/// Default number of history entries returned by [`Favorites::history`]
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// One viewed recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "recipeId")]
    pub recipe_id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Favorites and history as persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone)]
pub struct Favorites {
    store: Rc<Store>,
    bus: ReconciliationBus,
}

impl Favorites {
    pub fn new(store: Rc<Store>, bus: ReconciliationBus) -> Self {
        Self { store, bus }
    }

    /// Favorite recipe ids, oldest first
    pub fn ids(&self) -> Vec<String> {
        self.store.user_data().favorites
    }

    pub fn is_favorite(&self, recipe_id: &str) -> bool {
        self.ids().iter().any(|id| id == recipe_id)
    }

    /// Add a favorite; already present is a no-op
    pub fn add(&self, recipe_id: &str) -> bool {
        let mut data = self.store.user_data();
        if data.favorites.iter().any(|id| id == recipe_id) {
            return false;
        }
        data.favorites.push(recipe_id.to_string());
        self.store.set_user_data(&data);
        true
    }

    /// Remove a favorite and publish [`Event::FavoriteRemoved`]
    pub fn remove(&self, recipe_id: &str) -> bool {
        let mut data = self.store.user_data();
        let before = data.favorites.len();
        data.favorites.retain(|id| id != recipe_id);
        if data.favorites.len() == before {
            return false;
        }
        self.store.set_user_data(&data);
        self.bus.publish(&Event::FavoriteRemoved {
            recipe_id: recipe_id.to_string(),
        });
        true
    }

    /// Flip favorite state, returning whether the recipe is now a favorite
    pub fn toggle(&self, recipe_id: &str) -> bool {
        if self.is_favorite(recipe_id) {
            self.remove(recipe_id);
            false
        } else {
            self.add(recipe_id)
        }
    }

    /// Record a view at the front of the history
    ///
    /// An earlier entry for the same recipe is dropped and the history is
    /// capped at the configured size.
    pub fn record_view(&self, recipe_id: &str) {
        let mut data = self.store.user_data();
        data.history.retain(|entry| entry.recipe_id != recipe_id);
        data.history.insert(
            0,
            HistoryEntry {
                recipe_id: recipe_id.to_string(),
                timestamp: Utc::now().timestamp_millis(),
            },
        );
        data.history.truncate(self.store.config().max_history_entries);
        debug!("Recorded view of recipe {}", recipe_id);
        self.store.set_user_data(&data);
    }

    /// Most recent history entries, at most `limit`
    pub fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        let mut history = self.store.user_data().history;
        history.truncate(limit);
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation_bus::Topic;
    use std::cell::RefCell;

    fn favorites() -> Favorites {
        Favorites::new(Rc::new(Store::in_memory()), ReconciliationBus::new())
    }

    #[test]
    fn test_add_is_idempotent() {
        let favs = favorites();
        assert!(favs.add("1"));
        assert!(!favs.add("1"));
        assert_eq!(favs.ids(), vec!["1".to_string()]);
    }

    #[test]
    fn test_remove_publishes() {
        let bus = ReconciliationBus::new();
        let removed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&removed);
        let _sub = bus.subscribe(Topic::FavoriteRemoved, move |event| {
            if let Event::FavoriteRemoved { recipe_id } = event {
                sink.borrow_mut().push(recipe_id.clone());
            }
        });
        let favs = Favorites::new(Rc::new(Store::in_memory()), bus);

        assert!(favs.toggle("7"));
        assert!(!favs.toggle("7"));
        assert!(!favs.remove("7"));
        assert_eq!(*removed.borrow(), vec!["7".to_string()]);
    }

    #[test]
    fn test_history_is_unique_and_capped() {
        let favs = favorites();
        for id in 0..60 {
            favs.record_view(&id.to_string());
        }
        favs.record_view("30");

        let history = favs.history(100);
        assert_eq!(history.len(), 50);
        assert_eq!(history[0].recipe_id, "30");
        assert_eq!(history.iter().filter(|e| e.recipe_id == "30").count(), 1);
        assert_eq!(favs.history(DEFAULT_HISTORY_LIMIT).len(), 10);
    }

    #[test]
    fn test_user_data_json_shape() {
        let data: UserData = serde_json::from_str(
            r#"{"favorites":["1"],"history":[{"recipeId":"1","timestamp":1700000000000}]}"#,
        )
        .unwrap();
        assert_eq!(data.history[0].recipe_id, "1");

        let partial: UserData = serde_json::from_str("{}").unwrap();
        assert!(partial.favorites.is_empty());
    }
}
