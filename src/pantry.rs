//! # Pantry Module
//!
//! The user's durable set of always-available ingredients, plus the set of
//! names checked off on shopping runs. Every mutation writes through the
//! [`Store`] and publishes [`Event::PantryChanged`] when something changed.

use crate::reconciliation_bus::{Event, ReconciliationBus};
use crate::storage::{Store, PANTRY_KEY};
use crate::storage_errors::EngineError;
use std::rc::Rc;
use tracing::{debug, info};

/// Pantry contents written on first use
pub const DEFAULT_PANTRY: [&str; 8] = ["盐", "糖", "酱油", "醋", "蒜", "姜", "葱", "鸡蛋"];

/// Preset ingredient groups that can be added or removed at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PantryGroup {
    Vegetable,
    Meat,
    Seasoning,
    Staple,
}

impl PantryGroup {
    /// All groups in display order
    pub const ALL: [PantryGroup; 4] = [
        PantryGroup::Vegetable,
        PantryGroup::Meat,
        PantryGroup::Seasoning,
        PantryGroup::Staple,
    ];

    /// Ingredients of the group
    pub fn items(&self) -> &'static [&'static str] {
        match self {
            PantryGroup::Vegetable => &["番茄", "土豆", "洋葱", "胡萝卜", "白菜", "青椒", "蒜", "姜", "葱"],
            PantryGroup::Meat => &["鸡蛋", "猪肉", "鸡肉"],
            PantryGroup::Seasoning => &[
                "盐", "糖", "酱油", "醋", "料酒", "蚝油", "豆瓣酱", "胡椒粉", "辣椒",
            ],
            PantryGroup::Staple => &["大米", "面条"],
        }
    }
}

/// Outcome of folding purchased names into the pantry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Absorbed {
    /// Names that were not yet in the pantry
    pub added_to_pantry: Vec<String>,
    /// Names that were newly recorded as purchased
    pub newly_purchased: Vec<String>,
}

/// Pantry operations over the shared store
#[derive(Debug, Clone)]
pub struct Pantry {
    store: Rc<Store>,
    bus: ReconciliationBus,
}

impl Pantry {
    pub fn new(store: Rc<Store>, bus: ReconciliationBus) -> Self {
        Self { store, bus }
    }

    /// Write the default subset when the pantry has never been stored
    ///
    /// # Returns
    ///
    /// `true` if the defaults were written
    pub fn ensure_initialized(&self) -> bool {
        if self.store.contains(PANTRY_KEY) {
            return false;
        }
        let defaults: Vec<String> = DEFAULT_PANTRY.iter().map(|s| s.to_string()).collect();
        self.store.set_pantry(&defaults);
        info!("Initialized pantry with {} default items", defaults.len());
        true
    }

    /// Current pantry contents
    pub fn items(&self) -> Vec<String> {
        self.store.pantry()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items().iter().any(|item| item == name.trim())
    }

    /// Check user supplied ingredient text
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidIngredient`] for empty or overlong names.
    pub fn validate(&self, name: &str) -> Result<String, EngineError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidIngredient("name is empty".to_string()));
        }
        let limit = self.store.config().max_ingredient_length;
        if trimmed.chars().count() > limit {
            return Err(EngineError::InvalidIngredient(format!(
                "name longer than {limit} characters"
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Add one ingredient; a duplicate is a no-op
    ///
    /// # Returns
    ///
    /// Whether the pantry changed
    pub fn add(&self, name: &str) -> Result<bool, EngineError> {
        let name = self.validate(name)?;
        let mut items = self.items();
        if items.contains(&name) {
            debug!("'{}' already in pantry", name);
            return Ok(false);
        }
        items.push(name);
        self.commit(&items);
        Ok(true)
    }

    /// Remove one ingredient; a missing name is a no-op
    pub fn remove(&self, name: &str) -> bool {
        let name = name.trim();
        let mut items = self.items();
        let before = items.len();
        items.retain(|item| item != name);
        if items.len() == before {
            return false;
        }
        self.commit(&items);
        true
    }

    /// Flip membership of an ingredient
    ///
    /// # Returns
    ///
    /// Whether the ingredient is in the pantry afterwards
    pub fn toggle(&self, name: &str) -> Result<bool, EngineError> {
        if self.contains(name) {
            self.remove(name);
            Ok(false)
        } else {
            self.add(name)
        }
    }

    /// Add every ingredient of a preset group, returning how many were new
    pub fn add_group(&self, group: PantryGroup) -> usize {
        let names: Vec<String> = group.items().iter().map(|s| s.to_string()).collect();
        self.merge(&names)
    }

    /// Remove every ingredient of a preset group, returning how many were present
    pub fn remove_group(&self, group: PantryGroup) -> usize {
        let mut items = self.items();
        let before = items.len();
        items.retain(|item| !group.items().contains(&item.as_str()));
        let removed = before - items.len();
        if removed > 0 {
            self.commit(&items);
        }
        removed
    }

    /// Add several names at once, skipping duplicates and invalid names
    pub fn merge<S: AsRef<str>>(&self, names: &[S]) -> usize {
        let mut items = self.items();
        let mut added = 0;
        for name in names {
            let Ok(name) = self.validate(name.as_ref()) else {
                continue;
            };
            if !items.contains(&name) {
                items.push(name);
                added += 1;
            }
        }
        if added > 0 {
            self.commit(&items);
        }
        added
    }

    /// Replace the whole pantry
    pub fn replace<S: AsRef<str>>(&self, names: &[S]) {
        let mut items: Vec<String> = Vec::new();
        for name in names {
            if let Ok(name) = self.validate(name.as_ref()) {
                if !items.contains(&name) {
                    items.push(name);
                }
            }
        }
        self.commit(&items);
    }

    /// Names checked off on shopping runs
    pub fn purchased(&self) -> Vec<String> {
        self.store.purchased()
    }

    /// Forget all purchases
    pub fn clear_purchased(&self) {
        if self.store.purchased().is_empty() {
            return;
        }
        self.store.set_purchased(&[]);
        self.bus.publish(&Event::PantryChanged);
    }

    /// Fold purchased names into the pantry without publishing
    ///
    /// A name goes to the purchased set only when it was newly added to the
    /// pantry.
    pub(crate) fn absorb(&self, names: &[String]) -> Absorbed {
        let mut pantry = self.items();
        let mut purchased = self.purchased();
        let mut outcome = Absorbed::default();

        for name in names {
            if pantry.contains(name) {
                continue;
            }
            pantry.push(name.clone());
            outcome.added_to_pantry.push(name.clone());
            if !purchased.contains(name) {
                purchased.push(name.clone());
                outcome.newly_purchased.push(name.clone());
            }
        }

        if !outcome.added_to_pantry.is_empty() {
            self.store.set_pantry(&pantry);
        }
        if !outcome.newly_purchased.is_empty() {
            self.store.set_purchased(&purchased);
        }
        outcome
    }

    fn commit(&self, items: &[String]) {
        self.store.set_pantry(items);
        debug!("Pantry now holds {} items", items.len());
        self.bus.publish(&Event::PantryChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation_bus::Topic;
    use std::cell::Cell;

    fn pantry() -> (Pantry, Rc<Cell<usize>>, ReconciliationBus) {
        let bus = ReconciliationBus::new();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let _sub = bus.subscribe(Topic::PantryChanged, move |_| counter.set(counter.get() + 1));
        (Pantry::new(Rc::new(Store::in_memory()), bus.clone()), count, bus)
    }

    #[test]
    fn test_default_subset_written_once() {
        let (pantry, _, _) = pantry();
        assert!(pantry.ensure_initialized());
        assert_eq!(pantry.items().len(), 8);
        assert!(pantry.contains("鸡蛋"));

        pantry.remove("鸡蛋");
        assert!(!pantry.ensure_initialized());
        assert!(!pantry.contains("鸡蛋"));
    }

    #[test]
    fn test_add_is_idempotent() {
        let (pantry, events, _) = pantry();
        assert!(pantry.add(" 番茄 ").unwrap());
        assert!(!pantry.add("番茄").unwrap());
        assert_eq!(pantry.items(), vec!["番茄".to_string()]);
        assert_eq!(events.get(), 1);
    }

    #[test]
    fn test_add_rejects_invalid_names() {
        let (pantry, events, _) = pantry();
        assert!(matches!(pantry.add("   "), Err(EngineError::InvalidIngredient(_))));
        let long = "菜".repeat(51);
        assert!(pantry.add(&long).is_err());
        assert!(pantry.add(&"菜".repeat(50)).is_ok());
        assert_eq!(events.get(), 1);
    }

    #[test]
    fn test_toggle_and_groups() {
        let (pantry, _, _) = pantry();
        assert!(pantry.toggle("葱").unwrap());
        assert!(!pantry.toggle("葱").unwrap());

        assert_eq!(pantry.add_group(PantryGroup::Staple), 2);
        assert_eq!(pantry.add_group(PantryGroup::Staple), 0);
        pantry.add("燕麦").unwrap();
        assert_eq!(pantry.remove_group(PantryGroup::Staple), 2);
        assert_eq!(pantry.items(), vec!["燕麦".to_string()]);
    }

    #[test]
    fn test_absorb_records_only_new_pantry_items() {
        let (pantry, events, _) = pantry();
        pantry.add("盐").unwrap();
        let outcome = pantry.absorb(&["盐".to_string(), "番茄".to_string()]);

        assert_eq!(outcome.added_to_pantry, vec!["番茄".to_string()]);
        assert_eq!(outcome.newly_purchased, vec!["番茄".to_string()]);
        assert_eq!(pantry.purchased(), vec!["番茄".to_string()]);
        // absorb leaves publishing to the caller
        assert_eq!(events.get(), 1);

        pantry.clear_purchased();
        assert!(pantry.purchased().is_empty());
        assert_eq!(events.get(), 2);
    }
}
