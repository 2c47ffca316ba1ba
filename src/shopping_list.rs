//! # Shopping List Module
//!
//! Deduplicates and categorizes ingredients into a purchasable list, and
//! feeds checked-off items back into the pantry.
//!
//! ## Identity
//!
//! Items are unique on their canonical name: `"番茄 300g"` and `"番茄 500g"`
//! are the same item, and the entry added first is kept.
//!
//! ## Checking items off
//!
//! Checking an item adds its canonical name to the pantry (and to the
//! purchased set when it was new to the pantry). Unchecking only flips the
//! flag; pantry and purchased set stay as they are.

use crate::measurement_patterns::CANONICAL_NAME_REGEX;
use crate::pantry::Pantry;
use crate::reconciliation_bus::{Event, ReconciliationBus};
use crate::storage::Store;
use crate::storage_errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info};

/// Shopping categories, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Vegetable,
    Meat,
    Seasoning,
    Staple,
    Other,
}

impl IngredientCategory {
    /// All categories in display order
    pub const ALL: [IngredientCategory; 5] = [
        IngredientCategory::Vegetable,
        IngredientCategory::Meat,
        IngredientCategory::Seasoning,
        IngredientCategory::Staple,
        IngredientCategory::Other,
    ];

    /// Stable identifier used for localization keys
    pub fn key(&self) -> &'static str {
        match self {
            IngredientCategory::Vegetable => "vegetable",
            IngredientCategory::Meat => "meat",
            IngredientCategory::Seasoning => "seasoning",
            IngredientCategory::Staple => "staple",
            IngredientCategory::Other => "other",
        }
    }
}

impl fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Ordered morpheme rules; the first category with a hit wins
const CATEGORY_RULES: [(IngredientCategory, &[&str]); 4] = [
    (
        IngredientCategory::Vegetable,
        &["番茄", "土豆", "菜", "瓜", "萝卜", "葱", "蒜", "姜", "椒", "豆", "茄子", "洋葱"],
    ),
    (IngredientCategory::Meat, &["肉", "鸡", "鸭", "鱼", "虾", "蛋", "奶"]),
    (
        IngredientCategory::Seasoning,
        &["盐", "糖", "油", "酱", "醋", "酒", "粉", "椒"],
    ),
    (IngredientCategory::Staple, &["米", "面", "粉", "包"]),
];

/// Classify a canonical ingredient name
///
/// # Examples
///
/// ```rust
/// use whattoeat::shopping_list::{categorize, IngredientCategory};
///
/// assert_eq!(categorize("番茄"), IngredientCategory::Vegetable);
/// assert_eq!(categorize("酱油"), IngredientCategory::Seasoning);
/// assert_eq!(categorize("燕麦"), IngredientCategory::Other);
/// ```
pub fn categorize(name: &str) -> IngredientCategory {
    let name = name.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, morphemes)| morphemes.iter().any(|m| name.contains(m)))
        .map(|(category, _)| *category)
        .unwrap_or(IngredientCategory::Other)
}

/// Strip a trailing quantity from a display string
///
/// Takes the leading run of non-digit, non-whitespace tokens. A string with
/// no such run is returned whole.
pub fn canonical_name(display: &str) -> String {
    match CANONICAL_NAME_REGEX.captures(display) {
        Some(caps) => caps[1].trim().to_string(),
        None => display.to_string(),
    }
}

/// One line of the shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    /// Display string, may carry a quantity ("番茄 300g")
    pub name: String,
    /// Canonical name, the identity key
    #[serde(rename = "pureName")]
    pub pure_name: String,
    pub category: IngredientCategory,
    pub checked: bool,
}

impl ShoppingItem {
    /// Build an unchecked item from a display string
    pub fn from_display(display: &str) -> Self {
        let display = display.trim();
        let pure_name = canonical_name(display);
        Self {
            category: categorize(&pure_name),
            name: display.to_string(),
            pure_name,
            checked: false,
        }
    }
}

/// Counts shown in the list header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSummary {
    pub total: usize,
    pub checked: usize,
}

/// Items of one category with their positions in the full list
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub category: IngredientCategory,
    pub items: Vec<(usize, ShoppingItem)>,
}

/// Shopping list operations over the shared store
#[derive(Debug, Clone)]
pub struct ShoppingListReconciler {
    store: Rc<Store>,
    bus: ReconciliationBus,
    pantry: Pantry,
}

/// Append the items whose canonical name is not yet present
///
/// Earlier entries (existing or earlier in the batch) win.
fn union_on_canonical<S: AsRef<str>>(list: &mut Vec<ShoppingItem>, displays: &[S]) -> Vec<ShoppingItem> {
    let mut appended = Vec::new();
    for display in displays {
        if display.as_ref().trim().is_empty() {
            continue;
        }
        let item = ShoppingItem::from_display(display.as_ref());
        if list.iter().any(|existing| existing.pure_name == item.pure_name) {
            debug!("Skipping '{}', '{}' already listed", item.name, item.pure_name);
            continue;
        }
        list.push(item.clone());
        appended.push(item);
    }
    appended
}

impl ShoppingListReconciler {
    pub fn new(store: Rc<Store>, bus: ReconciliationBus) -> Self {
        let pantry = Pantry::new(Rc::clone(&store), bus.clone());
        Self { store, bus, pantry }
    }

    /// Current list
    pub fn items(&self) -> Vec<ShoppingItem> {
        self.store.shopping_list()
    }

    /// Add display strings, deduplicated on canonical name
    ///
    /// # Returns
    ///
    /// The items actually appended
    pub fn add_missing<S: AsRef<str>>(&self, displays: &[S]) -> Vec<ShoppingItem> {
        let mut list = self.items();
        let appended = union_on_canonical(&mut list, displays);
        if !appended.is_empty() {
            self.store.set_shopping_list(&list);
            info!("Added {} items to the shopping list", appended.len());
        }
        appended
    }

    /// Replace the whole list in one write
    ///
    /// The new batch is deduplicated the same way as [`Self::add_missing`].
    pub fn replace<S: AsRef<str>>(&self, displays: &[S]) -> Vec<ShoppingItem> {
        let mut list = Vec::new();
        union_on_canonical(&mut list, displays);
        self.store.replace_shopping_list(&list);
        list
    }

    /// Flip the checked flag of one item
    ///
    /// # Returns
    ///
    /// The new checked state
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidIndex`] if `index` is out of range.
    pub fn toggle(&self, index: usize) -> Result<bool, EngineError> {
        let mut list = self.items();
        let len = list.len();
        let item = list
            .get_mut(index)
            .ok_or(EngineError::InvalidIndex { index, len })?;
        item.checked = !item.checked;
        let checked = item.checked;
        let name = item.pure_name.clone();
        self.store.set_shopping_list(&list);

        if checked {
            let absorbed = self.pantry.absorb(&[name]);
            self.bus.publish(&Event::PantryChanged);
            if !absorbed.newly_purchased.is_empty() {
                self.bus.publish(&Event::PurchaseMade {
                    ingredients: absorbed.newly_purchased,
                });
            }
        }
        Ok(checked)
    }

    /// Check every unchecked item in one batch
    ///
    /// Publishes a single pantry notification (and a single purchase
    /// notification when the purchased set grew).
    ///
    /// # Returns
    ///
    /// Number of items that were checked by this call
    pub fn check_all(&self) -> usize {
        let mut list = self.items();
        let names: Vec<String> = list
            .iter_mut()
            .filter(|item| !item.checked)
            .map(|item| {
                item.checked = true;
                item.pure_name.clone()
            })
            .collect();
        if names.is_empty() {
            return 0;
        }

        self.store.set_shopping_list(&list);
        let absorbed = self.pantry.absorb(&names);
        self.bus.publish(&Event::PantryChanged);
        if !absorbed.newly_purchased.is_empty() {
            self.bus.publish(&Event::PurchaseMade {
                ingredients: absorbed.newly_purchased,
            });
        }
        info!("Checked off {} shopping items", names.len());
        names.len()
    }

    /// Remove one item
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidIndex`] if `index` is out of range.
    pub fn remove(&self, index: usize) -> Result<ShoppingItem, EngineError> {
        let mut list = self.items();
        if index >= list.len() {
            return Err(EngineError::InvalidIndex {
                index,
                len: list.len(),
            });
        }
        let removed = list.remove(index);
        self.store.set_shopping_list(&list);
        Ok(removed)
    }

    /// Empty the list
    pub fn clear(&self) {
        self.store.replace_shopping_list(&[]);
    }

    /// Items grouped by category, in category order, empty groups omitted
    pub fn grouped(&self) -> Vec<CategoryGroup> {
        let items = self.items();
        IngredientCategory::ALL
            .iter()
            .filter_map(|category| {
                let members: Vec<(usize, ShoppingItem)> = items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| item.category == *category)
                    .map(|(index, item)| (index, item.clone()))
                    .collect();
                (!members.is_empty()).then_some(CategoryGroup {
                    category: *category,
                    items: members,
                })
            })
            .collect()
    }

    pub fn summary(&self) -> ListSummary {
        let items = self.items();
        ListSummary {
            total: items.len(),
            checked: items.iter().filter(|item| item.checked).count(),
        }
    }

    /// Plain text rendering, one `✓`/`○` prefixed line per item
    pub fn export_text(&self) -> String {
        self.items()
            .iter()
            .map(|item| format!("{} {}", if item.checked { "✓" } else { "○" }, item.name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconciler() -> ShoppingListReconciler {
        ShoppingListReconciler::new(Rc::new(Store::in_memory()), ReconciliationBus::new())
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("番茄 300g"), "番茄");
        assert_eq!(canonical_name("番茄"), "番茄");
        assert_eq!(canonical_name("红 椒 2个"), "红 椒");
        assert_eq!(canonical_name("300g"), "300g");
    }

    #[test]
    fn test_category_rule_order() {
        // "椒" is both a vegetable and a seasoning morpheme
        assert_eq!(categorize("花椒"), IngredientCategory::Vegetable);
        // "粉" is seasoning before staple
        assert_eq!(categorize("面粉"), IngredientCategory::Seasoning);
        assert_eq!(categorize("牛奶"), IngredientCategory::Meat);
        assert_eq!(categorize("大米"), IngredientCategory::Staple);
    }

    #[test]
    fn test_add_missing_dedups_on_canonical_name() {
        let list = reconciler();
        let first = list.add_missing(&["番茄 300g"]);
        assert_eq!(first.len(), 1);
        let second = list.add_missing(&["番茄 500g", "葱 1根", "葱 2根"]);
        assert_eq!(second.len(), 1);

        let items = list.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "番茄 300g");
        assert_eq!(items[1].name, "葱 1根");
    }

    #[test]
    fn test_toggle_out_of_range() {
        let list = reconciler();
        assert_eq!(
            list.toggle(0),
            Err(EngineError::InvalidIndex { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_grouped_and_export() {
        let list = reconciler();
        list.add_missing(&["盐 6g", "番茄 300g", "猪肉 300g"]);
        list.toggle(0).unwrap();

        let groups = list.grouped();
        let order: Vec<IngredientCategory> = groups.iter().map(|g| g.category).collect();
        assert_eq!(
            order,
            vec![
                IngredientCategory::Vegetable,
                IngredientCategory::Meat,
                IngredientCategory::Seasoning
            ]
        );
        assert_eq!(groups[2].items[0].0, 0);

        assert_eq!(list.export_text(), "✓ 盐 6g\n○ 番茄 300g\n○ 猪肉 300g");
        assert_eq!(list.summary(), ListSummary { total: 3, checked: 1 });
    }

    #[test]
    fn test_remove_and_clear() {
        let list = reconciler();
        list.add_missing(&["盐 6g", "番茄 300g"]);
        let removed = list.remove(0).unwrap();
        assert_eq!(removed.pure_name, "盐");
        assert!(list.remove(5).is_err());
        list.clear();
        assert!(list.items().is_empty());
    }
}
