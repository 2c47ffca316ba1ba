//! # Menu Module
//!
//! Recipes the user plans to cook. Entries keep the missing list from the
//! moment they were added for display only; the live status is always
//! recomputed against current availability (session input, pantry and
//! purchased items).
//!
//! A menu item is *fully stocked* when nothing is missing. This is stricter
//! than [`crate::recipe_model::MatchedRecipe::can_cook`], which only needs
//! half of the ingredients.
//!
//! Menu matching is looser than the scorer's: a held name covers a wanted one
//! when either contains the other, whatever their length, so `葱` in the
//! pantry covers `大葱` on the menu. Aliases play no part here.

use crate::ingredient_matcher::normalize;
use crate::portion_scaler::amount_for;
use crate::recipe_model::{MatchedRecipe, MenuEntry};
use crate::reconciliation_bus::{Event, ReconciliationBus};
use crate::shopping_list::{categorize, IngredientCategory, ShoppingItem, ShoppingListReconciler};
use crate::storage::Store;
use chrono::Utc;
use std::rc::Rc;
use tracing::info;

/// Live evaluation of one menu entry
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemStatus {
    pub entry: MenuEntry,
    pub matched_ingredients: Vec<String>,
    pub missing_ingredients: Vec<String>,
    pub match_score: f64,
    /// Every ingredient is available
    pub is_fully_stocked: bool,
}

/// A missing ingredient aggregated across the menu
#[derive(Debug, Clone, PartialEq)]
pub struct MissingIngredient {
    pub name: String,
    pub category: IngredientCategory,
    /// Number of menu dishes that need it
    pub count: usize,
}

/// Result of turning the menu into a shopping list
#[derive(Debug, Clone, PartialEq)]
pub enum ShoppingListOutcome {
    /// Nothing is missing, the list was left untouched
    AllStocked,
    /// The list was replaced with these items
    Generated(Vec<ShoppingItem>),
}

/// Everything the user can cook with: session input, pantry and purchases
pub fn available_ingredients<S: AsRef<str>>(store: &Store, session: &[S]) -> Vec<String> {
    let mut available: Vec<String> = Vec::new();
    let sources = session
        .iter()
        .map(|s| s.as_ref().to_string())
        .chain(store.pantry())
        .chain(store.purchased());
    for name in sources {
        if !available.contains(&name) {
            available.push(name);
        }
    }
    available
}

/// Whether `held` covers `wanted` on the menu
///
/// Case-folded equality or containment in either direction. Blank names
/// never match.
///
/// ```
/// use whattoeat::menu::menu_matches;
/// assert!(menu_matches("葱", "大葱"));
/// assert!(menu_matches("Beef", "beef"));
/// assert!(!menu_matches("猪肉", "牛肉"));
/// ```
pub fn menu_matches(held: &str, wanted: &str) -> bool {
    let held = normalize(held);
    let wanted = normalize(wanted);
    if held.is_empty() || wanted.is_empty() {
        return false;
    }
    held == wanted || held.contains(&wanted) || wanted.contains(&held)
}

/// Live status of each entry against `available`
pub fn evaluate_entries<S: AsRef<str>>(entries: Vec<MenuEntry>, available: &[S]) -> Vec<MenuItemStatus> {
    entries
        .into_iter()
        .map(|entry| {
            let (matched, missing): (Vec<String>, Vec<String>) =
                entry.recipe.ingredients.iter().cloned().partition(|ingredient| {
                    available.iter().any(|held| menu_matches(held.as_ref(), ingredient))
                });
            let match_score = if entry.recipe.ingredients.is_empty() {
                0.0
            } else {
                matched.len() as f64 / entry.recipe.ingredients.len() as f64
            };
            MenuItemStatus {
                is_fully_stocked: missing.is_empty(),
                entry,
                matched_ingredients: matched,
                missing_ingredients: missing,
                match_score,
            }
        })
        .collect()
}

/// Aggregate missing ingredients over evaluated entries
pub fn summarize_missing(statuses: &[MenuItemStatus]) -> Vec<MissingIngredient> {
    let mut summary: Vec<MissingIngredient> = Vec::new();
    for name in statuses.iter().flat_map(|status| &status.missing_ingredients) {
        match summary.iter_mut().find(|item| &item.name == name) {
            Some(item) => item.count += 1,
            None => summary.push(MissingIngredient {
                name: name.clone(),
                category: categorize(name),
                count: 1,
            }),
        }
    }
    summary
}

#[derive(Debug, Clone)]
pub struct Menu {
    store: Rc<Store>,
    bus: ReconciliationBus,
    shopping: ShoppingListReconciler,
}

impl Menu {
    pub fn new(store: Rc<Store>, bus: ReconciliationBus) -> Self {
        let shopping = ShoppingListReconciler::new(Rc::clone(&store), bus.clone());
        Self {
            store,
            bus,
            shopping,
        }
    }

    /// Entries, most recently added first
    pub fn entries(&self) -> Vec<MenuEntry> {
        self.store.menu()
    }

    pub fn contains(&self, recipe_id: &str) -> bool {
        self.entries().iter().any(|entry| entry.recipe.id == recipe_id)
    }

    /// Put a recipe at the top of the menu; already present is a no-op
    pub fn add(&self, recipe: &MatchedRecipe) -> bool {
        let mut entries = self.entries();
        if entries.iter().any(|entry| entry.recipe.id == recipe.recipe.id) {
            return false;
        }
        entries.insert(
            0,
            MenuEntry {
                recipe: recipe.recipe.clone(),
                added_at: Utc::now(),
                original_missing_ingredients: recipe.missing_ingredients.clone(),
            },
        );
        self.store.set_menu(&entries);
        info!("Added '{}' to the menu", recipe.recipe.name);
        self.publish_change(Some(recipe.recipe.id.clone()));
        true
    }

    pub fn remove(&self, recipe_id: &str) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|entry| entry.recipe.id != recipe_id);
        if entries.len() == before {
            return false;
        }
        self.store.set_menu(&entries);
        self.publish_change(Some(recipe_id.to_string()));
        true
    }

    pub fn clear(&self) {
        self.store.set_menu(&[]);
        self.publish_change(None);
    }

    fn publish_change(&self, recipe_id: Option<String>) {
        self.bus.publish(&Event::MenuChanged { recipe_id });
    }

    /// Recompute every entry against `available`
    pub fn evaluate<S: AsRef<str>>(&self, available: &[S]) -> Vec<MenuItemStatus> {
        evaluate_entries(self.entries(), available)
    }

    /// Unique missing ingredients across the menu, in first-seen order
    pub fn missing_summary<S: AsRef<str>>(&self, available: &[S]) -> Vec<MissingIngredient> {
        summarize_missing(&self.evaluate(available))
    }

    /// Replace the shopping list with what the menu still needs
    ///
    /// Amounts come from the portion table for `servings` people. The list is
    /// swapped in a single write, then the reset and open-request
    /// notifications go out.
    pub fn generate_shopping_list<S: AsRef<str>>(&self, available: &[S], servings: u32) -> ShoppingListOutcome {
        let missing = self.missing_summary(available);
        if missing.is_empty() {
            info!("Every menu ingredient is in stock");
            return ShoppingListOutcome::AllStocked;
        }

        let displays: Vec<String> = missing
            .iter()
            .map(|item| amount_for(&item.name, servings))
            .collect();
        let items = self.shopping.replace(&displays);
        info!("Generated shopping list with {} items for {} servings", items.len(), servings);

        self.bus.publish(&Event::ShoppingListReset);
        self.bus.publish(&Event::ShoppingListOpenRequest);
        ShoppingListOutcome::Generated(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe_model::RecipeDefinition;
    use crate::recipe_scorer::RecipeScorer;
    use crate::reconciliation_bus::Topic;
    use std::cell::RefCell;

    fn menu() -> Menu {
        Menu::new(Rc::new(Store::in_memory()), ReconciliationBus::new())
    }

    fn matched(id: &str, name: &str, ingredients: &[&str], available: &[&str]) -> MatchedRecipe {
        let recipe = RecipeDefinition::new(id, name).with_ingredients(ingredients);
        RecipeScorer::default().evaluate(&recipe, available)
    }

    #[test]
    fn test_add_is_idempotent_and_most_recent_first() {
        let menu = menu();
        assert!(menu.add(&matched("1", "番茄炒蛋", &["番茄", "鸡蛋"], &[])));
        assert!(menu.add(&matched("2", "蛋炒饭", &["米饭", "鸡蛋"], &[])));
        assert!(!menu.add(&matched("1", "番茄炒蛋", &["番茄", "鸡蛋"], &[])));

        let ids: Vec<String> = menu.entries().iter().map(|e| e.recipe.id.clone()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_live_status_ignores_snapshot() {
        let menu = menu();
        menu.add(&matched("1", "番茄炒蛋", &["番茄", "鸡蛋"], &["番茄"]));
        let status = &menu.evaluate(&["番茄", "鸡蛋"])[0];

        assert_eq!(status.entry.original_missing_ingredients, vec!["鸡蛋"]);
        assert!(status.missing_ingredients.is_empty());
        assert!(status.is_fully_stocked);
    }

    #[test]
    fn test_missing_summary_counts_dishes() {
        let menu = menu();
        menu.add(&matched("1", "番茄炒蛋", &["番茄", "鸡蛋", "葱"], &[]));
        menu.add(&matched("2", "葱爆羊肉", &["羊肉", "葱"], &[]));

        let summary = menu.missing_summary(&["鸡蛋"]);
        let names: Vec<&str> = summary.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["羊肉", "葱", "番茄"]);
        assert_eq!(summary[1].count, 2);
        assert_eq!(summary[0].category, IngredientCategory::Meat);
    }

    #[test]
    fn test_generate_when_all_stocked() {
        let menu = menu();
        menu.add(&matched("1", "韭菜炒鸡蛋", &["韭菜", "鸡蛋", "盐"], &[]));
        assert_eq!(
            menu.generate_shopping_list(&["韭菜", "鸡蛋", "盐"], 2),
            ShoppingListOutcome::AllStocked
        );
    }

    #[test]
    fn test_generate_replaces_list() {
        let store = Rc::new(Store::in_memory());
        let bus = ReconciliationBus::new();
        let menu = Menu::new(Rc::clone(&store), bus.clone());
        ShoppingListReconciler::new(Rc::clone(&store), bus).add_missing(&["牛奶 1盒"]);

        menu.add(&matched("1", "韭菜炒鸡蛋", &["韭菜", "鸡蛋", "盐"], &[]));
        let outcome = menu.generate_shopping_list(&["鸡蛋"], 4);

        let ShoppingListOutcome::Generated(items) = outcome else {
            panic!("expected a generated list");
        };
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["韭菜 200g", "盐 12g"]);
        assert_eq!(store.shopping_list(), items);
    }

    #[test]
    fn test_short_pantry_name_covers_longer_ingredient() {
        let menu = menu();
        menu.add(&matched("1", "葱爆羊肉", &["羊肉", "大葱", "白糖"], &[]));
        let status = &menu.evaluate(&["葱", "糖", "羊肉"])[0];

        assert_eq!(status.matched_ingredients, vec!["羊肉", "大葱", "白糖"]);
        assert!(status.is_fully_stocked);
        assert_eq!(status.match_score, 1.0);
        assert_eq!(menu.generate_shopping_list(&["葱", "糖", "羊肉"], 2), ShoppingListOutcome::AllStocked);
    }

    #[test]
    fn test_menu_matching_ignores_aliases() {
        assert!(menu_matches("大葱", "葱"));
        assert!(!menu_matches("西红柿", "番茄"));
        assert!(!menu_matches("", "葱"));
    }

    #[test]
    fn test_reset_subscriber_reads_new_list() {
        let store = Rc::new(Store::in_memory());
        let bus = ReconciliationBus::new();
        let menu = Menu::new(Rc::clone(&store), bus.clone());
        ShoppingListReconciler::new(Rc::clone(&store), bus.clone()).add_missing(&["牛奶 1盒"]);
        menu.add(&matched("1", "韭菜炒鸡蛋", &["韭菜", "鸡蛋", "盐"], &[]));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let reader = Rc::clone(&store);
        let _subscription = bus.subscribe(Topic::ShoppingListReset, move |_| {
            let names: Vec<String> = reader.shopping_list().into_iter().map(|item| item.name).collect();
            sink.borrow_mut().push(names);
        });

        menu.generate_shopping_list(&["鸡蛋"], 2);
        assert_eq!(*seen.borrow(), vec![vec!["韭菜 100g".to_string(), "盐 6g".to_string()]]);
    }

    #[test]
    fn test_available_merges_sources_without_duplicates() {
        let store = Store::in_memory();
        store.set_pantry(&["盐".to_string(), "葱".to_string()]);
        store.set_purchased(&["番茄".to_string()]);
        let available = available_ingredients(&store, &["葱", "鸡蛋"]);
        assert_eq!(available, vec!["葱", "鸡蛋", "盐", "番茄"]);
    }
}
