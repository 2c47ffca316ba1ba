//! # Engine Tests
//!
//! Matching, scoring, portion and shopping list behaviour exercised through
//! the public API.

use std::rc::Rc;
use whattoeat::ingredient_matcher::matches;
use whattoeat::portion_scaler::{amount_for, rescale};
use whattoeat::recipe_catalog::RecipeCatalog;
use whattoeat::recipe_model::RecipeDefinition;
use whattoeat::recipe_scorer::RecipeScorer;
use whattoeat::reconciliation_bus::ReconciliationBus;
use whattoeat::shopping_list::ShoppingListReconciler;
use whattoeat::storage::Store;

#[test]
fn test_alias_groups_are_symmetric() {
    assert!(matches("番茄", "西红柿"));
    assert_eq!(matches("番茄", "西红柿"), matches("西红柿", "番茄"));
    assert_eq!(matches("土豆", "马铃薯"), matches("马铃薯", "土豆"));
}

#[test]
fn test_generic_concepts_without_false_positives() {
    assert!(matches("肉", "猪肉"));
    assert!(!matches("肉", "蔬菜"));
}

#[test]
fn test_portion_amounts() {
    assert_eq!(amount_for("盐", 4), "盐 12g");
    assert_eq!(amount_for("番茄", 7), "番茄 1.1kg");
    assert_eq!(rescale("200g 土豆", 2, 4), "400g 土豆");
}

#[test]
fn test_tomato_egg_scenario() {
    let recipe = RecipeDefinition::new("1", "番茄炒蛋").with_ingredients(&["番茄", "鸡蛋", "盐", "糖", "葱"]);
    let result = RecipeScorer::default().evaluate(&recipe, &["番茄", "鸡蛋"]);

    assert_eq!(result.matched_ingredients, vec!["番茄", "鸡蛋"]);
    assert_eq!(result.missing_ingredients, vec!["盐", "糖", "葱"]);
    assert!((result.match_score - 0.4).abs() < f64::EPSILON);
    assert!(!result.can_cook);
}

#[test]
fn test_ties_keep_catalog_order() {
    let recipes = vec![
        RecipeDefinition::new("a", "A").with_ingredients(&["番茄", "盐"]),
        RecipeDefinition::new("b", "B").with_ingredients(&["鸡蛋", "糖"]),
        RecipeDefinition::new("c", "C").with_ingredients(&["番茄", "葱"]),
        RecipeDefinition::new("d", "D").with_ingredients(&["番茄", "鸡蛋"]),
    ];
    let ranked = RecipeScorer::default().score(&recipes, &["番茄", "鸡蛋"]);

    let ids: Vec<&str> = ranked.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["d", "a", "b", "c"]);
}

#[test]
fn test_builtin_catalog_scores_are_consistent() {
    let catalog = RecipeCatalog::builtin().unwrap();
    let available = ["番茄", "鸡蛋", "土豆", "猪肉"];
    let ranked = RecipeScorer::default().score(catalog.recipes(), &available);

    assert!(!ranked.is_empty());
    for pair in ranked.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score);
    }
    for result in &ranked {
        let expected = result.matched_ingredients.len() as f64 / result.recipe.ingredients.len() as f64;
        assert!((result.match_score - expected).abs() < 1e-9);
        assert!(result.match_score > 0.0 && result.match_score <= 1.0);
        assert_eq!(result.can_cook, result.match_score >= 0.5);
    }
}

#[test]
fn test_scorer_with_nothing_available() {
    let catalog = RecipeCatalog::builtin().unwrap();
    let empty: [&str; 0] = [];
    assert!(RecipeScorer::default().score(catalog.recipes(), &empty).is_empty());
}

#[test]
fn test_shopping_list_keeps_first_display() {
    let reconciler = ShoppingListReconciler::new(Rc::new(Store::in_memory()), ReconciliationBus::new());
    reconciler.add_missing(&["番茄 300g"]);
    reconciler.add_missing(&["番茄 500g"]);

    let items = reconciler.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "番茄 300g");
    assert_eq!(items[0].pure_name, "番茄");
}
