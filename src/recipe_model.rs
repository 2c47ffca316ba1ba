//! # Recipe Data Model
//!
//! This module defines the data structures for catalog recipes and for the
//! derived, per-pass match results.
//!
//! ## Core Concepts
//!
//! - **RecipeDefinition**: an immutable catalog entry
//! - **Nutrition**: baseline nutrition for a reference number of servings
//! - **MatchedRecipe**: a recipe annotated against an available-ingredient set
//! - **MenuEntry**: a recipe the user has put on the menu, with the missing list
//!   as it was when added
//!
//! ## Usage
//!
//! ```rust
//! use whattoeat::recipe_model::{Difficulty, MealCategory, RecipeDefinition};
//!
//! let recipe = RecipeDefinition::new("1", "番茄炒蛋")
//!     .with_ingredients(&["番茄", "鸡蛋", "盐"])
//!     .with_category(MealCategory::Breakfast)
//!     .with_difficulty(Difficulty::Easy)
//!     .with_time(10);
//! assert_eq!(recipe.ingredients.len(), 3);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Meal slot a recipe is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
    /// Breakfast dishes
    Breakfast,
    /// Lunch dishes
    Lunch,
    /// Dinner dishes
    Dinner,
    /// Snacks
    Snack,
}

/// How hard a recipe is to cook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Easy
    Easy,
    /// Medium
    Medium,
    /// Hard
    Hard,
}

impl MealCategory {
    /// Stable identifier used for lookups and localization keys
    pub fn key(&self) -> &'static str {
        match self {
            MealCategory::Breakfast => "breakfast",
            MealCategory::Lunch => "lunch",
            MealCategory::Dinner => "dinner",
            MealCategory::Snack => "snack",
        }
    }
}

impl Difficulty {
    /// Stable identifier used for lookups and localization keys
    pub fn key(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Nutrition values for `servings` people
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nutrition {
    /// Energy in kcal
    pub calories: u32,
    /// Protein, number plus unit (e.g. "12g")
    pub protein: String,
    /// Carbohydrates, number plus unit
    pub carbs: String,
    /// Fat, number plus unit
    pub fat: String,
    /// Reference serving count the values above are given for
    pub servings: u32,
}

impl Nutrition {
    /// Create a nutrition record
    pub fn new(calories: u32, protein: &str, carbs: &str, fat: &str, servings: u32) -> Self {
        Self {
            calories,
            protein: protein.to_string(),
            carbs: carbs.to_string(),
            fat: fat.to_string(),
            servings,
        }
    }
}

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDefinition {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Ingredient names, in recipe order
    pub ingredients: Vec<String>,
    /// Cooking steps, in order
    pub steps: Vec<String>,
    /// Meal slot
    pub category: MealCategory,
    /// Cooking time in minutes
    pub time: u32,
    /// Difficulty level
    pub difficulty: Difficulty,
    /// Free-form tags
    pub tags: BTreeSet<String>,
    /// Baseline nutrition, if known
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "nutritionalInfo")]
    pub nutrition: Option<Nutrition>,
}

impl RecipeDefinition {
    /// Create a recipe with just an id and a name
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ingredients: Vec::new(),
            steps: Vec::new(),
            category: MealCategory::Dinner,
            time: 1,
            difficulty: Difficulty::Easy,
            tags: BTreeSet::new(),
            nutrition: None,
        }
    }

    /// Set the ingredient list
    pub fn with_ingredients(mut self, ingredients: &[&str]) -> Self {
        self.ingredients = ingredients.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the steps
    pub fn with_steps(mut self, steps: &[&str]) -> Self {
        self.steps = steps.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the meal category
    pub fn with_category(mut self, category: MealCategory) -> Self {
        self.category = category;
        self
    }

    /// Set the cooking time, at least one minute
    pub fn with_time(mut self, minutes: u32) -> Self {
        self.time = minutes.max(1);
        self
    }

    /// Set the difficulty
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Add tags
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|s| s.to_string()));
        self
    }

    /// Attach nutrition
    pub fn with_nutrition(mut self, nutrition: Nutrition) -> Self {
        self.nutrition = Some(nutrition);
        self
    }
}

/// A recipe annotated against a set of available ingredients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRecipe {
    /// The scored recipe
    #[serde(flatten)]
    pub recipe: RecipeDefinition,
    /// Fraction of ingredients available, in [0, 1]
    #[serde(rename = "matchScore")]
    pub match_score: f64,
    /// Ingredients satisfied, in recipe order
    #[serde(rename = "matchedIngredients")]
    pub matched_ingredients: Vec<String>,
    /// Ingredients not satisfied, in recipe order
    #[serde(rename = "missingIngredients")]
    pub missing_ingredients: Vec<String>,
    /// Whether the score reaches the cookable threshold
    #[serde(rename = "canCook")]
    pub can_cook: bool,
}

impl MatchedRecipe {
    /// Present a recipe as fully matched (used for featured recipes)
    pub fn full_match(recipe: RecipeDefinition) -> Self {
        let matched = recipe.ingredients.clone();
        Self {
            recipe,
            match_score: 1.0,
            matched_ingredients: matched,
            missing_ingredients: Vec::new(),
            can_cook: true,
        }
    }

    /// Whether enough ingredients are available to plausibly cook this dish
    ///
    /// This is the scorer's definition (score at or above one half). A menu
    /// item uses the stricter [`crate::menu::MenuItemStatus::is_fully_stocked`].
    pub fn is_likely_cookable(&self) -> bool {
        self.can_cook
    }

    /// Recipe id shortcut
    pub fn id(&self) -> &str {
        &self.recipe.id
    }
}

/// Recipe placed on the menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// The recipe
    pub recipe: RecipeDefinition,
    /// When the recipe was added
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
    /// Missing ingredients at insertion time, for historical display only
    #[serde(rename = "originalMissingIngredients")]
    pub original_missing_ingredients: Vec<String>,
}

impl fmt::Display for RecipeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} min, {}): {}",
            self.name,
            self.time,
            self.difficulty.key(),
            self.ingredients.join("、")
        )
    }
}

impl fmt::Display for MatchedRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:.0}%]",
            self.recipe.name,
            self.match_score * 100.0
        )?;
        if !self.missing_ingredients.is_empty() {
            write!(f, " missing: {}", self.missing_ingredients.join("、"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_builder() {
        let recipe = RecipeDefinition::new("7", "番茄鸡蛋面")
            .with_ingredients(&["番茄", "鸡蛋", "面条"])
            .with_tags(&["面食", "快手"])
            .with_time(0);

        assert_eq!(recipe.id, "7");
        assert_eq!(recipe.ingredients, vec!["番茄", "鸡蛋", "面条"]);
        assert!(recipe.tags.contains("快手"));
        assert_eq!(recipe.time, 1);
    }

    #[test]
    fn test_full_match() {
        let recipe = RecipeDefinition::new("3", "燕麦粥").with_ingredients(&["燕麦", "牛奶"]);
        let matched = MatchedRecipe::full_match(recipe);
        assert_eq!(matched.match_score, 1.0);
        assert!(matched.missing_ingredients.is_empty());
        assert!(matched.is_likely_cookable());
    }

    #[test]
    fn test_recipe_json_shape() {
        let json = r#"{
            "id": "1", "name": "番茄炒蛋",
            "ingredients": ["番茄", "鸡蛋"], "steps": ["炒"],
            "category": "breakfast", "time": 10, "difficulty": "easy",
            "tags": ["家常"]
        }"#;
        let recipe: RecipeDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.category, MealCategory::Breakfast);
        assert!(recipe.nutrition.is_none());
    }

    #[test]
    fn test_matched_display() {
        let recipe = RecipeDefinition::new("1", "番茄炒蛋").with_ingredients(&["番茄", "葱"]);
        let matched = MatchedRecipe {
            recipe,
            match_score: 0.5,
            matched_ingredients: vec!["番茄".to_string()],
            missing_ingredients: vec!["葱".to_string()],
            can_cook: true,
        };
        assert_eq!(matched.to_string(), "番茄炒蛋 [50%] missing: 葱");
    }
}
