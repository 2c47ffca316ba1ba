//! # Recipe Scorer Module
//!
//! Scores every catalog recipe against a set of available ingredients and
//! returns a ranked, annotated list.
//!
//! ## Ranking rules
//!
//! - empty input yields an empty list, without scoring
//! - `score = |matched| / |ingredients|`, zero for a recipe with no ingredients
//! - zero-score recipes are dropped
//! - the sort is stable and descending, ties keep catalog order

use crate::config::MIN_MATCH_THRESHOLD;
use crate::ingredient_matcher::any_matches;
use crate::recipe_model::{MatchedRecipe, RecipeDefinition};
use tracing::debug;

/// Ranks recipes by how much of each the user can already cover
#[derive(Debug, Clone, Copy)]
pub struct RecipeScorer {
    cook_threshold: f64,
}

impl Default for RecipeScorer {
    fn default() -> Self {
        Self::new(MIN_MATCH_THRESHOLD)
    }
}

/// Matched and missing ingredients of one recipe, both in recipe order
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientCoverage {
    /// Ingredients some available name satisfies
    pub matched: Vec<String>,
    /// The rest
    pub missing: Vec<String>,
    /// `matched / total`, zero for an empty recipe
    pub score: f64,
}

/// Split a recipe's ingredients into matched and missing
pub fn coverage<S: AsRef<str>>(recipe: &RecipeDefinition, available: &[S]) -> IngredientCoverage {
    let (matched, missing): (Vec<String>, Vec<String>) = recipe
        .ingredients
        .iter()
        .cloned()
        .partition(|ingredient| any_matches(available, ingredient));

    let score = if recipe.ingredients.is_empty() {
        0.0
    } else {
        matched.len() as f64 / recipe.ingredients.len() as f64
    };

    IngredientCoverage {
        matched,
        missing,
        score,
    }
}

impl RecipeScorer {
    /// Create a scorer with the given cookable threshold
    pub fn new(cook_threshold: f64) -> Self {
        Self { cook_threshold }
    }

    /// Annotate a single recipe
    pub fn evaluate<S: AsRef<str>>(&self, recipe: &RecipeDefinition, available: &[S]) -> MatchedRecipe {
        let IngredientCoverage {
            matched,
            missing,
            score,
        } = coverage(recipe, available);

        MatchedRecipe {
            recipe: recipe.clone(),
            match_score: score,
            matched_ingredients: matched,
            missing_ingredients: missing,
            can_cook: score >= self.cook_threshold,
        }
    }

    /// Score and rank recipes against the available ingredients
    ///
    /// # Arguments
    ///
    /// * `recipes` - Recipes in catalog order
    /// * `available` - Ingredient names the user has
    ///
    /// # Returns
    ///
    /// Recipes with at least one matched ingredient, best first
    ///
    /// # Examples
    ///
    /// ```rust
    /// use whattoeat::recipe_model::RecipeDefinition;
    /// use whattoeat::recipe_scorer::RecipeScorer;
    ///
    /// let recipes = vec![RecipeDefinition::new("1", "番茄炒蛋")
    ///     .with_ingredients(&["番茄", "鸡蛋", "盐", "糖", "葱"])];
    /// let ranked = RecipeScorer::default().score(&recipes, &["番茄", "鸡蛋"]);
    /// assert_eq!(ranked[0].match_score, 0.4);
    /// assert!(!ranked[0].can_cook);
    /// ```
    pub fn score<S: AsRef<str>>(&self, recipes: &[RecipeDefinition], available: &[S]) -> Vec<MatchedRecipe> {
        if available.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<MatchedRecipe> = recipes
            .iter()
            .map(|recipe| self.evaluate(recipe, available))
            .filter(|matched| matched.match_score > 0.0)
            .collect();

        // `sort_by` is stable, so ties keep catalog order
        ranked.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));

        debug!(
            "Scored {} recipes against {} ingredients, {} relevant",
            recipes.len(),
            available.len(),
            ranked.len()
        );
        ranked
    }
}
