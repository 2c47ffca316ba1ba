//! # Recipe Catalog Module
//!
//! The static recipe catalog. Recipes are loaded once from the embedded JSON
//! data, enhanced with nutrition (known values first, then a name-based
//! estimate) and never mutated afterwards.

use crate::recipe_model::{MatchedRecipe, Nutrition, RecipeDefinition};
use crate::storage_errors::EngineError;
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

const RECIPES_JSON: &str = include_str!("../data/recipes.json");
const NUTRITION_JSON: &str = include_str!("../data/nutrition.json");

/// Immutable, ordered recipe collection
#[derive(Debug, Clone)]
pub struct RecipeCatalog {
    recipes: Vec<RecipeDefinition>,
}

impl RecipeCatalog {
    /// Load the built-in catalog with nutrition attached to every recipe
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Catalog`] if the embedded data is malformed.
    pub fn builtin() -> Result<Self, EngineError> {
        let recipes: Vec<RecipeDefinition> = serde_json::from_str(RECIPES_JSON)
            .map_err(|e| EngineError::Catalog(format!("recipe data: {e}")))?;
        let nutrition: HashMap<String, Nutrition> = serde_json::from_str(NUTRITION_JSON)
            .map_err(|e| EngineError::Catalog(format!("nutrition data: {e}")))?;

        let recipes = recipes
            .into_iter()
            .map(|mut recipe| {
                if recipe.nutrition.is_none() {
                    let info = nutrition
                        .get(&recipe.name)
                        .cloned()
                        .unwrap_or_else(|| estimate_nutrition(&recipe.name));
                    recipe.nutrition = Some(info);
                }
                recipe
            })
            .collect();

        let catalog = Self::from_recipes(recipes)?;
        info!("Loaded recipe catalog with {} recipes", catalog.len());
        Ok(catalog)
    }

    /// Build a catalog from explicit recipes, keeping their order
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Catalog`] on a duplicate id or a zero cooking time.
    pub fn from_recipes(recipes: Vec<RecipeDefinition>) -> Result<Self, EngineError> {
        let mut seen = HashSet::new();
        for recipe in &recipes {
            if !seen.insert(recipe.id.as_str()) {
                return Err(EngineError::Catalog(format!("duplicate recipe id '{}'", recipe.id)));
            }
            if recipe.time == 0 {
                return Err(EngineError::Catalog(format!(
                    "recipe '{}' has no cooking time",
                    recipe.id
                )));
            }
        }
        Ok(Self { recipes })
    }

    /// All recipes in catalog order
    pub fn recipes(&self) -> &[RecipeDefinition] {
        &self.recipes
    }

    /// Number of recipes
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the catalog holds no recipes
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Look a recipe up by id; unknown ids yield `None`
    pub fn by_id(&self, id: &str) -> Option<&RecipeDefinition> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    /// Case-insensitive search over name, ingredients and tags
    pub fn search(&self, query: &str) -> Vec<&RecipeDefinition> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let hits: Vec<&RecipeDefinition> = self
            .recipes
            .iter()
            .filter(|recipe| {
                recipe.name.to_lowercase().contains(&query)
                    || recipe
                        .ingredients
                        .iter()
                        .any(|ingredient| ingredient.to_lowercase().contains(&query))
                    || recipe.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
            })
            .collect();
        debug!("Search '{}' matched {} recipes", query, hits.len());
        hits
    }

    /// Random sample of at most `count` recipes, without scoring
    pub fn featured(&self, count: usize) -> Vec<RecipeDefinition> {
        let mut rng = rand::thread_rng();
        self.recipes
            .choose_multiple(&mut rng, count.min(self.recipes.len()))
            .cloned()
            .collect()
    }

    /// Featured recipes presented as full matches for the landing state
    pub fn featured_as_matches(&self, count: usize) -> Vec<MatchedRecipe> {
        self.featured(count)
            .into_iter()
            .map(MatchedRecipe::full_match)
            .collect()
    }
}

/// Estimate nutrition for two servings from keywords in the dish name
pub fn estimate_nutrition(name: &str) -> Nutrition {
    let name = name.to_lowercase();
    let has_any = |keywords: &[&str]| keywords.iter().any(|keyword| name.contains(keyword));

    let (calories, protein, carbs, fat) = if has_any(&["鸡", "鸭", "鱼", "虾"]) {
        (280, "25g", "10g", "15g")
    } else if has_any(&["猪肉", "牛肉", "排骨"]) {
        (380, "22g", "12g", "25g")
    } else if has_any(&["豆腐"]) {
        (180, "12g", "8g", "12g")
    } else if has_any(&["面", "饭"]) {
        (400, "12g", "55g", "12g")
    } else if has_any(&["汤"]) {
        (100, "6g", "6g", "4g")
    } else if has_any(&["饺子", "馄饨"]) {
        (250, "10g", "35g", "8g")
    } else if has_any(&["包子"]) {
        (200, "8g", "35g", "5g")
    } else if has_any(&["土豆", "白菜", "黄瓜", "西兰花"]) {
        (100, "3g", "18g", "4g")
    } else {
        (200, "10g", "20g", "8g")
    };

    Nutrition::new(calories, protein, carbs, fat, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = RecipeCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 40);
        assert_eq!(catalog.recipes()[0].name, "番茄炒蛋");
        assert!(catalog.recipes().iter().all(|r| r.nutrition.is_some()));
    }

    #[test]
    fn test_known_nutrition_wins_over_estimate() {
        let catalog = RecipeCatalog::builtin().unwrap();
        let eggs = catalog.by_id("1").unwrap();
        assert_eq!(eggs.nutrition.as_ref().unwrap().calories, 180);
    }

    #[test]
    fn test_by_id_unknown_is_none() {
        let catalog = RecipeCatalog::builtin().unwrap();
        assert!(catalog.by_id("999").is_none());
        assert!(catalog.by_id("").is_none());
    }

    #[test]
    fn test_search() {
        let catalog = RecipeCatalog::builtin().unwrap();
        let hits = catalog.search("川菜");
        assert!(hits.iter().any(|r| r.name == "麻婆豆腐"));
        assert!(catalog.search("   ").is_empty());

        let by_ingredient = catalog.search("茄子");
        assert!(by_ingredient.iter().any(|r| r.name == "地三鲜"));
    }

    #[test]
    fn test_featured_never_exceeds_catalog() {
        let catalog = RecipeCatalog::from_recipes(vec![
            RecipeDefinition::new("a", "甲"),
            RecipeDefinition::new("b", "乙"),
        ])
        .unwrap();
        assert_eq!(catalog.featured(6).len(), 2);
        assert_eq!(catalog.featured(1).len(), 1);
        assert!(catalog.featured_as_matches(3).iter().all(|m| m.match_score == 1.0));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = RecipeCatalog::from_recipes(vec![
            RecipeDefinition::new("a", "甲"),
            RecipeDefinition::new("a", "乙"),
        ]);
        assert!(matches!(result, Err(EngineError::Catalog(_))));
    }

    #[test]
    fn test_estimate_nutrition() {
        assert_eq!(estimate_nutrition("辣子鸡").calories, 280);
        assert_eq!(estimate_nutrition("牛肉面").calories, 380);
        assert_eq!(estimate_nutrition("紫菜汤").calories, 100);
        assert_eq!(estimate_nutrition("凉拌木耳").calories, 200);
    }
}
