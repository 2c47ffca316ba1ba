//! # Localization Module
//!
//! Fluent-based labels for categories, difficulty, meal slots, durations and
//! the few user-visible status lines. Translations are embedded at build
//! time; `zh-CN` is the default and the fallback for unknown languages.

use crate::recipe_model::{Difficulty, MealCategory};
use crate::shopping_list::IngredientCategory;
use anyhow::{anyhow, Result};
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use std::collections::HashMap;
use tracing::warn;
use unic_langid::LanguageIdentifier;

/// Language used when none or an unsupported one is requested
pub const DEFAULT_LANGUAGE: &str = "zh-CN";

const RESOURCES: [(&str, &str); 2] = [
    ("zh-CN", include_str!("../locales/zh-CN/main.ftl")),
    ("en", include_str!("../locales/en/main.ftl")),
];

/// Localization manager holding one bundle per supported language
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    language: String,
}

impl LocalizationManager {
    /// Create a manager using the default language
    pub fn new() -> Result<Self> {
        Self::with_language(DEFAULT_LANGUAGE)
    }

    /// Create a manager for `language`, falling back to the default
    pub fn with_language(language: &str) -> Result<Self> {
        let mut bundles = HashMap::new();
        for (tag, source) in RESOURCES {
            let locale: LanguageIdentifier = tag.parse()?;
            bundles.insert(tag.to_string(), Self::create_bundle(locale, source)?);
        }

        let language = if bundles.contains_key(language) {
            language.to_string()
        } else {
            warn!("Unsupported language '{}', using {}", language, DEFAULT_LANGUAGE);
            DEFAULT_LANGUAGE.to_string()
        };

        Ok(Self { bundles, language })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(locale: LanguageIdentifier, source: &str) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new(vec![locale.clone()]);
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Invalid FTL for {}: {:?}", locale, errors))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Duplicate messages for {}: {:?}", locale, errors))?;

        Ok(bundle)
    }

    /// Active language tag
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get a localized message in the active language
    pub fn get_message(&self, key: &str, args: Option<&HashMap<&str, &str>>) -> String {
        self.get_message_in_language(key, &self.language, args)
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message(key, Some(&args_map))
    }

    /// Get a localized message in a specific language
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match bundle.get_message(key).and_then(|msg| msg.value()) {
            Some(pattern) => pattern,
            None => return format!("Missing translation: {}", key),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            fluent_args
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!("Formatting '{}' reported {} errors", key, errors.len());
        }
        value.into_owned()
    }

    /// Label for a shopping category
    pub fn category_label(&self, category: IngredientCategory) -> String {
        self.get_message(&format!("category-{}", category.key()), None)
    }

    /// Label for a difficulty level
    pub fn difficulty_label(&self, difficulty: Difficulty) -> String {
        self.get_message(&format!("difficulty-{}", difficulty.key()), None)
    }

    /// Label for a meal slot
    pub fn meal_label(&self, category: MealCategory) -> String {
        self.get_message(&format!("meal-{}", category.key()), None)
    }

    /// Human readable cooking time ("45分钟", "1小时30分钟")
    pub fn format_time(&self, minutes: u32) -> String {
        let hours = (minutes / 60).to_string();
        let rest = (minutes % 60).to_string();
        if minutes < 60 {
            self.get_message_with_args("time-minutes", &[("minutes", minutes.to_string().as_str())])
        } else if minutes % 60 == 0 {
            self.get_message_with_args("time-hours", &[("hours", hours.as_str())])
        } else {
            self.get_message_with_args("time-hours-minutes", &[("hours", hours.as_str()), ("minutes", rest.as_str())])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_default_language() {
        let manager = LocalizationManager::new().unwrap();
        assert_eq!(manager.category_label(IngredientCategory::Vegetable), "蔬菜");
        assert_eq!(manager.difficulty_label(Difficulty::Hard), "较难");
        assert_eq!(manager.meal_label(MealCategory::Snack), "小食");
    }

    #[test]
    fn test_format_time() {
        let manager = LocalizationManager::new().unwrap();
        assert_eq!(manager.format_time(45), "45分钟");
        assert_eq!(manager.format_time(60), "1小时");
        assert_eq!(manager.format_time(90), "1小时30分钟");
    }

    #[test]
    fn test_unsupported_language_falls_back() {
        let manager = LocalizationManager::with_language("fr").unwrap();
        assert_eq!(manager.language(), DEFAULT_LANGUAGE);
        assert_eq!(manager.get_message_in_language("difficulty-easy", "fr", None), "简单");
    }

    #[test]
    fn test_missing_key() {
        let manager = LocalizationManager::new().unwrap();
        assert!(manager.get_message("no-such-key", None).starts_with("Missing translation:"));
    }

    #[test]
    fn test_english_with_args() {
        let manager = LocalizationManager::with_language("en").unwrap();
        let summary = manager.get_message_with_args("shopping-summary", &[("total", "3"), ("checked", "1")]);
        assert_eq!(summary, "3 items · 1 bought");
        assert_eq!(manager.format_time(125), "2 h 5 min");
    }
}
