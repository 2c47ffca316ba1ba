//! # Localization Tests
//!
//! Message retrieval in both bundled languages, argument substitution and
//! fallbacks.

use std::collections::HashMap;
use whattoeat::localization::LocalizationManager;
use whattoeat::shopping_list::IngredientCategory;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        LocalizationManager::new().expect("Failed to create localization manager")
    }

    #[test]
    fn test_every_category_has_a_label() {
        let manager = setup_localization();
        for category in IngredientCategory::ALL {
            for language in ["zh-CN", "en"] {
                let key = format!("category-{}", category.key());
                let label = manager.get_message_in_language(&key, language, None);
                assert!(!label.starts_with("Missing translation:"), "{key} in {language}");
            }
        }
    }

    #[test]
    fn test_get_message_with_args() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("count", "3");
        args.insert("cookable", "1");

        let message = manager.get_message_in_language("recipes-found", "en", Some(&args));
        assert_eq!(message, "Found 3 recipes · 1 ready to cook");

        let message = manager.get_message_in_language("recipes-found", "zh-CN", Some(&args));
        assert!(message.contains('3'));
        assert!(message.contains('1'));
    }

    #[test]
    fn test_get_message_unsupported_language() {
        let manager = setup_localization();
        let message = manager.get_message_in_language("meal-breakfast", "unsupported", None);
        assert_eq!(message, "早餐");
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();
        let message = manager.get_message_in_language("nonexistent-key", "en", None);
        assert!(message.starts_with("Missing translation:"));
    }

    #[test]
    fn test_format_time_in_english() {
        let manager = LocalizationManager::with_language("en").expect("Failed to create localization manager");
        assert_eq!(manager.format_time(15), "15 min");
        assert_eq!(manager.format_time(120), "2 h");
    }
}
