//! # Ingredient Matcher Module
//!
//! Decides whether an ingredient the user holds and an ingredient a recipe
//! wants denote the same foodstuff.
//!
//! ## Matching order
//!
//! 1. Exact match after lower-casing and trimming
//! 2. Alias groups ("番茄" / "西红柿", generic "肉" / "猪肉", ...)
//! 3. Substring containment for names of at least two characters, unless the
//!    contained name is a bare generic concept
//!
//! The predicate is pure and keeps no state between calls.

use lazy_static::lazy_static;
use tracing::trace;

lazy_static! {
    /// Alias groups, keyed by canonical concept. Order is preserved.
    static ref ALIAS_GROUPS: Vec<(&'static str, Vec<&'static str>)> = vec![
        ("鸡蛋", vec!["蛋", "鸡蛋"]),
        ("鸭蛋", vec!["蛋", "鸭蛋"]),
        ("土豆", vec!["马铃薯", "洋芋"]),
        ("番茄", vec!["西红柿"]),
        ("柿子", vec!["番茄", "西红柿"]),
        ("辣椒", vec!["青椒", "红椒", "朝天椒"]),
        ("椒", vec!["青椒", "红椒", "辣椒"]),
        ("猪肉", vec!["肉", "猪肉", "五花肉"]),
        ("牛肉", vec!["肉", "牛肉", "牛腩"]),
        ("羊肉", vec!["肉", "羊肉"]),
        ("鸡肉", vec!["肉", "鸡肉", "鸡"]),
        ("鱼", vec!["鱼", "鱼片"]),
    ];
}

/// Bare concepts too generic to be used for containment matching
const GENERIC_CONCEPTS: [&str; 7] = ["肉", "菜", "豆", "粉", "瓜", "椒", "蛋"];

/// Minimum length, in characters, for containment matching
const MIN_CONTAINMENT_LEN: usize = 2;

/// Normalize free-form ingredient text for comparison
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Check whether `held` satisfies `wanted`
///
/// # Examples
///
/// ```rust
/// use whattoeat::ingredient_matcher::matches;
///
/// assert!(matches("番茄", "西红柿"));
/// assert!(matches("肉", "猪肉"));
/// assert!(!matches("肉", "蔬菜"));
/// ```
pub fn matches(held: &str, wanted: &str) -> bool {
    let held = normalize(held);
    let wanted = normalize(wanted);

    if held == wanted {
        return true;
    }

    if alias_match(&held, &wanted) {
        trace!("Alias match: '{}' ~ '{}'", held, wanted);
        return true;
    }

    if containment_match(&held, &wanted) {
        trace!("Containment match: '{}' ~ '{}'", held, wanted);
        return true;
    }

    false
}

/// Check whether any of `available` satisfies `wanted`
pub fn any_matches<S: AsRef<str>>(available: &[S], wanted: &str) -> bool {
    available.iter().any(|held| matches(held.as_ref(), wanted))
}

fn alias_match(held: &str, wanted: &str) -> bool {
    ALIAS_GROUPS.iter().any(|(key, members)| {
        let held_member = members.contains(&held);
        let wanted_member = members.contains(&wanted);
        (held_member && wanted_member)
            || (held == *key && wanted_member)
            || (wanted == *key && held_member)
    })
}

fn containment_match(held: &str, wanted: &str) -> bool {
    let held_len = held.chars().count();
    let wanted_len = wanted.chars().count();
    if held_len < MIN_CONTAINMENT_LEN || wanted_len < MIN_CONTAINMENT_LEN {
        return false;
    }

    if wanted.contains(held) && !is_generic(held) {
        return true;
    }
    held.contains(wanted) && !is_generic(wanted)
}

fn is_generic(name: &str) -> bool {
    GENERIC_CONCEPTS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_case_and_space_insensitive() {
        assert!(matches("  Tofu ", "tofu"));
        assert!(matches("盐", "盐"));
    }

    #[test]
    fn test_alias_group_symmetry() {
        assert!(matches("番茄", "西红柿"));
        assert_eq!(matches("番茄", "西红柿"), matches("西红柿", "番茄"));
        assert!(matches("马铃薯", "土豆"));
        assert!(matches("青椒", "红椒"));
    }

    #[test]
    fn test_generic_meat_matches_specific() {
        assert!(matches("肉", "猪肉"));
        assert!(matches("肉", "牛腩"));
        assert!(!matches("肉", "蔬菜"));
    }

    #[test]
    fn test_specific_meats_do_not_match_each_other() {
        assert!(!matches("猪肉", "牛肉"));
        assert!(!matches("羊肉", "鸡肉"));
    }

    #[test]
    fn test_containment_requires_two_characters() {
        assert!(matches("虾仁", "鲜虾仁"));
        assert!(matches("五花肉片", "五花肉"));
        assert!(!matches("糖", "白糖"));
    }

    #[test]
    fn test_any_matches() {
        let available = vec!["西红柿".to_string(), "鸡蛋".to_string()];
        assert!(any_matches(&available, "番茄"));
        assert!(!any_matches(&available, "葱"));
    }
}
