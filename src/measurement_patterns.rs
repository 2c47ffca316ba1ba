//! # Measurement Patterns Module
//!
//! This module contains the regex patterns used to pull quantities off
//! ingredient display strings.

use lazy_static::lazy_static;
use regex::Regex;

/// Leading quantity, optional whitespace, then the rest ("200g 土豆")
pub const QUANTITY_PREFIX_PATTERN: &str = r"^(\d+(?:\.\d+)?)(\s*)(.+)$";

/// Leading number followed by a unit suffix ("12g")
pub const NUTRIENT_PATTERN: &str = r"^(\d+(?:\.\d+)?)(.+)$";

/// Leading run of non-digit, non-space tokens ("番茄 300g" -> "番茄")
pub const CANONICAL_NAME_PATTERN: &str = r"^([^\d\s]+(?:\s+[^\d\s]+)*)";

// Lazy static regexes to avoid recompilation
lazy_static! {
    pub static ref QUANTITY_PREFIX_REGEX: Regex =
        Regex::new(QUANTITY_PREFIX_PATTERN).expect("Quantity prefix pattern should be valid");
    pub static ref NUTRIENT_REGEX: Regex =
        Regex::new(NUTRIENT_PATTERN).expect("Nutrient pattern should be valid");
    pub static ref CANONICAL_NAME_REGEX: Regex =
        Regex::new(CANONICAL_NAME_PATTERN).expect("Canonical name pattern should be valid");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_prefix_captures() {
        let caps = QUANTITY_PREFIX_REGEX.captures("200g 土豆").unwrap();
        assert_eq!(&caps[1], "200");
        assert_eq!(&caps[2], "");
        assert_eq!(&caps[3], "g 土豆");

        let caps = QUANTITY_PREFIX_REGEX.captures("1.5 个 洋葱").unwrap();
        assert_eq!(&caps[1], "1.5");
        assert_eq!(&caps[2], " ");
    }

    #[test]
    fn test_canonical_name_capture() {
        let caps = CANONICAL_NAME_REGEX.captures("番茄 300g").unwrap();
        assert_eq!(caps[1].trim(), "番茄");
        assert!(CANONICAL_NAME_REGEX.captures("300g").is_none());
    }
}
