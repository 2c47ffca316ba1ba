//! # Share Link Module
//!
//! Encodes an ingredient list and a recipe id list into a query string
//! (`ing=番茄,鸡蛋&recipes=1,7`, percent-encoded) and parses it back.

use std::fmt;
use tracing::warn;

const INGREDIENTS_PARAM: &str = "ing";
const RECIPES_PARAM: &str = "recipes";

/// Shared ingredients and recipes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareLink {
    pub ingredients: Vec<String>,
    pub recipe_ids: Vec<String>,
}

impl ShareLink {
    pub fn new(ingredients: Vec<String>, recipe_ids: Vec<String>) -> Self {
        Self {
            ingredients,
            recipe_ids,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.recipe_ids.is_empty()
    }

    /// Query string without a leading `?`; empty fields are left out
    ///
    /// # Examples
    ///
    /// ```rust
    /// use whattoeat::share_link::ShareLink;
    ///
    /// let link = ShareLink::new(vec!["番茄".into(), "鸡蛋".into()], vec!["1".into()]);
    /// let query = link.to_query();
    /// assert_eq!(ShareLink::parse(&query), link);
    /// ```
    pub fn to_query(&self) -> String {
        let mut params = Vec::new();
        if !self.ingredients.is_empty() {
            params.push(format!(
                "{}={}",
                INGREDIENTS_PARAM,
                urlencoding::encode(&self.ingredients.join(","))
            ));
        }
        if !self.recipe_ids.is_empty() {
            params.push(format!(
                "{}={}",
                RECIPES_PARAM,
                urlencoding::encode(&self.recipe_ids.join(","))
            ));
        }
        params.join("&")
    }

    /// Parse a query string
    ///
    /// A leading `?`, unknown parameters, missing fields and empty list
    /// tokens are all tolerated.
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut link = ShareLink::default();

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let target = match key {
                INGREDIENTS_PARAM => &mut link.ingredients,
                RECIPES_PARAM => &mut link.recipe_ids,
                _ => continue,
            };
            *target = split_list(&decode_component(value));
        }
        link
    }
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.to_query())
    }
}

fn decode_component(value: &str) -> String {
    let value = value.replace('+', " ");
    match urlencoding::decode(&value) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            warn!("Share link parameter is not valid UTF-8: {}", e);
            String::new()
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_percent_encoded() {
        let link = ShareLink::new(vec!["番茄".into()], vec!["1".into(), "7".into()]);
        let query = link.to_query();
        assert!(query.starts_with("ing=%E7%95%AA%E8%8C%84"));
        assert!(query.ends_with("&recipes=1%2C7"));
    }

    #[test]
    fn test_parse_tolerates_missing_and_empty_tokens() {
        let link = ShareLink::parse("?recipes=1,,3,&utm=x");
        assert!(link.ingredients.is_empty());
        assert_eq!(link.recipe_ids, vec!["1", "3"]);

        assert!(ShareLink::parse("").is_empty());
        assert!(ShareLink::parse("ing=").is_empty());
    }

    #[test]
    fn test_parse_plus_as_space() {
        let link = ShareLink::parse("ing=green+onion%2C%E8%91%B1");
        assert_eq!(link.ingredients, vec!["green onion", "葱"]);
    }

    #[test]
    fn test_display_has_question_mark() {
        let link = ShareLink::new(vec![], vec!["2".into()]);
        assert_eq!(link.to_string(), "?recipes=2");
    }
}
