//! # Engine Configuration Module
//!
//! This module defines the configuration used by the kitchen engine, including
//! serving limits, history size, matching thresholds and the store location.
//! Values can be overridden through `WHATTOEAT_*` environment variables (a
//! `.env` file is honoured).

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::debug;

// Constants for engine configuration
pub const DEFAULT_SERVINGS: u32 = 2;
pub const MAX_STORED_SERVINGS: u32 = 20;
pub const MAX_OFFERED_SERVINGS: u32 = 6;
pub const MAX_HISTORY_ENTRIES: usize = 50;
pub const MIN_MATCH_THRESHOLD: f64 = 0.5;
pub const DEFAULT_GRAMS_PER_SERVING: f64 = 150.0;
pub const FEATURED_COUNT: usize = 6;
pub const MAX_INGREDIENT_LENGTH: usize = 50;
pub const DEFAULT_STORE_PATH: &str = "whattoeat-store.json";

/// Configuration structure for the kitchen engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Location of the JSON file used by the file store
    pub store_path: PathBuf,
    /// Servings used when none is stored or the stored value is out of range
    pub default_servings: u32,
    /// Largest servings value accepted when reading the store
    pub max_stored_servings: u32,
    /// Largest servings value offered to users
    pub max_offered_servings: u32,
    /// Number of history entries kept
    pub max_history_entries: usize,
    /// Minimum score at which a scored recipe counts as cookable
    pub cook_threshold: f64,
    /// Number of recipes returned by the featured sample
    pub featured_count: usize,
    /// Maximum length of a user supplied ingredient name, in characters
    pub max_ingredient_length: usize,
    /// Emit logs as JSON
    pub json_logs: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            default_servings: DEFAULT_SERVINGS,
            max_stored_servings: MAX_STORED_SERVINGS,
            max_offered_servings: MAX_OFFERED_SERVINGS,
            max_history_entries: MAX_HISTORY_ENTRIES,
            cook_threshold: MIN_MATCH_THRESHOLD,
            featured_count: FEATURED_COUNT,
            max_ingredient_length: MAX_INGREDIENT_LENGTH,
            json_logs: false,
        }
    }
}

impl EngineConfig {
    /// Build a configuration from the environment
    ///
    /// Loads `.env` if present, then applies any of these overrides:
    /// `WHATTOEAT_STORE_PATH`, `WHATTOEAT_DEFAULT_SERVINGS`,
    /// `WHATTOEAT_FEATURED_COUNT`, `WHATTOEAT_MAX_HISTORY`, `WHATTOEAT_JSON_LOGS`.
    ///
    /// # Errors
    ///
    /// Returns an error when a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = Self::default();

        if let Ok(path) = env::var("WHATTOEAT_STORE_PATH") {
            debug!("Using store path from environment: {}", path);
            config.store_path = PathBuf::from(path);
        }
        if let Some(servings) = read_number::<u32>("WHATTOEAT_DEFAULT_SERVINGS")? {
            config.default_servings = servings.clamp(1, config.max_stored_servings);
        }
        if let Some(count) = read_number::<usize>("WHATTOEAT_FEATURED_COUNT")? {
            config.featured_count = count;
        }
        if let Some(cap) = read_number::<usize>("WHATTOEAT_MAX_HISTORY")? {
            config.max_history_entries = cap;
        }
        if let Ok(flag) = env::var("WHATTOEAT_JSON_LOGS") {
            config.json_logs = matches!(flag.trim(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    /// Clamp a stored servings value into the accepted range
    ///
    /// Values outside `1..=max_stored_servings` fall back to the default.
    pub fn sanitize_servings(&self, servings: i64) -> u32 {
        if servings >= 1 && servings <= i64::from(self.max_stored_servings) {
            servings as u32
        } else {
            self.default_servings
        }
    }
}

fn read_number<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{name} must be a number, got '{raw}'")),
        Err(_) => Ok(None),
    }
}
