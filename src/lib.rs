//! # whattoeat
//!
//! A recipe recommendation engine: matches the ingredients a user has against
//! a recipe catalog, keeps a menu, a pantry and a shopping list in sync through
//! a synchronous reconciliation bus, and scales portions for a serving count.

pub mod config;
pub mod favorites;
pub mod ingredient_matcher;
pub mod kitchen;
pub mod localization;
pub mod measurement_patterns;
pub mod measurement_types;
pub mod menu;
pub mod pantry;
pub mod portion_scaler;
pub mod recipe_catalog;
pub mod recipe_model;
pub mod recipe_scorer;
pub mod reconciliation_bus;
pub mod share_link;
pub mod shopping_list;
pub mod storage;
pub mod storage_errors;
pub mod views;
