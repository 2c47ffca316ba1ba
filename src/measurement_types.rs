//! # Measurement Types Module
//!
//! This module defines the units and per-serving baselines used for portion
//! scaling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement units used in portion baselines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Grams, promoted to kilograms at 1000
    Grams,
    /// Millilitres, promoted to litres at 500
    Milliliters,
    /// Whole items (个)
    Pieces,
    /// Garlic cloves (瓣)
    Cloves,
    /// Stalks (根)
    Stalks,
    /// Slices or leaves (片)
    Slices,
}

impl Unit {
    /// Suffix appended to a rendered amount
    pub fn display_name(&self) -> &'static str {
        match self {
            Unit::Grams => "g",
            Unit::Milliliters => "ml",
            Unit::Pieces => "个",
            Unit::Cloves => "瓣",
            Unit::Stalks => "根",
            Unit::Slices => "片",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Standard amount of an ingredient for one serving
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortionBaseline {
    /// Amount for one person
    pub amount: f64,
    /// Unit of `amount`
    pub unit: Unit,
}

impl PortionBaseline {
    /// Create a baseline
    pub const fn new(amount: f64, unit: Unit) -> Self {
        Self { amount, unit }
    }

    /// Total amount for the given number of servings
    pub fn total_for(&self, servings: u32) -> f64 {
        self.amount * f64::from(servings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_suffixes() {
        assert_eq!(Unit::Stalks.to_string(), "根");
        assert_eq!(Unit::Milliliters.display_name(), "ml");
    }

    #[test]
    fn test_total_for() {
        let salt = PortionBaseline::new(3.0, Unit::Grams);
        assert_eq!(salt.total_for(4), 12.0);
    }
}
