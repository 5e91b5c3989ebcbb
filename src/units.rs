//! # Unit Normalizer
//!
//! This module defines the unit vocabulary and the conversions between
//! count-based and weight/volume-based quantities.
//!
//! ## Core Concepts
//!
//! - **Unit**: one of the five accepted measurement units (count, gram,
//!   kilogram, milliliter, liter)
//! - **Base unit**: grams for the mass dimension, milliliters for volume
//! - **Average piece mass**: curated per-ingredient constants used to convert
//!   count-based stock (e.g. "2 onions") into grams
//!
//! Mass and volume are never cross-converted. Count-based outputs round to
//! the nearest 0.5 and never go negative.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

lazy_static! {
    /// Curated average masses in grams for one piece of a count-based
    /// ingredient. Lookup is case-insensitive; unknown names fall back to
    /// the normalizer's configured default.
    static ref AVERAGE_PIECE_MASS_G: HashMap<&'static str, f64> = {
        let mut map = HashMap::new();
        map.insert("onion", 200.0);
        map.insert("egg", 50.0);
        map.insert("garlic", 5.0);
        map.insert("garlic clove", 5.0);
        map.insert("potato", 150.0);
        map.insert("carrot", 100.0);
        map.insert("tomato", 120.0);
        map.insert("apple", 180.0);
        map.insert("banana", 100.0);
        map.insert("orange", 130.0);
        map.insert("lemon", 80.0);
        map.insert("lime", 50.0);
        map.insert("cucumber", 200.0);
        map.insert("zucchini", 200.0);
        map.insert("bell pepper", 120.0);
        map.insert("avocado", 170.0);
        map.insert("mushroom", 20.0);
        map.insert("scallion", 15.0);
        map
    };
}

/// The five measurement units accepted at every boundary of the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Individual pieces ("2 eggs")
    Count,
    /// Grams
    Gram,
    /// Kilograms
    Kilogram,
    /// Milliliters
    Milliliter,
    /// Liters
    Liter,
}

/// The physical dimension a quantity normalizes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseDimension {
    /// Base unit: grams
    Mass,
    /// Base unit: milliliters
    Volume,
}

impl BaseDimension {
    /// Symbol of the dimension's base unit
    pub fn symbol(&self) -> &'static str {
        match self {
            BaseDimension::Mass => "g",
            BaseDimension::Volume => "ml",
        }
    }
}

impl fmt::Display for BaseDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Unit {
    /// Parse a unit token from the boundary vocabulary.
    ///
    /// Accepts the five unit words (with an optional plural "s") and the
    /// suffix forms `g`, `kg`, `ml`, `l`. Any other token is an error.
    pub fn parse_token(token: &str) -> Result<Unit, UnitError> {
        let lower = token.trim().to_lowercase();

        match lower.as_str() {
            "count" | "counts" | "" => Ok(Unit::Count),
            "g" | "gram" | "grams" => Ok(Unit::Gram),
            "kg" | "kilogram" | "kilograms" => Ok(Unit::Kilogram),
            "ml" | "milliliter" | "milliliters" => Ok(Unit::Milliliter),
            "l" | "liter" | "liters" => Ok(Unit::Liter),
            _ => Err(UnitError::UnknownToken(token.trim().to_string())),
        }
    }

    /// Short display symbol for the unit
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Count => "count",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Milliliter => "ml",
            Unit::Liter => "l",
        }
    }

    /// The dimension this unit normalizes into. Count-based quantities
    /// convert to mass through the average-piece table.
    pub fn dimension(&self) -> BaseDimension {
        match self {
            Unit::Count | Unit::Gram | Unit::Kilogram => BaseDimension::Mass,
            Unit::Milliliter | Unit::Liter => BaseDimension::Volume,
        }
    }

    /// Check if this is a weight unit
    pub fn is_mass(&self) -> bool {
        matches!(self, Unit::Gram | Unit::Kilogram)
    }

    /// Check if this is a volume unit
    pub fn is_volume(&self) -> bool {
        matches!(self, Unit::Milliliter | Unit::Liter)
    }

    /// Check if this is the count unit
    pub fn is_count(&self) -> bool {
        matches!(self, Unit::Count)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Errors from unit parsing and conversion
#[derive(Debug, Clone, PartialEq)]
pub enum UnitError {
    /// The token is not part of the accepted unit vocabulary
    UnknownToken(String),
    /// A conversion between mass and volume was requested
    DimensionMismatch { from: Unit, to: BaseDimension },
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitError::UnknownToken(token) => write!(f, "Unknown unit: {token}"),
            UnitError::DimensionMismatch { from, to } => {
                write!(f, "Cannot convert {from} into {to} (mass and volume never cross-convert)")
            }
        }
    }
}

impl std::error::Error for UnitError {}

/// Converts between count-based and weight/volume-based quantities.
///
/// Count conversions go through [`AVERAGE_PIECE_MASS_G`]; ingredients missing
/// from the table use the configured default piece mass.
#[derive(Debug, Clone)]
pub struct UnitNormalizer {
    default_piece_mass_g: f64,
}

/// Round a count-based quantity to the nearest 0.5 units, floored at zero.
fn round_count(quantity: f64) -> f64 {
    ((quantity * 2.0).round() / 2.0).max(0.0)
}

impl UnitNormalizer {
    /// Create a normalizer with the given fallback mass for ingredients
    /// absent from the curated table
    pub fn new(default_piece_mass_g: f64) -> Self {
        Self { default_piece_mass_g }
    }

    /// Average mass in grams of one piece of the named ingredient
    pub fn piece_mass_g(&self, ingredient_name: &str) -> f64 {
        let key = ingredient_name.trim().to_lowercase();
        AVERAGE_PIECE_MASS_G
            .get(key.as_str())
            .copied()
            .unwrap_or(self.default_piece_mass_g)
    }

    /// Convert a quantity of a mass-dimension unit into grams
    pub fn to_base_mass(&self, quantity: f64, unit: Unit, ingredient_name: &str) -> Result<f64, UnitError> {
        match unit {
            Unit::Count => Ok(quantity * self.piece_mass_g(ingredient_name)),
            Unit::Gram => Ok(quantity),
            Unit::Kilogram => Ok(quantity * 1000.0),
            Unit::Milliliter | Unit::Liter => Err(UnitError::DimensionMismatch {
                from: unit,
                to: BaseDimension::Mass,
            }),
        }
    }

    /// Convert a quantity of a volume-dimension unit into milliliters
    pub fn to_base_volume(&self, quantity: f64, unit: Unit) -> Result<f64, UnitError> {
        match unit {
            Unit::Milliliter => Ok(quantity),
            Unit::Liter => Ok(quantity * 1000.0),
            Unit::Count | Unit::Gram | Unit::Kilogram => Err(UnitError::DimensionMismatch {
                from: unit,
                to: BaseDimension::Volume,
            }),
        }
    }

    /// Convert a quantity into the base unit of its own dimension.
    /// Returns the converted magnitude together with the dimension.
    pub fn to_common_base(
        &self,
        quantity: f64,
        unit: Unit,
        ingredient_name: &str,
    ) -> Result<(f64, BaseDimension), UnitError> {
        match unit.dimension() {
            BaseDimension::Mass => Ok((
                self.to_base_mass(quantity, unit, ingredient_name)?,
                BaseDimension::Mass,
            )),
            BaseDimension::Volume => {
                Ok((self.to_base_volume(quantity, unit)?, BaseDimension::Volume))
            }
        }
    }

    /// Inverse of [`to_base_mass`](Self::to_base_mass): express grams in the
    /// target unit. Count outputs round to the nearest 0.5, never negative.
    pub fn from_base_mass(&self, grams: f64, target_unit: Unit, ingredient_name: &str) -> Result<f64, UnitError> {
        match target_unit {
            Unit::Count => Ok(round_count(grams / self.piece_mass_g(ingredient_name))),
            Unit::Gram => Ok(grams.max(0.0)),
            Unit::Kilogram => Ok((grams / 1000.0).max(0.0)),
            Unit::Milliliter | Unit::Liter => Err(UnitError::DimensionMismatch {
                from: target_unit,
                to: BaseDimension::Mass,
            }),
        }
    }

    /// Inverse of [`to_base_volume`](Self::to_base_volume)
    pub fn from_base_volume(&self, milliliters: f64, target_unit: Unit) -> Result<f64, UnitError> {
        match target_unit {
            Unit::Milliliter => Ok(milliliters.max(0.0)),
            Unit::Liter => Ok((milliliters / 1000.0).max(0.0)),
            Unit::Count | Unit::Gram | Unit::Kilogram => Err(UnitError::DimensionMismatch {
                from: target_unit,
                to: BaseDimension::Volume,
            }),
        }
    }

    /// Express a base-dimension magnitude in the target unit
    pub fn from_base(
        &self,
        magnitude: f64,
        dimension: BaseDimension,
        target_unit: Unit,
        ingredient_name: &str,
    ) -> Result<f64, UnitError> {
        match dimension {
            BaseDimension::Mass => self.from_base_mass(magnitude, target_unit, ingredient_name),
            BaseDimension::Volume => self.from_base_volume(magnitude, target_unit),
        }
    }
}

impl Default for UnitNormalizer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PIECE_MASS_G)
    }
}
