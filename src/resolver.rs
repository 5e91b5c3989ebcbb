//! # Consumption Resolver
//!
//! Decides whether the ledger can cover a recipe's ingredient requirements
//! and applies the post-cook decrement. Requirement and stock are compared
//! in the base unit of their shared dimension; stock that only exists in an
//! incompatible dimension counts as absent.
//!
//! Applying a consumption is deliberately tolerant of untracked
//! ingredients: a garnish missing from the ledger is skipped with a
//! warning instead of rolling back the whole cook.

use crate::error::CoreError;
use crate::inventory::{DecrementOutcome, Ledger};
use crate::recipe::Requirement;
use crate::units::{BaseDimension, UnitNormalizer};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Comparison slack for floating-point base quantities
const SUFFICIENCY_EPSILON: f64 = 1e-6;

/// One ingredient the ledger cannot cover. `required` and `available` are
/// in the base unit named by `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortageDetail {
    pub name: String,
    pub required: f64,
    pub available: f64,
    pub base: BaseDimension,
}

/// Outcome of a sufficiency check
#[derive(Debug, Clone, PartialEq)]
pub struct SufficiencyReport {
    pub sufficient: bool,
    pub shortages: Vec<ShortageDetail>,
}

/// Outcome of an applied consumption
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionReport {
    /// Human-readable note per decremented ingredient
    pub consumed: Vec<String>,
    /// Ingredients skipped because they were not tracked in stock
    pub warnings: Vec<String>,
}

/// Check whether current stock covers every requirement.
///
/// Never mutates the ledger. An ingredient absent from stock (or present
/// only in an incompatible dimension) is reported as a shortage with zero
/// availability.
pub fn check_sufficiency(
    ledger: &Ledger,
    normalizer: &UnitNormalizer,
    requirements: &[Requirement],
) -> Result<SufficiencyReport, CoreError> {
    let mut shortages = Vec::new();

    for req in requirements {
        let (required, base) = normalizer.to_common_base(req.quantity, req.unit, &req.name)?;

        let available = match ledger.find_compatible(&req.name, req.unit) {
            Some(item) => normalizer.to_common_base(item.quantity, item.unit, &req.name)?.0,
            None => 0.0,
        };

        if available + SUFFICIENCY_EPSILON < required {
            shortages.push(ShortageDetail {
                name: req.name.clone(),
                required,
                available,
                base,
            });
        }
    }

    Ok(SufficiencyReport { sufficient: shortages.is_empty(), shortages })
}

/// Decrement stock for every requirement.
///
/// All conversions are validated up front so a conversion failure aborts
/// before the first decrement. Ingredients entirely absent from stock are
/// skipped with a recorded warning; every other requirement is applied.
pub fn apply_consumption(
    ledger: &mut Ledger,
    normalizer: &UnitNormalizer,
    requirements: &[Requirement],
) -> Result<ConsumptionReport, CoreError> {
    // Dry-run every conversion before touching the ledger
    for req in requirements {
        normalizer.to_common_base(req.quantity, req.unit, &req.name)?;
        if let Some(item) = ledger.find_compatible(&req.name, req.unit) {
            normalizer.to_common_base(item.quantity, item.unit, &req.name)?;
        }
    }

    let mut consumed = Vec::new();
    let mut warnings = Vec::new();

    for req in requirements {
        match ledger.decrement(normalizer, &req.name, req.quantity, req.unit) {
            Ok(DecrementOutcome::Reduced { remaining, unit }) => {
                consumed.push(format!("{}: {} {} remaining", req.name, remaining, unit));
            }
            Ok(DecrementOutcome::Exhausted) => {
                consumed.push(format!("{}: used up", req.name));
            }
            Err(CoreError::NotFound { name }) => {
                warn!("Consumption skipped untracked ingredient: {name}");
                warnings.push(format!("{name}: not tracked in inventory, skipped"));
            }
            Err(other) => return Err(other),
        }
    }

    info!(
        "Consumption applied: {} ingredient(s) decremented, {} skipped",
        consumed.len(),
        warnings.len()
    );
    Ok(ConsumptionReport { consumed, warnings })
}
