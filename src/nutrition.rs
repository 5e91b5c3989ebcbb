//! # Nutrition Model and Aggregator
//!
//! Profile, target, meal history and the derived nutrition status. The
//! status is always fully recomputed from the meal history, never patched
//! incrementally.
//!
//! ## Averaging Rule
//!
//! Meals are grouped by the UTC calendar date of their timestamp, summed
//! per day and averaged across the distinct days that actually have meals.
//! Days without meals do not count: the metric is "average on days you
//! ate", so a sparse history reports a higher average on purpose.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The four tracked nutrients. Calories in kcal, the rest in grams.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// The nutrition target type; same shape as an intake snapshot.
pub type NutritionTarget = Nutrients;

impl Nutrients {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Default daily target used until the service computes a personal one
    /// from the profile
    pub fn default_target() -> Self {
        Self { calories: 2000.0, protein: 75.0, carbs: 275.0, fat: 66.7 }
    }

    /// Add another snapshot into this one
    pub fn accumulate(&mut self, other: &Nutrients) {
        self.calories += other.calories;
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fat += other.fat;
    }

    /// Divide every nutrient by `divisor`
    pub fn scaled_down(&self, divisor: f64) -> Self {
        Self {
            calories: self.calories / divisor,
            protein: self.protein / divisor,
            carbs: self.carbs / divisor,
            fat: self.fat / divisor,
        }
    }

    /// Per-nutrient shortfall of `intake` below this target, floored at zero
    pub fn deficiency_against(&self, intake: &Nutrients) -> Self {
        Self {
            calories: (self.calories - intake.calories).max(0.0),
            protein: (self.protein - intake.protein).max(0.0),
            carbs: (self.carbs - intake.carbs).max(0.0),
            fat: (self.fat - intake.fat).max(0.0),
        }
    }
}

/// Biological sex, as used by the target estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// Five-level activity scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

/// The household member's profile. Mutated only by explicit profile edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionProfile {
    pub age: u32,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
}

impl Default for NutritionProfile {
    fn default() -> Self {
        Self {
            age: 25,
            sex: Sex::Male,
            height_cm: 175.0,
            weight_kg: 70.0,
            activity_level: ActivityLevel::Moderate,
        }
    }
}

/// One consumed meal. Append-only; ordering is chronological append order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub timestamp: DateTime<Utc>,
    pub recipe_name: String,
    pub nutrition: Nutrients,
}

/// Derived intake status; never mutated independently
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionStatus {
    /// Rolling window the average was computed over, in days
    pub period_days: u32,
    pub daily_average: Nutrients,
    pub daily_target: Nutrients,
    pub deficiency: Nutrients,
}

impl NutritionStatus {
    /// Status for an empty history: zero intake, full deficiency
    pub fn empty(target: &Nutrients, period_days: u32) -> Self {
        Self {
            period_days,
            daily_average: Nutrients::zero(),
            daily_target: *target,
            deficiency: *target,
        }
    }
}

/// Recompute the nutrition status from scratch.
///
/// `meals` is expected to already be limited to the reporting window;
/// `period_days` is only carried through for display.
pub fn recompute(meals: &[MealRecord], target: &Nutrients, period_days: u32) -> NutritionStatus {
    if meals.is_empty() {
        return NutritionStatus::empty(target, period_days);
    }

    let mut per_day: BTreeMap<NaiveDate, Nutrients> = BTreeMap::new();
    for meal in meals {
        per_day
            .entry(meal.timestamp.date_naive())
            .or_insert_with(Nutrients::zero)
            .accumulate(&meal.nutrition);
    }

    let mut total = Nutrients::zero();
    for day_sum in per_day.values() {
        total.accumulate(day_sum);
    }
    let daily_average = total.scaled_down(per_day.len() as f64);

    NutritionStatus {
        period_days,
        daily_average,
        daily_target: *target,
        deficiency: target.deficiency_against(&daily_average),
    }
}
