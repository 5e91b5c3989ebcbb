//! # Inventory Ledger
//!
//! This module tracks the household's current stock: one record per
//! (ingredient name, unit) pair, with acquisition and expiry bookkeeping.
//!
//! ## Invariants
//!
//! - Every record present in the ledger has `quantity > 0`; a decrement
//!   that reaches zero (or rounds to zero for count-based stock) removes
//!   the record.
//! - Records with the same name but different units stay distinct; merging
//!   only happens on an exact unit match.
//! - Name matching is exact-string and case-sensitive.

use crate::error::CoreError;
use crate::units::{Unit, UnitNormalizer};
use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::{Deserialize, Serialize};

/// One stock record in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub acquired_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
}

impl StockItem {
    /// Create a record acquired now, without expiry or price
    pub fn new(name: &str, quantity: f64, unit: Unit) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            unit,
            acquired_at: Utc::now(),
            expires_at: None,
            unit_price: None,
        }
    }

    /// Set the expiry timestamp
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set the per-unit price
    pub fn with_unit_price(mut self, unit_price: f64) -> Self {
        self.unit_price = Some(unit_price);
        self
    }
}

/// Result of a successful decrement
#[derive(Debug, Clone, PartialEq)]
pub enum DecrementOutcome {
    /// Stock reduced; `remaining` is in the record's stored unit
    Reduced { remaining: f64, unit: Unit },
    /// The record reached zero and was removed
    Exhausted,
}

/// The household's current stock, in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    items: Vec<StockItem>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[StockItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First record with this exact name, regardless of unit
    pub fn get(&self, name: &str) -> Option<&StockItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Record with this exact name and unit
    pub fn find(&self, name: &str, unit: Unit) -> Option<&StockItem> {
        self.items.iter().find(|item| item.name == name && item.unit == unit)
    }

    /// First record with this name whose unit shares the requirement's
    /// dimension (count-based stock is mass-compatible)
    pub fn find_compatible(&self, name: &str, unit: Unit) -> Option<&StockItem> {
        self.items
            .iter()
            .find(|item| item.name == name && item.unit.dimension() == unit.dimension())
    }

    /// Add an item, merging quantities when an existing record matches on
    /// both name and unit. Items with a non-positive quantity are ignored.
    pub fn add_or_merge(&mut self, item: StockItem) {
        if item.quantity <= 0.0 {
            info!("Ignoring non-positive stock item: {} {}", item.name, item.quantity);
            return;
        }

        match self
            .items
            .iter_mut()
            .find(|existing| existing.name == item.name && existing.unit == item.unit)
        {
            Some(existing) => {
                existing.quantity += item.quantity;
                if item.expires_at.is_some() {
                    existing.expires_at = item.expires_at;
                }
                if item.unit_price.is_some() {
                    existing.unit_price = item.unit_price;
                }
                info!(
                    "Merged {} into existing stock, now {} {}",
                    item.name, existing.quantity, existing.unit
                );
            }
            None => {
                info!("Adding stock item: {} {} {}", item.name, item.quantity, item.unit);
                self.items.push(item);
            }
        }
    }

    /// Remove every record with this exact name. Returns whether anything
    /// was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.name != name);
        before != self.items.len()
    }

    /// Subtract `amount` of `unit` from the named stock record.
    ///
    /// The stock and the amount are both taken to the base unit of their
    /// dimension, subtracted there, and the remainder is expressed back in
    /// the record's stored unit (count remainders round to the nearest 0.5).
    /// A remainder of zero or less removes the record.
    ///
    /// Fails with [`CoreError::NotFound`] when no record matches the name
    /// with a compatible dimension; this is a reportable condition, not a
    /// fatal one.
    pub fn decrement(
        &mut self,
        normalizer: &UnitNormalizer,
        name: &str,
        amount: f64,
        unit: Unit,
    ) -> Result<DecrementOutcome, CoreError> {
        let index = self
            .items
            .iter()
            .position(|item| item.name == name && item.unit.dimension() == unit.dimension())
            .ok_or_else(|| CoreError::NotFound { name: name.to_string() })?;

        let item = &self.items[index];
        let (stock_base, dimension) = normalizer.to_common_base(item.quantity, item.unit, name)?;
        let (required_base, _) = normalizer.to_common_base(amount, unit, name)?;

        let remaining_base = stock_base - required_base;
        let remaining = normalizer.from_base(remaining_base, dimension, item.unit, name)?;

        if remaining <= 0.0 {
            let unit = item.unit;
            self.items.remove(index);
            info!("Stock exhausted: {name} ({unit})");
            Ok(DecrementOutcome::Exhausted)
        } else {
            let unit = item.unit;
            self.items[index].quantity = remaining;
            info!("Stock reduced: {name} now {remaining} {unit}");
            Ok(DecrementOutcome::Reduced { remaining, unit })
        }
    }

    /// Records already expired at `now`
    pub fn expired(&self, now: DateTime<Utc>) -> Vec<&StockItem> {
        self.items
            .iter()
            .filter(|item| item.expires_at.is_some_and(|at| at <= now))
            .collect()
    }

    /// Records expiring within the next `days` days (excludes the already
    /// expired)
    pub fn expiring_within(&self, days: i64, now: DateTime<Utc>) -> Vec<&StockItem> {
        let horizon = now + Duration::days(days);
        self.items
            .iter()
            .filter(|item| {
                item.expires_at
                    .is_some_and(|at| at > now && at <= horizon)
            })
            .collect()
    }

    /// Total value of priced stock
    pub fn total_value(&self) -> f64 {
        self.items
            .iter()
            .filter_map(|item| item.unit_price.map(|price| price * item.quantity))
            .sum()
    }

    /// One-line inventory snapshot for service prompts, e.g.
    /// `"onion 1 count; egg 2 count; milk 1 l"`
    pub fn summary(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{} {} {}", item.name, item.quantity, item.unit))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> UnitNormalizer {
        UnitNormalizer::new(100.0)
    }

    #[test]
    fn test_add_or_merge_same_unit_sums() {
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("egg", 2.0, Unit::Count));
        ledger.add_or_merge(StockItem::new("egg", 4.0, Unit::Count));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get("egg").unwrap().quantity, 6.0);
    }

    #[test]
    fn test_add_or_merge_different_unit_stays_distinct() {
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("flour", 500.0, Unit::Gram));
        ledger.add_or_merge(StockItem::new("flour", 1.0, Unit::Kilogram));

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.find("flour", Unit::Gram).unwrap().quantity, 500.0);
        assert_eq!(ledger.find("flour", Unit::Kilogram).unwrap().quantity, 1.0);
    }

    #[test]
    fn test_add_or_merge_ignores_non_positive() {
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("egg", 0.0, Unit::Count));
        ledger.add_or_merge(StockItem::new("egg", -1.0, Unit::Count));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_name_matching_is_case_sensitive() {
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("Egg", 2.0, Unit::Count));
        assert!(ledger.get("egg").is_none());
        assert!(ledger.get("Egg").is_some());
    }

    #[test]
    fn test_decrement_mass_requirement_against_count_stock() {
        // 1 onion is 200g; using 150g leaves 50g = 0.25 pieces,
        // which rounds to half a piece of stock.
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("onion", 1.0, Unit::Count));

        let outcome = ledger
            .decrement(&normalizer(), "onion", 150.0, Unit::Gram)
            .unwrap();
        assert_eq!(
            outcome,
            DecrementOutcome::Reduced { remaining: 0.5, unit: Unit::Count }
        );
        assert_eq!(ledger.get("onion").unwrap().quantity, 0.5);
    }

    #[test]
    fn test_decrement_removes_exhausted_record() {
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("egg", 2.0, Unit::Count));

        let outcome = ledger
            .decrement(&normalizer(), "egg", 100.0, Unit::Gram)
            .unwrap();
        assert_eq!(outcome, DecrementOutcome::Exhausted);
        assert!(ledger.get("egg").is_none());
    }

    #[test]
    fn test_decrement_never_leaves_non_positive_stock() {
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("flour", 100.0, Unit::Gram));

        // Over-consume well past zero
        ledger
            .decrement(&normalizer(), "flour", 400.0, Unit::Gram)
            .unwrap();
        assert!(ledger.get("flour").is_none());

        // A count remainder that rounds to zero is also removed
        ledger.add_or_merge(StockItem::new("onion", 1.0, Unit::Count));
        ledger
            .decrement(&normalizer(), "onion", 190.0, Unit::Gram)
            .unwrap();
        assert!(ledger.get("onion").is_none());
    }

    #[test]
    fn test_decrement_volume_stock() {
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("milk", 1.0, Unit::Liter));

        let outcome = ledger
            .decrement(&normalizer(), "milk", 200.0, Unit::Milliliter)
            .unwrap();
        assert_eq!(
            outcome,
            DecrementOutcome::Reduced { remaining: 0.8, unit: Unit::Liter }
        );
    }

    #[test]
    fn test_decrement_missing_item_is_not_found() {
        let mut ledger = Ledger::new();
        let err = ledger
            .decrement(&normalizer(), "saffron", 1.0, Unit::Gram)
            .unwrap_err();
        assert_eq!(err, CoreError::NotFound { name: "saffron".to_string() });
    }

    #[test]
    fn test_decrement_dimension_mismatch_is_not_found() {
        // Volume requirement cannot target count stock
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("onion", 1.0, Unit::Count));
        let err = ledger
            .decrement(&normalizer(), "onion", 100.0, Unit::Milliliter)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_remove() {
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("flour", 500.0, Unit::Gram));
        ledger.add_or_merge(StockItem::new("flour", 1.0, Unit::Kilogram));

        assert!(ledger.remove("flour"));
        assert!(ledger.is_empty());
        assert!(!ledger.remove("flour"));
    }

    #[test]
    fn test_expiry_views() {
        let now = Utc::now();
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("yogurt", 4.0, Unit::Count).with_expiry(now - Duration::days(1)));
        ledger.add_or_merge(StockItem::new("milk", 1.0, Unit::Liter).with_expiry(now + Duration::days(2)));
        ledger.add_or_merge(StockItem::new("rice", 2.0, Unit::Kilogram));

        let expired: Vec<&str> = ledger.expired(now).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(expired, vec!["yogurt"]);

        let soon: Vec<&str> = ledger
            .expiring_within(3, now)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(soon, vec!["milk"]);
        assert!(ledger.expiring_within(1, now).is_empty());
    }

    #[test]
    fn test_total_value() {
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("egg", 10.0, Unit::Count).with_unit_price(0.5));
        ledger.add_or_merge(StockItem::new("rice", 2.0, Unit::Kilogram));
        assert_eq!(ledger.total_value(), 5.0);
    }

    #[test]
    fn test_summary_format() {
        let mut ledger = Ledger::new();
        ledger.add_or_merge(StockItem::new("onion", 1.0, Unit::Count));
        ledger.add_or_merge(StockItem::new("milk", 1.0, Unit::Liter));
        assert_eq!(ledger.summary(), "onion 1 count; milk 1 l");
    }
}
