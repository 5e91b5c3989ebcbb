//! # Pantry
//!
//! Household food inventory and nutrition tracking core: a unit-aware
//! stock ledger, a nutrition aggregator, and a recipe consumption workflow
//! that stays idempotent under a re-entrant, full-recompute rendering model.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod inventory;
pub mod nutrition;
pub mod openai;
pub mod recipe;
pub mod resolver;
pub mod service;
pub mod session;
pub mod units;
pub mod workflow;
