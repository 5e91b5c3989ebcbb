//! # Core Error Types
//!
//! This module defines the error taxonomy shared by every core operation.
//! No variant is fatal to the session: after any error the session remains
//! in a valid, previously-reached state.

use crate::recipe::ParseError;
use crate::resolver::ShortageDetail;
use crate::units::UnitError;
use std::fmt;

/// Errors surfaced by session actions
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Network/auth/format failure at the generative-text boundary.
    /// Surfaced verbatim; no state is mutated.
    ExternalService(String),
    /// An ingredient line or service response did not match the expected
    /// shape. The triggering action aborts before any mutation.
    Parse(ParseError),
    /// A decrement targeted a ledger item absent from stock. Reported
    /// per item, never aborts an overall consumption.
    NotFound { name: String },
    /// The sufficiency check reported shortages; the workflow stays in
    /// `Listing` and nothing is mutated.
    InsufficientStock { shortages: Vec<ShortageDetail> },
    /// The action is not valid in the workflow's current state
    InvalidTransition { action: &'static str, state: &'static str },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::ExternalService(msg) => write!(f, "External service error: {msg}"),
            CoreError::Parse(err) => write!(f, "Parse error: {err}"),
            CoreError::NotFound { name } => write!(f, "Not in stock: {name}"),
            CoreError::InsufficientStock { shortages } => {
                write!(f, "Insufficient stock for {} ingredient(s): ", shortages.len())?;
                let names: Vec<&str> = shortages.iter().map(|s| s.name.as_str()).collect();
                write!(f, "{}", names.join(", "))
            }
            CoreError::InvalidTransition { action, state } => {
                write!(f, "Cannot {action} while the workflow is {state}")
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<ParseError> for CoreError {
    fn from(err: ParseError) -> Self {
        CoreError::Parse(err)
    }
}

impl From<UnitError> for CoreError {
    fn from(err: UnitError) -> Self {
        CoreError::Parse(ParseError::Unit(err))
    }
}
