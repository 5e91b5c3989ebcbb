//! # Recipe Candidates and Ingredient-Line Parsing
//!
//! This module defines the recipe candidates produced by the generative-text
//! service and the deterministic parser that turns their ingredient lines
//! into structured requirements.
//!
//! ## Line Format
//!
//! An ingredient line is `"<name> <number><unit suffix>"`, e.g. `"onion 150g"`,
//! `"milk 200ml"`, `"egg 2"` (a bare number is a count). The parser returns a
//! structured [`Requirement`] or a typed [`ParseError`]; raw text never
//! reaches the consumption resolver.

use crate::nutrition::Nutrients;
use crate::units::{Unit, UnitError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Pattern for one ingredient line: name, then a number with an optional
/// unit suffix at the end of the line.
static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)\s+(?P<qty>\d+(?:\.\d+)?)\s*(?P<unit>[A-Za-z]*)$").unwrap()
});

/// A recipe proposed by the generative-text service.
///
/// Immutable once received; the workflow only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCandidate {
    /// Recipe name as surfaced to the user
    pub name: String,
    /// Nutrition snapshot for one serving of the finished dish
    pub nutrition: Nutrients,
    /// Ordered ingredient lines, each `"<name> <number><unit suffix>"`
    pub ingredient_lines: Vec<String>,
    /// Preparation steps
    pub steps: Vec<String>,
    /// Query string for an external recipe search
    #[serde(default)]
    pub external_search_query: String,
    /// Why this recipe was recommended (deficiency-focused recommendations)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Ingredients the service believes are not in stock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_ingredients: Option<Vec<String>>,
}

/// A parsed ingredient requirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.name, self.quantity, self.unit)
    }
}

/// Parse a single ingredient line into a requirement
pub fn parse_requirement_line(line: &str) -> Result<Requirement, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::EmptyLine);
    }

    let captures = LINE_PATTERN
        .captures(line)
        .ok_or_else(|| ParseError::MissingQuantity(line.to_string()))?;

    let name = captures["name"].trim().to_string();
    let quantity: f64 = captures["qty"]
        .parse()
        .map_err(|_| ParseError::InvalidNumber(captures["qty"].to_string()))?;
    let unit = Unit::parse_token(&captures["unit"])?;

    Ok(Requirement { name, quantity, unit })
}

/// Parse every ingredient line of a recipe.
///
/// Any malformed line aborts the whole parse; consumption never starts from
/// a partially understood ingredient list.
pub fn parse_requirement_lines(lines: &[String]) -> Result<Vec<Requirement>, ParseError> {
    lines.iter().map(|line| parse_requirement_line(line)).collect()
}

/// Errors from ingredient-line parsing and service-payload decoding
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The line was empty
    EmptyLine,
    /// The line carries no trailing quantity
    MissingQuantity(String),
    /// The quantity is not a valid number
    InvalidNumber(String),
    /// The unit token is outside the accepted vocabulary
    Unit(UnitError),
    /// A service response did not match the expected shape
    Payload(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyLine => write!(f, "Empty ingredient line"),
            ParseError::MissingQuantity(line) => {
                write!(f, "No quantity found in ingredient line: {line}")
            }
            ParseError::InvalidNumber(raw) => write!(f, "Invalid number: {raw}"),
            ParseError::Unit(err) => write!(f, "{err}"),
            ParseError::Payload(msg) => write!(f, "Malformed service response: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<UnitError> for ParseError {
    fn from(err: UnitError) -> Self {
        ParseError::Unit(err)
    }
}
