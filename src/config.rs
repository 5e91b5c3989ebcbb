//! # Core Configuration Module
//!
//! Configuration knobs for the session core and the generative-text service
//! client, with environment-variable overrides.

// Defaults for the session core
pub const DEFAULT_PIECE_MASS_G: f64 = 100.0;
pub const DEFAULT_PERIOD_DAYS: u32 = 7;

// Defaults for the service client
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for one session's core logic
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Fallback average mass in grams for count-based ingredients missing
    /// from the curated table
    pub default_piece_mass_g: f64,
    /// Rolling window in days for the nutrition daily average
    pub period_days: u32,
    /// Model name sent to the generative-text service
    pub model: String,
    /// Base URL of the generative-text service
    pub base_url: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_piece_mass_g: DEFAULT_PIECE_MASS_G,
            period_days: DEFAULT_PERIOD_DAYS,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl CoreConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    ///
    /// Recognized variables: `PANTRY_PIECE_MASS_G`, `PANTRY_PERIOD_DAYS`,
    /// `PANTRY_MODEL`, `PANTRY_BASE_URL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_piece_mass_g: std::env::var("PANTRY_PIECE_MASS_G")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_piece_mass_g),
            period_days: std::env::var("PANTRY_PERIOD_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.period_days),
            model: std::env::var("PANTRY_MODEL").unwrap_or(defaults.model),
            base_url: std::env::var("PANTRY_BASE_URL").unwrap_or(defaults.base_url),
        }
    }
}
