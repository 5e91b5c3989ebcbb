//! # Generative-Text Service Boundary
//!
//! The narrow contract the core consumes from the external generative-text
//! service: ingredient extraction from free text and receipt images,
//! nutrition-target estimation, recipe recommendation and an advisory
//! sufficiency judgment.
//!
//! Calls are single-outstanding per action, with no retry, timeout or
//! cancellation; a failed call surfaces to the action's caller and leaves
//! core state untouched. The unit vocabulary on this wire is the crate's
//! five-unit [`Unit`](crate::units::Unit) enum; any other token fails to
//! decode.

use crate::error::CoreError;
use crate::nutrition::{Nutrients, NutritionProfile};
use crate::recipe::RecipeCandidate;
use crate::units::Unit;
use serde::{Deserialize, Serialize};

/// One ingredient extracted from free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedItem {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
}

/// One line item extracted from a receipt image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    /// Total price paid for the line, if legible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// The service's advisory take on whether stock covers a recipe.
/// Never authoritative; the deterministic resolver decides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SufficiencyJudgement {
    pub sufficient: bool,
    #[serde(default)]
    pub missing_items: Vec<String>,
}

/// The request/response contract with the generative-text service
#[allow(async_fn_in_trait)]
pub trait RecipeService {
    /// Extract structured ingredients from free text
    async fn parse_ingredients(&self, free_text: &str) -> Result<Vec<ParsedItem>, CoreError>;

    /// Extract purchased items and prices from a receipt image
    async fn parse_receipt_image(&self, image: &[u8]) -> Result<Vec<ReceiptItem>, CoreError>;

    /// Estimate a daily nutrition target from the profile
    async fn compute_target(&self, profile: &NutritionProfile) -> Result<Nutrients, CoreError>;

    /// Recommend recipes from current inventory, deficiency and recent meals
    async fn recommend_recipes(
        &self,
        inventory: &str,
        deficiency: &Nutrients,
        recent_meal_names: &[String],
    ) -> Result<Vec<RecipeCandidate>, CoreError>;

    /// Recommend recipes targeting the deficiency first, annotated with a
    /// reason and the ingredients that would have to be bought
    async fn recommend_deficiency_focused(
        &self,
        deficiency: &Nutrients,
        inventory: &str,
    ) -> Result<Vec<RecipeCandidate>, CoreError>;

    /// Advisory pre-check before committing a consumption
    async fn judge_sufficiency(
        &self,
        inventory: &str,
        ingredient_lines: &[String],
    ) -> Result<SufficiencyJudgement, CoreError>;
}
