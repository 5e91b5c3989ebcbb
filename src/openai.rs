//! # OpenAI-Style Service Client
//!
//! Implements [`RecipeService`] over a chat-completions endpoint. Every
//! method is one prompt, one blocking await, one JSON response; there is no
//! retry, timeout or cancellation, and a failure surfaces to the caller
//! with core state untouched.
//!
//! Responses are requested in JSON mode and decoded into the boundary
//! types; a response that does not match the expected shape is a parse
//! error, not a service error.

use crate::config::{CoreConfig, API_KEY_ENV};
use crate::error::CoreError;
use crate::nutrition::{Nutrients, NutritionProfile};
use crate::recipe::{ParseError, RecipeCandidate};
use crate::service::{ParsedItem, ReceiptItem, RecipeService, SufficiencyJudgement};
use anyhow::{Context, Result};
use base64::Engine;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

const UNIT_VOCABULARY_RULE: &str =
    "Units must be exactly one of: count, gram, kilogram, milliliter, liter.";

/// Client for an OpenAI-compatible chat-completions API
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ItemsPayload {
    items: Vec<ParsedItem>,
}

#[derive(Debug, Deserialize)]
struct ReceiptPayload {
    items: Vec<ReceiptItem>,
}

#[derive(Debug, Deserialize)]
struct RecipesPayload {
    recipes: Vec<RecipeCandidate>,
}

impl OpenAiClient {
    /// Build a client from the configuration, reading the API key from the
    /// environment
    pub fn from_env(config: &CoreConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .with_context(|| format!("{API_KEY_ENV} must be set"))?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// One chat-completions round trip, decoding the reply into `T`
    async fn complete_json<T: DeserializeOwned>(
        &self,
        system_prompt: &str,
        user_content: Value,
    ) -> Result<T, CoreError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_content },
            ],
            "response_format": { "type": "json_object" },
        });

        debug!("Calling service model {} at {url}", self.model);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| CoreError::ExternalService(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(CoreError::ExternalService(format!("{status}: {error_body}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|err| CoreError::ExternalService(format!("unreadable response: {err}")))?;
        let content = chat
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| CoreError::ExternalService("empty response".to_string()))?;

        serde_json::from_str(strip_code_fences(content))
            .map_err(|err| CoreError::Parse(ParseError::Payload(err.to_string())))
    }
}

/// Models occasionally fence their JSON despite JSON mode
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

impl RecipeService for OpenAiClient {
    async fn parse_ingredients(&self, free_text: &str) -> Result<Vec<ParsedItem>, CoreError> {
        let system = format!(
            "Extract food ingredients from the user's text. Respond with JSON \
             {{\"items\": [{{\"name\": string, \"quantity\": number, \"unit\": string}}]}}. \
             {UNIT_VOCABULARY_RULE}"
        );
        let payload: ItemsPayload = self.complete_json(&system, json!(free_text)).await?;
        Ok(payload.items)
    }

    async fn parse_receipt_image(&self, image: &[u8]) -> Result<Vec<ReceiptItem>, CoreError> {
        let system = format!(
            "Extract the purchased food items from this receipt photo. Respond with JSON \
             {{\"items\": [{{\"name\": string, \"quantity\": number, \"unit\": string, \
             \"price\": number or null}}]}}. Price is the line total. {UNIT_VOCABULARY_RULE}"
        );
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let user_content = json!([
            { "type": "text", "text": "Read this receipt." },
            { "type": "image_url", "image_url": { "url": format!("data:image/jpeg;base64,{encoded}") } },
        ]);
        let payload: ReceiptPayload = self.complete_json(&system, user_content).await?;
        Ok(payload.items)
    }

    async fn compute_target(&self, profile: &NutritionProfile) -> Result<Nutrients, CoreError> {
        let system = "Estimate a daily nutrition target for this person. Respond with JSON \
                      {\"calories\": number, \"protein\": number, \"carbs\": number, \
                      \"fat\": number} (kcal and grams).";
        let user = serde_json::to_value(profile)
            .map_err(|err| CoreError::Parse(ParseError::Payload(err.to_string())))?;
        self.complete_json(system, user).await
    }

    async fn recommend_recipes(
        &self,
        inventory: &str,
        deficiency: &Nutrients,
        recent_meal_names: &[String],
    ) -> Result<Vec<RecipeCandidate>, CoreError> {
        let system = format!(
            "Recommend 3 recipes cookable mostly from the inventory, favoring the nutrient \
             deficiency and avoiding the recent meals. Respond with JSON {{\"recipes\": \
             [{{\"name\": string, \"nutrition\": {{\"calories\", \"protein\", \"carbs\", \
             \"fat\"}}, \"ingredient_lines\": [\"<name> <number><unit suffix>\"], \"steps\": \
             [string], \"external_search_query\": string}}]}}. Ingredient lines use suffixes \
             g, kg, ml, l, or a bare number for count. {UNIT_VOCABULARY_RULE}"
        );
        let user = json!({
            "inventory": inventory,
            "deficiency": deficiency,
            "recent_meals": recent_meal_names,
        });
        let payload: RecipesPayload = self.complete_json(&system, user).await?;
        Ok(payload.recipes)
    }

    async fn recommend_deficiency_focused(
        &self,
        deficiency: &Nutrients,
        inventory: &str,
    ) -> Result<Vec<RecipeCandidate>, CoreError> {
        let system = format!(
            "Recommend 3 recipes that best close the nutrient deficiency, even if extra \
             shopping is needed. Respond with the same JSON shape as recipe \
             recommendations, adding per recipe \"reason\": string and \
             \"missing_ingredients\": [string] for items not in the inventory. \
             {UNIT_VOCABULARY_RULE}"
        );
        let user = json!({ "deficiency": deficiency, "inventory": inventory });
        let payload: RecipesPayload = self.complete_json(&system, user).await?;
        Ok(payload.recipes)
    }

    async fn judge_sufficiency(
        &self,
        inventory: &str,
        ingredient_lines: &[String],
    ) -> Result<SufficiencyJudgement, CoreError> {
        let system = "Judge loosely whether the inventory can cover the recipe's ingredients. \
                      Respond with JSON {\"sufficient\": boolean, \"missing_items\": [string]}.";
        let user = json!({ "inventory": inventory, "ingredient_lines": ingredient_lines });
        self.complete_json(system, user).await
    }
}
