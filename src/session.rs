//! # Session State and Commands
//!
//! One [`Session`] owns everything a household's sitting touches: the
//! ledger, the profile and target, the meal and expense logs, the recipe
//! workflow and the dispatcher. Nothing is shared across sessions and no
//! locking is needed; access is re-entrant sequential, never parallel.
//!
//! All mutation enters through [`Session::dispatch`] with an explicit
//! [`Action`] command object. Rendering never mutates ambiently: a replayed
//! action id short-circuits to its memoized [`ActionOutcome`], which is
//! what keeps stock from being decremented twice and the external service
//! from being called twice for one gesture.

use crate::config::CoreConfig;
use crate::dispatch::Dispatcher;
use crate::error::CoreError;
use crate::inventory::{Ledger, StockItem};
use crate::nutrition::{self, MealRecord, Nutrients, NutritionProfile, NutritionStatus};
use crate::recipe::parse_requirement_lines;
use crate::resolver;
use crate::service::{ReceiptItem, RecipeService};
use crate::units::UnitNormalizer;
use crate::workflow::{Workflow, WorkflowState};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// One purchase, appended when a receipt is ingested. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub timestamp: DateTime<Utc>,
    /// Total paid, non-negative
    pub amount: f64,
    /// Short description of what the purchase covered
    pub item_summary: String,
}

/// A logical user action. The id of each variant derives from its
/// user-visible trigger, so a re-rendered gesture replays the same id.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Extract ingredients from free text and stock them
    IngestText { input_id: String, text: String },
    /// Extract purchased items from a receipt image, stock them and record
    /// the expense
    IngestReceipt { input_id: String, image: Vec<u8> },
    /// Stock one manually entered item
    AddItem { entry_id: String, item: StockItem },
    /// Drop every record with this name from the ledger
    RemoveItem { entry_id: String, name: String },
    /// Replace the profile and recompute the target through the service
    UpdateProfile { edit_id: String, profile: NutritionProfile },
    /// Ask the service for recipes fitting inventory and deficiency
    RequestRecommendations { request_id: String },
    /// Ask the service for deficiency-focused recipes
    RequestDeficiencyRecipes { request_id: String },
    /// Consume the indexed candidate recipe
    CookRecipe { index: usize },
    /// Drop the focused recipe and its candidate list
    Dismiss,
}

impl Action {
    /// Stable id of the triggering gesture
    pub fn id(&self) -> String {
        match self {
            Action::IngestText { input_id, .. } => format!("ingest_text_{input_id}"),
            Action::IngestReceipt { input_id, .. } => format!("ingest_receipt_{input_id}"),
            Action::AddItem { entry_id, .. } => format!("add_item_{entry_id}"),
            Action::RemoveItem { entry_id, .. } => format!("remove_item_{entry_id}"),
            Action::UpdateProfile { edit_id, .. } => format!("update_profile_{edit_id}"),
            Action::RequestRecommendations { request_id } => format!("recommend_{request_id}"),
            Action::RequestDeficiencyRecipes { request_id } => {
                format!("recommend_deficiency_{request_id}")
            }
            Action::CookRecipe { index } => format!("consume_recipe_{index}"),
            Action::Dismiss => "dismiss_focus".to_string(),
        }
    }

    /// Whether completing this action starts a new logical context, after
    /// which earlier trigger identities describe new gestures
    fn resets_dispatch_memory(&self) -> bool {
        matches!(
            self,
            Action::RequestRecommendations { .. }
                | Action::RequestDeficiencyRecipes { .. }
                | Action::Dismiss
        )
    }
}

/// What a completed action produced. Memoized by the dispatcher and
/// returned verbatim on replay.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    ItemsAdded { count: usize },
    ItemRemoved { existed: bool },
    ProfileUpdated { target: Nutrients },
    CandidatesReceived { count: usize },
    Cooked { recipe_name: String, warnings: Vec<String>, status: NutritionStatus },
    Dismissed,
}

/// All state of one household session
#[derive(Debug)]
pub struct Session {
    config: CoreConfig,
    normalizer: UnitNormalizer,
    ledger: Ledger,
    profile: NutritionProfile,
    target: Nutrients,
    meal_history: Vec<MealRecord>,
    expenses: Vec<ExpenseRecord>,
    status: NutritionStatus,
    workflow: Workflow,
    dispatcher: Dispatcher,
}

impl Session {
    pub fn new(config: CoreConfig) -> Self {
        let target = Nutrients::default_target();
        let status = NutritionStatus::empty(&target, config.period_days);
        let normalizer = UnitNormalizer::new(config.default_piece_mass_g);
        Self {
            config,
            normalizer,
            ledger: Ledger::new(),
            profile: NutritionProfile::default(),
            target,
            meal_history: Vec::new(),
            expenses: Vec::new(),
            status,
            workflow: Workflow::new(),
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn profile(&self) -> &NutritionProfile {
        &self.profile
    }

    pub fn target(&self) -> &Nutrients {
        &self.target
    }

    pub fn status(&self) -> &NutritionStatus {
        &self.status
    }

    pub fn meal_history(&self) -> &[MealRecord] {
        &self.meal_history
    }

    pub fn expenses(&self) -> &[ExpenseRecord] {
        &self.expenses
    }

    pub fn workflow(&self) -> &WorkflowState {
        self.workflow.state()
    }

    /// Total spend across expense records in `[from, to]`
    pub fn total_spent_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
        self.expenses
            .iter()
            .filter(|e| e.timestamp >= from && e.timestamp <= to)
            .map(|e| e.amount)
            .sum()
    }

    /// Execute one user action exactly once.
    ///
    /// A replayed action id (the surrounding render loop re-entered the
    /// flow) returns the memoized outcome without touching state or the
    /// service. Errors leave all state unchanged and are not memoized.
    pub async fn dispatch<S: RecipeService>(
        &mut self,
        service: &S,
        action: Action,
    ) -> Result<ActionOutcome, CoreError> {
        let action_id = action.id();
        if let Some(previous) = self.dispatcher.completed(&action_id) {
            debug!("Action {action_id} already completed, returning memoized outcome");
            return Ok(previous);
        }

        info!("Dispatching action: {action_id}");
        let resets = action.resets_dispatch_memory();
        let outcome = self.execute(service, action).await?;

        if resets {
            self.dispatcher.reset();
        }
        self.dispatcher.record(&action_id, outcome.clone());
        Ok(outcome)
    }

    async fn execute<S: RecipeService>(
        &mut self,
        service: &S,
        action: Action,
    ) -> Result<ActionOutcome, CoreError> {
        match action {
            Action::IngestText { text, .. } => self.ingest_text(service, &text).await,
            Action::IngestReceipt { image, .. } => self.ingest_receipt(service, &image).await,
            Action::AddItem { item, .. } => {
                self.ledger.add_or_merge(item);
                Ok(ActionOutcome::ItemsAdded { count: 1 })
            }
            Action::RemoveItem { name, .. } => {
                let existed = self.ledger.remove(&name);
                Ok(ActionOutcome::ItemRemoved { existed })
            }
            Action::UpdateProfile { profile, .. } => self.update_profile(service, profile).await,
            Action::RequestRecommendations { .. } => {
                let recent = self.recent_meal_names(5);
                let candidates = service
                    .recommend_recipes(&self.ledger.summary(), &self.status.deficiency, &recent)
                    .await?;
                let count = candidates.len();
                self.workflow.receive_candidates(candidates);
                Ok(ActionOutcome::CandidatesReceived { count })
            }
            Action::RequestDeficiencyRecipes { .. } => {
                let candidates = service
                    .recommend_deficiency_focused(&self.status.deficiency, &self.ledger.summary())
                    .await?;
                let count = candidates.len();
                self.workflow.receive_candidates(candidates);
                Ok(ActionOutcome::CandidatesReceived { count })
            }
            Action::CookRecipe { index } => self.cook_recipe(service, index).await,
            Action::Dismiss => {
                self.workflow.dismiss()?;
                Ok(ActionOutcome::Dismissed)
            }
        }
    }

    async fn ingest_text<S: RecipeService>(
        &mut self,
        service: &S,
        text: &str,
    ) -> Result<ActionOutcome, CoreError> {
        // The service call completes before any mutation
        let parsed = service.parse_ingredients(text).await?;
        let now = Utc::now();

        for item in &parsed {
            self.ledger.add_or_merge(StockItem {
                name: item.name.clone(),
                quantity: item.quantity,
                unit: item.unit,
                acquired_at: now,
                expires_at: None,
                unit_price: None,
            });
        }
        Ok(ActionOutcome::ItemsAdded { count: parsed.len() })
    }

    async fn ingest_receipt<S: RecipeService>(
        &mut self,
        service: &S,
        image: &[u8],
    ) -> Result<ActionOutcome, CoreError> {
        let items = service.parse_receipt_image(image).await?;
        let now = Utc::now();

        let amount: f64 = items.iter().filter_map(|item| item.price).sum();
        let item_summary = items
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        for item in &items {
            self.ledger.add_or_merge(receipt_stock_item(item, now));
        }
        self.expenses.push(ExpenseRecord { timestamp: now, amount, item_summary });
        info!("Receipt ingested: {} item(s), {amount} spent", items.len());
        Ok(ActionOutcome::ItemsAdded { count: items.len() })
    }

    async fn update_profile<S: RecipeService>(
        &mut self,
        service: &S,
        profile: NutritionProfile,
    ) -> Result<ActionOutcome, CoreError> {
        let target = service.compute_target(&profile).await?;
        self.profile = profile;
        self.target = target;
        self.recompute_status();
        Ok(ActionOutcome::ProfileUpdated { target })
    }

    async fn cook_recipe<S: RecipeService>(
        &mut self,
        service: &S,
        index: usize,
    ) -> Result<ActionOutcome, CoreError> {
        let candidate = self.workflow.candidate(index)?.clone();

        // Advisory opinion only; the deterministic resolver is authoritative
        // and an advisory failure never blocks the cook.
        match service
            .judge_sufficiency(&self.ledger.summary(), &candidate.ingredient_lines)
            .await
        {
            Ok(judgement) if !judgement.sufficient => {
                warn!(
                    "Advisory check flags '{}' as short on: {:?}",
                    candidate.name, judgement.missing_items
                );
            }
            Ok(_) => {}
            Err(err) => warn!("Advisory sufficiency check failed: {err}"),
        }

        let requirements = parse_requirement_lines(&candidate.ingredient_lines)?;

        let report = resolver::check_sufficiency(&self.ledger, &self.normalizer, &requirements)?;
        if !report.sufficient {
            return Err(CoreError::InsufficientStock { shortages: report.shortages });
        }

        let consumption =
            resolver::apply_consumption(&mut self.ledger, &self.normalizer, &requirements)?;
        self.meal_history.push(MealRecord {
            timestamp: Utc::now(),
            recipe_name: candidate.name.clone(),
            nutrition: candidate.nutrition,
        });
        self.recompute_status();
        self.workflow.commit(index)?;

        info!("Cooked '{}'", candidate.name);
        Ok(ActionOutcome::Cooked {
            recipe_name: candidate.name,
            warnings: consumption.warnings,
            status: self.status.clone(),
        })
    }

    /// Full recompute of the derived nutrition status over the configured
    /// rolling window
    fn recompute_status(&mut self) {
        let cutoff = Utc::now() - Duration::days(self.config.period_days as i64);
        let window: Vec<MealRecord> = self
            .meal_history
            .iter()
            .filter(|meal| meal.timestamp >= cutoff)
            .cloned()
            .collect();
        self.status = nutrition::recompute(&window, &self.target, self.config.period_days);
    }

    fn recent_meal_names(&self, limit: usize) -> Vec<String> {
        self.meal_history
            .iter()
            .rev()
            .take(limit)
            .map(|meal| meal.recipe_name.clone())
            .collect()
    }
}

fn receipt_stock_item(item: &ReceiptItem, now: DateTime<Utc>) -> StockItem {
    let unit_price = item.price.map(|price| {
        if item.quantity > 0.0 {
            price / item.quantity
        } else {
            price
        }
    });
    StockItem {
        name: item.name.clone(),
        quantity: item.quantity,
        unit: item.unit,
        acquired_at: now,
        expires_at: None,
        unit_price,
    }
}
