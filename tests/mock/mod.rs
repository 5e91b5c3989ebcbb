//! Scripted stand-in for the generative-text service, shared by the
//! integration tests. Counts every call so tests can assert that a
//! re-entrant render never reaches the service twice for one gesture.

use pantry::error::CoreError;
use pantry::nutrition::{Nutrients, NutritionProfile};
use pantry::recipe::RecipeCandidate;
use pantry::service::{ParsedItem, ReceiptItem, RecipeService, SufficiencyJudgement};
use std::cell::{Cell, RefCell};

#[derive(Default)]
pub struct MockService {
    parse_calls: Cell<u32>,
    receipt_calls: Cell<u32>,
    target_calls: Cell<u32>,
    recommend_calls: Cell<u32>,
    judge_calls: Cell<u32>,

    parsed_items: RefCell<Vec<ParsedItem>>,
    receipt_items: RefCell<Vec<ReceiptItem>>,
    target: Cell<Nutrients>,
    candidates: RefCell<Vec<RecipeCandidate>>,
    judgement: RefCell<SufficiencyJudgement>,

    parse_failure: RefCell<Option<String>>,
    judge_failure: RefCell<Option<String>>,
}

#[allow(dead_code)]
impl MockService {
    pub fn new() -> Self {
        Self {
            target: Cell::new(Nutrients::default_target()),
            judgement: RefCell::new(SufficiencyJudgement { sufficient: true, missing_items: vec![] }),
            ..Self::default()
        }
    }

    pub fn script_parsed_items(&self, items: Vec<ParsedItem>) {
        *self.parsed_items.borrow_mut() = items;
    }

    pub fn script_receipt_items(&self, items: Vec<ReceiptItem>) {
        *self.receipt_items.borrow_mut() = items;
    }

    pub fn script_target(&self, target: Nutrients) {
        self.target.set(target);
    }

    pub fn script_candidates(&self, candidates: Vec<RecipeCandidate>) {
        *self.candidates.borrow_mut() = candidates;
    }

    pub fn script_judgement(&self, judgement: SufficiencyJudgement) {
        *self.judgement.borrow_mut() = judgement;
    }

    pub fn fail_parse_with(&self, message: &str) {
        *self.parse_failure.borrow_mut() = Some(message.to_string());
    }

    pub fn recover_parse(&self) {
        *self.parse_failure.borrow_mut() = None;
    }

    pub fn fail_judge_with(&self, message: &str) {
        *self.judge_failure.borrow_mut() = Some(message.to_string());
    }

    pub fn parse_calls(&self) -> u32 {
        self.parse_calls.get()
    }

    pub fn receipt_calls(&self) -> u32 {
        self.receipt_calls.get()
    }

    pub fn target_calls(&self) -> u32 {
        self.target_calls.get()
    }

    pub fn recommend_calls(&self) -> u32 {
        self.recommend_calls.get()
    }

    pub fn judge_calls(&self) -> u32 {
        self.judge_calls.get()
    }
}

impl RecipeService for MockService {
    async fn parse_ingredients(&self, _free_text: &str) -> Result<Vec<ParsedItem>, CoreError> {
        self.parse_calls.set(self.parse_calls.get() + 1);
        if let Some(message) = self.parse_failure.borrow().as_ref() {
            return Err(CoreError::ExternalService(message.clone()));
        }
        Ok(self.parsed_items.borrow().clone())
    }

    async fn parse_receipt_image(&self, _image: &[u8]) -> Result<Vec<ReceiptItem>, CoreError> {
        self.receipt_calls.set(self.receipt_calls.get() + 1);
        Ok(self.receipt_items.borrow().clone())
    }

    async fn compute_target(&self, _profile: &NutritionProfile) -> Result<Nutrients, CoreError> {
        self.target_calls.set(self.target_calls.get() + 1);
        Ok(self.target.get())
    }

    async fn recommend_recipes(
        &self,
        _inventory: &str,
        _deficiency: &Nutrients,
        _recent_meal_names: &[String],
    ) -> Result<Vec<RecipeCandidate>, CoreError> {
        self.recommend_calls.set(self.recommend_calls.get() + 1);
        Ok(self.candidates.borrow().clone())
    }

    async fn recommend_deficiency_focused(
        &self,
        _deficiency: &Nutrients,
        _inventory: &str,
    ) -> Result<Vec<RecipeCandidate>, CoreError> {
        self.recommend_calls.set(self.recommend_calls.get() + 1);
        Ok(self.candidates.borrow().clone())
    }

    async fn judge_sufficiency(
        &self,
        _inventory: &str,
        _ingredient_lines: &[String],
    ) -> Result<SufficiencyJudgement, CoreError> {
        self.judge_calls.set(self.judge_calls.get() + 1);
        if let Some(message) = self.judge_failure.borrow().as_ref() {
            return Err(CoreError::ExternalService(message.clone()));
        }
        Ok(self.judgement.borrow().clone())
    }
}
