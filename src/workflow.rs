//! # Recipe Workflow State Machine
//!
//! Tracks where the session is in the recommend → select → consume →
//! dismiss cycle. The focused recipe is part of the state variant itself
//! (`Committed` carries both the candidate list and the focus index), so
//! there is no nullable pointer to go stale when the list is replaced.
//!
//! The consumption side effects of selecting a recipe live in the session;
//! this machine only validates and performs the transitions.

use crate::error::CoreError;
use crate::recipe::RecipeCandidate;
use log::info;
use serde::{Deserialize, Serialize};

/// Workflow state, tagged with the data each state needs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum WorkflowState {
    /// No candidates
    #[default]
    Idle,
    /// Candidates present, none singled out
    Listing { candidates: Vec<RecipeCandidate> },
    /// One recipe consumed and focused; the list shows only it
    Committed { candidates: Vec<RecipeCandidate>, focus: usize },
}

impl WorkflowState {
    /// State name for logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Listing { .. } => "listing",
            WorkflowState::Committed { .. } => "committed",
        }
    }

    /// The full candidate list held by the state
    pub fn candidates(&self) -> &[RecipeCandidate] {
        match self {
            WorkflowState::Idle => &[],
            WorkflowState::Listing { candidates } => candidates,
            WorkflowState::Committed { candidates, .. } => candidates,
        }
    }

    /// What a renderer should show: the whole list while listing, only the
    /// focused recipe once committed
    pub fn visible(&self) -> &[RecipeCandidate] {
        match self {
            WorkflowState::Committed { candidates, focus } => candidates
                .get(*focus)
                .map(std::slice::from_ref)
                .unwrap_or(&[]),
            other => other.candidates(),
        }
    }

    /// The committed recipe, if any
    pub fn focused(&self) -> Option<&RecipeCandidate> {
        match self {
            WorkflowState::Committed { candidates, focus } => candidates.get(*focus),
            _ => None,
        }
    }
}

/// The state machine itself
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    state: WorkflowState,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Replace any prior candidate list and reset the focus. An empty list
    /// leaves the workflow idle.
    pub fn receive_candidates(&mut self, candidates: Vec<RecipeCandidate>) {
        info!(
            "Received {} candidate(s), replacing {} state",
            candidates.len(),
            self.state.name()
        );
        self.state = if candidates.is_empty() {
            WorkflowState::Idle
        } else {
            WorkflowState::Listing { candidates }
        };
    }

    /// The candidate a selection targets. Only valid while listing.
    pub fn candidate(&self, index: usize) -> Result<&RecipeCandidate, CoreError> {
        match &self.state {
            WorkflowState::Listing { candidates } => {
                candidates.get(index).ok_or(CoreError::InvalidTransition {
                    action: "select a recipe outside the candidate list",
                    state: "listing",
                })
            }
            other => Err(CoreError::InvalidTransition {
                action: "select a recipe",
                state: other.name(),
            }),
        }
    }

    /// Mark the indexed candidate as consumed: Listing → Committed.
    /// The caller applies the consumption side effects first.
    pub fn commit(&mut self, index: usize) -> Result<(), CoreError> {
        // Validates state and index
        let name = self.candidate(index)?.name.clone();

        let candidates = match std::mem::take(&mut self.state) {
            WorkflowState::Listing { candidates } => candidates,
            _ => unreachable!("candidate() only succeeds while listing"),
        };
        self.state = WorkflowState::Committed { candidates, focus: index };
        info!("Committed to recipe '{name}' (index {index})");
        Ok(())
    }

    /// Drop the focused recipe and its list: Committed → Idle
    pub fn dismiss(&mut self) -> Result<(), CoreError> {
        match self.state {
            WorkflowState::Committed { .. } => {
                self.state = WorkflowState::Idle;
                info!("Dismissed focused recipe, workflow idle");
                Ok(())
            }
            ref other => Err(CoreError::InvalidTransition {
                action: "dismiss the focused recipe",
                state: other.name(),
            }),
        }
    }
}
