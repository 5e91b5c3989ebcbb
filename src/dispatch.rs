//! # Action Dispatcher
//!
//! The rendering layer above this crate re-runs the whole control flow on
//! every interaction, so a single user gesture can re-enter the same
//! mutating action many times. The dispatcher memoizes completed action ids
//! to their outcome: the first dispatch executes, every replay within the
//! same logical action returns the stored outcome without re-running the
//! body or the service calls inside it.
//!
//! Action ids derive from the user-visible trigger (a button identity plus
//! its target), never from wall-clock time. Failed actions are not
//! memoized: they left no state behind and stay runnable.

use crate::error::CoreError;
use crate::session::ActionOutcome;
use log::debug;
use std::collections::HashMap;

/// Session-scoped memory of completed action ids
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    completed: HashMap<String, ActionOutcome>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome of a previously completed action id, if any
    pub fn completed(&self, action_id: &str) -> Option<ActionOutcome> {
        self.completed.get(action_id).cloned()
    }

    /// Record an action id as completed with its outcome
    pub fn record(&mut self, action_id: &str, outcome: ActionOutcome) {
        debug!("Action completed: {action_id}");
        self.completed.insert(action_id.to_string(), outcome);
    }

    /// Execute `body` at most once for this action id. Replays return the
    /// memoized outcome without invoking `body` again; errors are surfaced
    /// and not memoized.
    pub fn run<F>(&mut self, action_id: &str, body: F) -> Result<ActionOutcome, CoreError>
    where
        F: FnOnce() -> Result<ActionOutcome, CoreError>,
    {
        if let Some(previous) = self.completed(action_id) {
            debug!("Action {action_id} already completed, returning memoized outcome");
            return Ok(previous);
        }
        let outcome = body()?;
        self.record(action_id, outcome.clone());
        Ok(outcome)
    }

    /// Forget every completed id. Called at the boundary of a logical
    /// action (a new candidate list, a dismissal), after which the same
    /// trigger identities describe new gestures.
    pub fn reset(&mut self) {
        debug!("Dispatcher reset, {} completed id(s) forgotten", self.completed.len());
        self.completed.clear();
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }
}
