//! Pipeline orchestration.
//!
//! A fixed five-stage state machine drives each run:
//! `parse_query → fetch_data → deep_dive → analyze_data →
//! format_response → end`. Any of the first three stages may set a
//! terminal error, in which case control jumps straight to the final
//! formatter. The formatter is reached exactly once per run and is the
//! only stage that reads the error for output shaping.

mod nodes;
pub mod state;

#[cfg(test)]
mod tests;

use crate::providers::{CompletionService, EntityProvider, TransactionProvider};

pub use self::state::WorkflowState;

/// States of the pipeline machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    ParseQuery,
    FetchData,
    DeepDive,
    AnalyzeData,
    FormatResponse,
    End,
}

/// Outcome of one stage, pattern-matched by the orchestrator.
#[derive(Debug)]
pub(crate) enum StageOutcome {
    /// Proceed to the next stage.
    Continue,
    /// Terminal failure; remaining enrichment stages are skipped.
    Fail(String),
}

/// The analysis pipeline over a set of providers.
pub struct Pipeline<T, E, C> {
    transactions: T,
    entities: E,
    completion: C,
    hours_override: Option<u64>,
}

impl<T, E, C> Pipeline<T, E, C>
where
    T: TransactionProvider,
    E: EntityProvider,
    C: CompletionService,
{
    /// Create a pipeline over the given providers.
    pub fn new(transactions: T, entities: E, completion: C) -> Self {
        Self {
            transactions,
            entities,
            completion,
            hours_override: None,
        }
    }

    /// Force the look-back window, overriding whatever the interpreter
    /// extracts.
    pub fn with_hours_override(mut self, hours: Option<u64>) -> Self {
        self.hours_override = hours;
        self
    }

    /// Run one query through the pipeline. Always completes: the result
    /// carries either the narrative or a formatted error message in
    /// `analysis`.
    pub async fn run(&self, user_query: &str) -> WorkflowState {
        let mut state = WorkflowState::new(user_query);
        let mut stage = Stage::ParseQuery;

        loop {
            stage = match stage {
                Stage::ParseQuery => match self.parse_query(&mut state).await {
                    StageOutcome::Continue => Stage::FetchData,
                    StageOutcome::Fail(message) => {
                        state.error = Some(message);
                        Stage::FormatResponse
                    }
                },
                Stage::FetchData => match self.fetch_data(&mut state).await {
                    StageOutcome::Continue => Stage::DeepDive,
                    StageOutcome::Fail(message) => {
                        state.error = Some(message);
                        Stage::FormatResponse
                    }
                },
                Stage::DeepDive => match self.deep_dive(&mut state).await {
                    StageOutcome::Continue => Stage::AnalyzeData,
                    StageOutcome::Fail(message) => {
                        state.error = Some(message);
                        Stage::FormatResponse
                    }
                },
                Stage::AnalyzeData => {
                    if let StageOutcome::Fail(message) = self.analyze_data(&mut state).await {
                        state.error = Some(message);
                    }
                    Stage::FormatResponse
                }
                Stage::FormatResponse => {
                    self.format_response(&mut state);
                    Stage::End
                }
                Stage::End => break,
            };
        }

        state
    }
}
