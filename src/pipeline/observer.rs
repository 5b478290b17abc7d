//! Non-fatal pipeline conditions and the observer that receives them.

use crate::ranking::{Grade, QueryId};
use std::fmt;

/// A condition that skips part of the work but never aborts the run.
/// Every variant names the query it concerns.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineWarning {
    /// Query present in one input but absent from another required input.
    MissingTopic { query: QueryId, missing_from: String },
    /// One relevance class is empty, so the query cannot be balanced.
    UnbalanceableQuery { query: QueryId },
    /// Grade outside the usable domain; the single judgment was skipped.
    InvalidJudgment {
        query: QueryId,
        candidate: String,
        grade: Grade,
    },
}

impl PipelineWarning {
    pub fn query(&self) -> &QueryId {
        match self {
            PipelineWarning::MissingTopic { query, .. }
            | PipelineWarning::UnbalanceableQuery { query }
            | PipelineWarning::InvalidJudgment { query, .. } => query,
        }
    }
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::MissingTopic { query, missing_from } => {
                write!(f, "Topic #{} missing from {}, skipping.", query, missing_from)
            }
            PipelineWarning::UnbalanceableQuery { query } => write!(
                f,
                "Could not balance query #{}: missing positive or negative candidates, skipped.",
                query
            ),
            PipelineWarning::InvalidJudgment {
                query,
                candidate,
                grade,
            } => write!(
                f,
                "Invalid relevance value {} for {} in query #{}, judgment skipped.",
                grade, candidate, query
            ),
        }
    }
}

/// Receives warnings from the classification, balancing and filtering passes.
pub trait PipelineObserver {
    fn warn(&mut self, warning: PipelineWarning);
}

/// Collects warnings in memory.
impl PipelineObserver for Vec<PipelineWarning> {
    fn warn(&mut self, warning: PipelineWarning) {
        self.push(warning);
    }
}

/// Forwards warnings to the `log` facade and counts them.
#[derive(Debug, Default)]
pub struct LogObserver {
    count: usize,
}

impl LogObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl PipelineObserver for LogObserver {
    fn warn(&mut self, warning: PipelineWarning) {
        self.count += 1;
        log::warn!("{}", warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_name_their_query() {
        let w = PipelineWarning::UnbalanceableQuery {
            query: QueryId::new("q7"),
        };
        assert_eq!(w.query().as_str(), "q7");
        assert!(w.to_string().contains("#q7"));
    }

    #[test]
    fn log_observer_counts() {
        let mut obs = LogObserver::new();
        obs.warn(PipelineWarning::MissingTopic {
            query: QueryId::new("1"),
            missing_from: "qrels".to_string(),
        });
        obs.warn(PipelineWarning::UnbalanceableQuery {
            query: QueryId::new("2"),
        });
        assert_eq!(obs.count(), 2);
    }
}
