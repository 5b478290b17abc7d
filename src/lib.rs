pub mod config;
pub mod error;
pub mod db;
pub mod ranking;
pub mod pipeline;
pub mod stats;
pub mod eval;
pub mod titles;
pub mod report;

pub use config::Config;
pub use error::{RankauditError, Result};
pub use pipeline::{LogObserver, PipelineObserver, PipelineWarning};
pub use ranking::{DocId, EntityId, QueryId, RankedSet, Qrels};
