//! External effectiveness evaluation: trec_eval invocation and its metric table.

pub mod metrics;
pub mod trec_eval;

pub use metrics::{display_name, metric_table, parse_trec_eval_output, sort_by_map, MetricRow};
pub use trec_eval::TrecEval;
