//! Candidate selection pipeline: classification, balancing, overlap filtering.
//!
//! Every pass is a pure function of its inputs. Conditions that skip work
//! (missing topics, unbalanceable queries, invalid grades) are handed to a
//! [`PipelineObserver`] instead of being logged from inside the pass.

pub mod balance;
pub mod classify;
pub mod filter;
pub mod legality;
mod observer;

pub use balance::{balance_judgments, balance_query, balance_ranking, lost_queries, scored_entities};
pub use classify::{
    classify, classify_all_entities, classify_entities_via_links, decompose_ranking, ClassCounts,
    ClassifiedCandidates,
};
pub use filter::{filter_by_entity_overlap, filter_run, FilterSummary, OverlapFilter};
pub use legality::{audit_all, audit_entity_legality, EntityLegality};
pub use observer::{LogObserver, PipelineObserver, PipelineWarning};
