//! Ranking data model: typed ids, per-query tables, TREC files and entity links.

mod ids;
mod table;
pub mod links;
pub mod trec;

pub use ids::{CandidateId, DocId, EntityId, QueryId};
pub use links::EntityLinks;
pub use table::{CandidateMap, QueryTable};
pub use trec::RunLine;

/// Relevance grade from a qrels file.
pub type Grade = i32;

/// Per-query candidate scores. Order is derived by score, ties by arrival.
pub type RankedSet<C> = QueryTable<CandidateMap<C, f64>>;

/// Per-query candidate judgments. Absence of an entry means "unknown".
pub type Qrels<C> = QueryTable<CandidateMap<C, Grade>>;
