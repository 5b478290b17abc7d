//! Descriptive statistics over pipeline outputs.
//!
//! Queries missing from a derived set (dropped by balancing or filtering)
//! are excluded from every aggregate rather than counted as zero.

pub mod prevalence;

pub use prevalence::{entity_prevalence, rank_prevalence, RankPrevalence};

use crate::pipeline::{lost_queries, ClassCounts, ClassifiedCandidates, PipelineObserver, PipelineWarning};
use crate::ranking::{CandidateId, QueryId, QueryTable, RankedSet};
use serde::Serialize;
use std::collections::HashSet;

/// Mean / min / max of a per-query series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// `None` for an empty series.
pub fn summarize(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(Summary {
        count: values.len(),
        mean: sum / values.len() as f64,
        min,
        max,
    })
}

/// Same as [`summarize`] for integer counts.
pub fn summarize_counts(values: &[usize]) -> Option<Summary> {
    let values: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    summarize(&values)
}

/// Candidate counts of one query before and after a derivation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneCount {
    pub query: QueryId,
    pub before: usize,
    pub after: usize,
    pub pruned: usize,
}

/// Per-query counts for every query present in both sets, in `original` order.
pub fn prune_counts<C: CandidateId>(original: &RankedSet<C>, derived: &RankedSet<C>) -> Vec<PruneCount> {
    original
        .iter()
        .filter_map(|(query, candidates)| {
            let kept = derived.get(query)?;
            debug_assert!(kept.len() <= candidates.len());
            Some(PruneCount {
                query: query.clone(),
                before: candidates.len(),
                after: kept.len(),
                pruned: candidates.len().saturating_sub(kept.len()),
            })
        })
        .collect()
}

/// `|retained ∩ reference| / |reference|`; `None` when the reference is empty.
pub fn overlap_ratio<C: CandidateId>(retained: &HashSet<C>, reference: &HashSet<C>) -> Option<f64> {
    if reference.is_empty() {
        return None;
    }
    let shared = retained.intersection(reference).count();
    Some(shared as f64 / reference.len() as f64)
}

/// Overlap of a derived ranking with a reference ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapReport {
    /// Ratio per comparable query, in derived-ranking order.
    pub per_query: Vec<(QueryId, f64)>,
    pub summary: Option<Summary>,
}

impl OverlapReport {
    pub fn comparable_queries(&self) -> usize {
        self.per_query.len()
    }
}

/// Comparable queries are those in both rankings with a non-empty reference.
/// Queries present on one side only are reported, derived side first.
pub fn compare_overlap<C: CandidateId>(
    derived: &RankedSet<C>,
    reference: &RankedSet<C>,
    observer: &mut dyn PipelineObserver,
) -> OverlapReport {
    let mut per_query = Vec::new();
    for (query, candidates) in derived.iter() {
        let Some(reference_candidates) = reference.get(query) else {
            observer.warn(PipelineWarning::MissingTopic {
                query: query.clone(),
                missing_from: "reference ranking".to_string(),
            });
            continue;
        };
        match overlap_ratio(&candidates.candidate_set(), &reference_candidates.candidate_set()) {
            Some(ratio) => per_query.push((query.clone(), ratio)),
            None => log::warn!("Query #{} has an empty reference ranking, excluded from overlap.", query),
        }
    }
    for query in lost_queries(reference, derived) {
        observer.warn(PipelineWarning::MissingTopic {
            query,
            missing_from: "filtered ranking".to_string(),
        });
    }
    let ratios: Vec<f64> = per_query.iter().map(|(_, r)| *r).collect();
    OverlapReport {
        summary: summarize(&ratios),
        per_query,
    }
}

/// Every distinct candidate across all queries.
pub fn unique_candidates<C: CandidateId>(ranking: &RankedSet<C>) -> HashSet<C> {
    ranking
        .iter()
        .flat_map(|(_, candidates)| candidates.candidates().cloned())
        .collect()
}

/// Distinct candidates of one query; `None` if the ranking lacks the query.
pub fn unique_candidates_for<C: CandidateId>(ranking: &RankedSet<C>, query: &QueryId) -> Option<HashSet<C>> {
    ranking.get(query).map(|candidates| candidates.candidate_set())
}

/// Candidate count per query, largest first (ties by query order).
pub fn candidates_per_query<C: CandidateId>(ranking: &RankedSet<C>) -> Vec<(QueryId, usize)> {
    let mut rows: Vec<(QueryId, usize)> = ranking
        .iter()
        .map(|(query, candidates)| (query.clone(), candidates.len()))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

/// Mean class sizes of link-based entity classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassDistribution {
    pub mean_positive: f64,
    pub mean_negative: f64,
    pub mean_shared: f64,
}

impl ClassDistribution {
    /// Share of each mean in the summed means, in percent; zeros when the sum is zero.
    pub fn percentages(&self) -> (f64, f64, f64) {
        let total = self.mean_positive + self.mean_negative + self.mean_shared;
        if total == 0.0 {
            return (0.0, 0.0, 0.0);
        }
        (
            self.mean_positive / total * 100.0,
            self.mean_negative / total * 100.0,
            self.mean_shared / total * 100.0,
        )
    }
}

pub fn class_distribution<C: CandidateId>(
    classified: &QueryTable<ClassifiedCandidates<C>>,
) -> Option<ClassDistribution> {
    let mut pos = Vec::with_capacity(classified.len());
    let mut neg = Vec::with_capacity(classified.len());
    let mut shared = Vec::with_capacity(classified.len());
    for (_, classes) in classified.iter() {
        pos.push(classes.positive.len());
        neg.push(classes.negative.len());
        shared.push(classes.shared.len());
    }
    Some(ClassDistribution {
        mean_positive: summarize_counts(&pos)?.mean,
        mean_negative: summarize_counts(&neg)?.mean,
        mean_shared: summarize_counts(&shared)?.mean,
    })
}

/// Per-class summaries of a ranking decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecompositionSummary {
    pub positive: Option<Summary>,
    pub negative: Option<Summary>,
    pub unknown: Option<Summary>,
}

pub fn summarize_decomposition(rows: &[ClassCounts]) -> DecompositionSummary {
    let pick = |f: fn(&ClassCounts) -> usize| {
        let values: Vec<usize> = rows.iter().map(f).collect();
        summarize_counts(&values)
    };
    DecompositionSummary {
        positive: pick(|r| r.positive),
        negative: pick(|r| r.negative),
        unknown: pick(|r| r.unknown),
    }
}
