//! Query-wide prevalence of candidates.

use crate::ranking::{CandidateId, RankedSet};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Fraction of the given per-query sets in which each candidate appears.
///
/// The denominator is the number of sets passed in, including empty ones.
/// Sorted by prevalence descending, then id.
pub fn entity_prevalence<'a, C, I>(per_query: I) -> Vec<(C, f64)>
where
    C: CandidateId + 'a,
    I: IntoIterator<Item = &'a BTreeSet<C>>,
{
    let mut topic_count = 0usize;
    let mut counts: HashMap<C, usize> = HashMap::new();
    for set in per_query {
        topic_count += 1;
        for candidate in set {
            *counts.entry(candidate.clone()).or_insert(0) += 1;
        }
    }
    let mut rows: Vec<(C, f64)> = counts
        .into_iter()
        .map(|(c, n)| (c, n as f64 / topic_count as f64))
        .collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

/// Prevalence and average rank of one candidate across a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankPrevalence<C> {
    pub candidate: C,
    /// Fraction of all queries where the candidate is ranked within the top-k
    /// (anywhere, without a limit).
    pub prevalence: f64,
    /// Mean 1-based rank over every query where the candidate appears.
    pub avg_rank: f64,
}

/// Per-candidate prevalence (optionally limited to the top-k per query) and
/// average rank. Ranks follow score descending with ties by arrival.
/// Sorted by prevalence descending, average rank ascending, then id.
pub fn rank_prevalence<C: CandidateId>(ranking: &RankedSet<C>, top_k: Option<usize>) -> Vec<RankPrevalence<C>> {
    let topic_count = ranking.len();
    let mut ranks: HashMap<C, Vec<usize>> = HashMap::new();
    let mut within_k: HashMap<C, usize> = HashMap::new();
    for (_, candidates) in ranking.iter() {
        for (idx, (candidate, _)) in candidates.ranked().into_iter().enumerate() {
            let rank = idx + 1;
            ranks.entry(candidate.clone()).or_default().push(rank);
            if top_k.map_or(true, |k| rank <= k) {
                *within_k.entry(candidate.clone()).or_insert(0) += 1;
            }
        }
    }

    let mut rows: Vec<RankPrevalence<C>> = ranks
        .into_iter()
        .map(|(candidate, ranks)| {
            let hits = within_k.get(&candidate).copied().unwrap_or(0);
            RankPrevalence {
                prevalence: hits as f64 / topic_count as f64,
                avg_rank: ranks.iter().sum::<usize>() as f64 / ranks.len() as f64,
                candidate,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.prevalence
            .total_cmp(&a.prevalence)
            .then(a.avg_rank.total_cmp(&b.avg_rank))
            .then_with(|| a.candidate.cmp(&b.candidate))
    });
    rows
}
