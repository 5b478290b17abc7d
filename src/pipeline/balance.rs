//! 1:1 relevance class balancing.
//!
//! The majority class is down-sampled deterministically: the top-k members of
//! each class are kept, where k is the size of the minority class. Queries
//! with an empty class are dropped from the output, never kept empty.

use super::classify::{relevance_class, RelevanceClass};
use super::observer::{PipelineObserver, PipelineWarning};
use crate::ranking::{
    CandidateId, CandidateMap, EntityId, Grade, QueryId, QueryTable, Qrels, RankedSet,
};
use std::collections::{HashMap, HashSet};

/// Balance one query's ranking against its judgments.
///
/// Candidates are split into positive and negative classes in score order
/// (ties by arrival). Unjudged candidates and invalid grades never survive.
/// Returns `None` when either class is empty. The kept candidates retain
/// their scores and arrival order.
pub fn balance_query<C: CandidateId>(
    query: &QueryId,
    ranking: &CandidateMap<C, f64>,
    judgments: &CandidateMap<C, Grade>,
    observer: &mut dyn PipelineObserver,
) -> Option<CandidateMap<C, f64>> {
    let mut pos = Vec::new();
    let mut neg = Vec::new();
    for (candidate, _) in ranking.ranked() {
        let Some(grade) = judgments.get(candidate) else {
            continue;
        };
        match relevance_class(grade) {
            Some(RelevanceClass::Positive) => pos.push(candidate),
            Some(RelevanceClass::Negative) => neg.push(candidate),
            None => observer.warn(PipelineWarning::InvalidJudgment {
                query: query.clone(),
                candidate: candidate.to_string(),
                grade,
            }),
        }
    }

    let k = pos.len().min(neg.len());
    if k == 0 {
        return None;
    }
    let keep: HashSet<&C> = pos[..k].iter().chain(&neg[..k]).copied().collect();
    Some(ranking.retain_to_new(|c, _| keep.contains(c)))
}

/// Balance every query of a ranking. Unbalanceable queries are reported and
/// absent from the result; so are queries without judgments.
pub fn balance_ranking<C: CandidateId>(
    ranking: &RankedSet<C>,
    qrels: &Qrels<C>,
    observer: &mut dyn PipelineObserver,
) -> RankedSet<C> {
    let mut balanced = RankedSet::new();
    for (query, candidates) in ranking.iter() {
        let Some(judgments) = qrels.get(query) else {
            observer.warn(PipelineWarning::MissingTopic {
                query: query.clone(),
                missing_from: "qrels".to_string(),
            });
            continue;
        };
        match balance_query(query, candidates, judgments, observer) {
            Some(kept) => balanced.insert(query.clone(), kept),
            None => observer.warn(PipelineWarning::UnbalanceableQuery { query: query.clone() }),
        }
    }
    balanced
}

/// Balance judgments directly, without a ranking.
///
/// With no scores to order by, the first k positives and first k negatives
/// in judgment-file order are kept, grades normalised to 1 and 0.
pub fn balance_judgments<C: CandidateId>(
    qrels: &Qrels<C>,
    observer: &mut dyn PipelineObserver,
) -> Qrels<C> {
    let mut balanced = Qrels::new();
    for (query, judgments) in qrels.iter() {
        let mut pos = Vec::new();
        let mut neg = Vec::new();
        for (candidate, grade) in judgments.iter() {
            match relevance_class(grade) {
                Some(RelevanceClass::Positive) => pos.push(candidate),
                Some(RelevanceClass::Negative) => neg.push(candidate),
                None => observer.warn(PipelineWarning::InvalidJudgment {
                    query: query.clone(),
                    candidate: candidate.to_string(),
                    grade,
                }),
            }
        }

        let k = pos.len().min(neg.len());
        if k == 0 {
            observer.warn(PipelineWarning::UnbalanceableQuery { query: query.clone() });
            continue;
        }
        let mut kept = CandidateMap::new();
        for candidate in &pos[..k] {
            kept.insert((*candidate).clone(), 1);
        }
        for candidate in &neg[..k] {
            kept.insert((*candidate).clone(), 0);
        }
        balanced.insert(query.clone(), kept);
    }
    balanced
}

/// Queries present in `before` but missing from `after`, in `before` order.
pub fn lost_queries<A, B>(before: &QueryTable<A>, after: &QueryTable<B>) -> Vec<QueryId> {
    before
        .query_ids()
        .filter(|q| !after.contains(q))
        .cloned()
        .collect()
}

/// Entity sets per query from (balanced) entity judgments.
pub fn scored_entities(qrels: &Qrels<EntityId>) -> HashMap<QueryId, HashSet<EntityId>> {
    qrels
        .iter()
        .map(|(query, judgments)| (query.clone(), judgments.candidate_set()))
        .collect()
}
