//! Which scored entities could actually be derived from the initial ranking.

use super::observer::{PipelineObserver, PipelineWarning};
use crate::ranking::{DocId, EntityId, EntityLinks, QueryId, RankedSet};
use serde::Serialize;
use std::collections::HashSet;

/// Entity pool sizes for one query.
///
/// `retrieved` is every entity linked from the query's initially ranked
/// documents; `illegal` entities are scored without being retrievable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityLegality {
    pub query: QueryId,
    pub retrieved: usize,
    pub scored: usize,
    pub illegal: usize,
    pub legal: usize,
}

pub fn audit_entity_legality(
    query: &QueryId,
    initial: &RankedSet<DocId>,
    entity_ranking: &RankedSet<EntityId>,
    links: &EntityLinks,
    observer: &mut dyn PipelineObserver,
) -> Option<EntityLegality> {
    let (Some(docs), Some(entities)) = (initial.get(query), entity_ranking.get(query)) else {
        observer.warn(PipelineWarning::MissingTopic {
            query: query.clone(),
            missing_from: "either the initial or entity ranking".to_string(),
        });
        return None;
    };

    let mut retrieved: HashSet<&EntityId> = HashSet::new();
    for doc in docs.candidates() {
        if let Some(linked) = links.entities(doc) {
            retrieved.extend(linked.iter());
        }
    }
    let scored: HashSet<&EntityId> = entities.candidates().collect();
    let legal = scored.intersection(&retrieved).count();

    Some(EntityLegality {
        query: query.clone(),
        retrieved: retrieved.len(),
        scored: scored.len(),
        illegal: scored.len() - legal,
        legal,
    })
}

/// Audit every query of the initial ranking; missing queries are reported and skipped.
pub fn audit_all(
    initial: &RankedSet<DocId>,
    entity_ranking: &RankedSet<EntityId>,
    links: &EntityLinks,
    observer: &mut dyn PipelineObserver,
) -> Vec<EntityLegality> {
    initial
        .query_ids()
        .filter_map(|query| audit_entity_legality(query, initial, entity_ranking, links, observer))
        .collect()
}
