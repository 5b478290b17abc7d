//! Relevance classification of candidates, directly or through document links.

use super::observer::{PipelineObserver, PipelineWarning};
use crate::ranking::{
    CandidateId, CandidateMap, DocId, EntityId, EntityLinks, Grade, QueryId, QueryTable, Qrels,
    RankedSet,
};
use serde::Serialize;
use std::collections::BTreeSet;

/// Relevance class of a usable grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelevanceClass {
    Positive,
    Negative,
}

/// `Positive` for grade >= 1, `Negative` for 0, `None` for anything else.
pub fn relevance_class(grade: Grade) -> Option<RelevanceClass> {
    match grade {
        g if g >= 1 => Some(RelevanceClass::Positive),
        0 => Some(RelevanceClass::Negative),
        _ => None,
    }
}

/// Disjoint relevance classes for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedCandidates<C: Ord> {
    pub positive: BTreeSet<C>,
    pub negative: BTreeSet<C>,
    pub unknown: BTreeSet<C>,
    /// Only filled by link-based classification.
    pub shared: BTreeSet<C>,
}

impl<C: Ord> Default for ClassifiedCandidates<C> {
    fn default() -> Self {
        Self {
            positive: BTreeSet::new(),
            negative: BTreeSet::new(),
            unknown: BTreeSet::new(),
            shared: BTreeSet::new(),
        }
    }
}

/// Partition a query's candidates into positive / negative / unknown.
///
/// A candidate with an invalid grade is reported and treated as unjudged, so
/// the three classes always partition the input exactly.
pub fn classify<'a, C, I>(
    query: &QueryId,
    candidates: I,
    judgments: Option<&CandidateMap<C, Grade>>,
    observer: &mut dyn PipelineObserver,
) -> ClassifiedCandidates<C>
where
    C: CandidateId + 'a,
    I: IntoIterator<Item = &'a C>,
{
    let mut out = ClassifiedCandidates::default();
    for candidate in candidates {
        let grade = judgments.and_then(|j| j.get(candidate));
        match grade.map(|g| (g, relevance_class(g))) {
            None => {
                out.unknown.insert(candidate.clone());
            }
            Some((_, Some(RelevanceClass::Positive))) => {
                out.positive.insert(candidate.clone());
            }
            Some((_, Some(RelevanceClass::Negative))) => {
                out.negative.insert(candidate.clone());
            }
            Some((grade, None)) => {
                observer.warn(PipelineWarning::InvalidJudgment {
                    query: query.clone(),
                    candidate: candidate.to_string(),
                    grade,
                });
                out.unknown.insert(candidate.clone());
            }
        }
    }
    out
}

/// Classify entities through the documents that link them.
///
/// Positive entities are linked from any positive document, negative ones
/// from any negative document. Entities in both unions are moved to `shared`.
/// Documents without a link record contribute no entities.
pub fn classify_entities_via_links(
    query: &QueryId,
    doc_judgments: &CandidateMap<DocId, Grade>,
    links: &EntityLinks,
    observer: &mut dyn PipelineObserver,
) -> ClassifiedCandidates<EntityId> {
    let mut positive = BTreeSet::new();
    let mut negative = BTreeSet::new();
    for (doc, grade) in doc_judgments.iter() {
        let target = match relevance_class(grade) {
            Some(RelevanceClass::Positive) => &mut positive,
            Some(RelevanceClass::Negative) => &mut negative,
            None => {
                observer.warn(PipelineWarning::InvalidJudgment {
                    query: query.clone(),
                    candidate: doc.to_string(),
                    grade,
                });
                continue;
            }
        };
        match links.entities(doc) {
            Some(entities) => target.extend(entities.iter().cloned()),
            None => log::debug!("Document {} (query #{}) has no entity links", doc, query),
        }
    }

    let shared: BTreeSet<EntityId> = positive.intersection(&negative).cloned().collect();
    ClassifiedCandidates {
        positive: positive.difference(&shared).cloned().collect(),
        negative: negative.difference(&shared).cloned().collect(),
        unknown: BTreeSet::new(),
        shared,
    }
}

/// Link-based entity classification for every query in the document qrels.
pub fn classify_all_entities(
    qrels: &Qrels<DocId>,
    links: &EntityLinks,
    observer: &mut dyn PipelineObserver,
) -> QueryTable<ClassifiedCandidates<EntityId>> {
    qrels
        .iter()
        .map(|(query, judgments)| {
            let classes = classify_entities_via_links(query, judgments, links, observer);
            (query.clone(), classes)
        })
        .collect()
}

/// Class sizes of one query's ranked candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassCounts {
    pub query: QueryId,
    pub positive: usize,
    pub negative: usize,
    pub unknown: usize,
}

/// Count positive / negative / unknown candidates per ranked query.
/// Queries without judgments are reported and skipped.
pub fn decompose_ranking<C: CandidateId>(
    ranking: &RankedSet<C>,
    qrels: &Qrels<C>,
    observer: &mut dyn PipelineObserver,
) -> Vec<ClassCounts> {
    let mut rows = Vec::with_capacity(ranking.len());
    for (query, candidates) in ranking.iter() {
        let Some(judgments) = qrels.get(query) else {
            observer.warn(PipelineWarning::MissingTopic {
                query: query.clone(),
                missing_from: "qrels".to_string(),
            });
            continue;
        };
        let classes = classify(query, candidates.candidates(), Some(judgments), observer);
        rows.push(ClassCounts {
            query: query.clone(),
            positive: classes.positive.len(),
            negative: classes.negative.len(),
            unknown: classes.unknown.len(),
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn q(id: &str) -> QueryId {
        QueryId::new(id)
    }

    fn docs(ids: &[&str]) -> Vec<DocId> {
        ids.iter().map(|d| DocId::new(*d)).collect()
    }

    fn ents(ids: &[&str]) -> BTreeSet<EntityId> {
        ids.iter().map(|e| EntityId::new(*e)).collect()
    }

    fn dset(ids: &[&str]) -> BTreeSet<DocId> {
        ids.iter().map(|d| DocId::new(*d)).collect()
    }

    fn link(doc: &str, entities: &[&str]) -> (DocId, HashSet<EntityId>) {
        let set: HashSet<EntityId> = entities.iter().map(|e| EntityId::new(*e)).collect();
        (DocId::new(doc), set)
    }

    #[test]
    fn classify_partitions_candidates() {
        let judgments: CandidateMap<DocId, Grade> =
            vec![(DocId::new("d1"), 1), (DocId::new("d2"), 0)].into_iter().collect();
        let candidates = docs(&["d1", "d2", "d3"]);
        let mut warnings: Vec<PipelineWarning> = Vec::new();
        let classes = classify(&q("q1"), &candidates, Some(&judgments), &mut warnings);
        assert_eq!(classes.positive, dset(&["d1"]));
        assert_eq!(classes.negative, dset(&["d2"]));
        assert_eq!(classes.unknown, dset(&["d3"]));
        assert!(warnings.is_empty());
    }

    #[test]
    fn classify_without_judgments_is_all_unknown() {
        let candidates = docs(&["a", "b"]);
        let mut warnings: Vec<PipelineWarning> = Vec::new();
        let classes = classify(&q("q1"), &candidates, None, &mut warnings);
        assert_eq!(classes.unknown.len(), 2);
        assert!(classes.positive.is_empty() && classes.negative.is_empty());
    }

    #[test]
    fn invalid_grade_is_reported_and_unknown() {
        let judgments: CandidateMap<DocId, Grade> = vec![(DocId::new("d1"), -1)].into_iter().collect();
        let candidates = docs(&["d1"]);
        let mut warnings: Vec<PipelineWarning> = Vec::new();
        let classes = classify(&q("q9"), &candidates, Some(&judgments), &mut warnings);
        assert_eq!(classes.unknown.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].query().as_str(), "q9");
    }

    #[test]
    fn higher_grades_are_positive() {
        assert_eq!(relevance_class(3), Some(RelevanceClass::Positive));
        assert_eq!(relevance_class(0), Some(RelevanceClass::Negative));
        assert_eq!(relevance_class(-2), None);
    }

    #[test]
    fn shared_entities_removed_from_both_classes() {
        let links: EntityLinks = vec![
            link("p1", &["a", "b"]),
            link("p2", &["c"]),
            link("n1", &["b", "d"]),
            link("n2", &["c", "e"]),
        ]
        .into_iter()
        .collect();
        let judgments: CandidateMap<DocId, Grade> = vec![
            (DocId::new("p1"), 1),
            (DocId::new("p2"), 2),
            (DocId::new("n1"), 0),
            (DocId::new("n2"), 0),
        ]
        .into_iter()
        .collect();
        let mut warnings: Vec<PipelineWarning> = Vec::new();
        let classes = classify_entities_via_links(&q("q1"), &judgments, &links, &mut warnings);
        assert_eq!(classes.positive, ents(&["a"]));
        assert_eq!(classes.negative, ents(&["d", "e"]));
        assert_eq!(classes.shared, ents(&["b", "c"]));

        // Disjoint, and the union is the original positive ∪ negative.
        assert!(classes.positive.is_disjoint(&classes.negative));
        assert!(classes.positive.is_disjoint(&classes.shared));
        assert!(classes.negative.is_disjoint(&classes.shared));
        let union: BTreeSet<EntityId> = classes
            .positive
            .iter()
            .chain(&classes.negative)
            .chain(&classes.shared)
            .cloned()
            .collect();
        assert_eq!(union, ents(&["a", "b", "c", "d", "e"]));
    }

    #[test]
    fn unlinked_and_invalid_documents_contribute_nothing() {
        let links: EntityLinks = vec![link("p1", &["a"])].into_iter().collect();
        let judgments: CandidateMap<DocId, Grade> = vec![
            (DocId::new("p1"), 1),
            (DocId::new("ghost"), 0),
            (DocId::new("bad"), -3),
        ]
        .into_iter()
        .collect();
        let mut warnings: Vec<PipelineWarning> = Vec::new();
        let classes = classify_entities_via_links(&q("q1"), &judgments, &links, &mut warnings);
        assert_eq!(classes.positive, ents(&["a"]));
        assert!(classes.negative.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], PipelineWarning::InvalidJudgment { grade: -3, .. }));
    }

    #[test]
    fn decompose_skips_topics_without_qrels() {
        let mut ranking: RankedSet<DocId> = RankedSet::new();
        ranking.insert_candidate(q("q1"), DocId::new("d1"), 2.0);
        ranking.insert_candidate(q("q1"), DocId::new("d2"), 1.0);
        ranking.insert_candidate(q("q2"), DocId::new("d3"), 1.0);
        let mut qrels: Qrels<DocId> = Qrels::new();
        qrels.insert_candidate(q("q1"), DocId::new("d1"), 1);

        let mut warnings: Vec<PipelineWarning> = Vec::new();
        let rows = decompose_ranking(&ranking, &qrels, &mut warnings);
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].positive, rows[0].negative, rows[0].unknown), (1, 0, 1));
        assert_eq!(
            warnings,
            vec![PipelineWarning::MissingTopic {
                query: q("q2"),
                missing_from: "qrels".to_string()
            }]
        );
    }
}
