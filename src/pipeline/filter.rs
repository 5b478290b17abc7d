//! Entity-overlap filtering of a document ranking.
//!
//! A document survives iff at least one of its linked entities is scored for
//! its query. Survivors are re-ranked densely from 1 within each consecutive
//! query group and keep their original score text.

use super::observer::{PipelineObserver, PipelineWarning};
use crate::error::Result;
use crate::ranking::trec::parse_run_line;
use crate::ranking::{DocId, EntityId, EntityLinks, QueryId, RunLine};
use std::collections::{HashMap, HashSet};
use std::io::{BufRead, Write};

/// Scanned / retained line counts of one filtering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub scanned: usize,
    pub retained: usize,
}

/// Stateful filter fed one run line at a time, in file order.
pub struct OverlapFilter<'a> {
    scored: &'a HashMap<QueryId, HashSet<EntityId>>,
    links: &'a EntityLinks,
    run_tag: String,
    current: Option<QueryId>,
    next_rank: u32,
    summary: FilterSummary,
}

impl<'a> OverlapFilter<'a> {
    pub fn new(
        scored: &'a HashMap<QueryId, HashSet<EntityId>>,
        links: &'a EntityLinks,
        run_tag: &str,
    ) -> Self {
        Self {
            scored,
            links,
            run_tag: run_tag.to_string(),
            current: None,
            next_rank: 1,
            summary: FilterSummary::default(),
        }
    }

    /// Returns the re-ranked line if the document is retained.
    ///
    /// A query group without scored entities is reported once, at its first line.
    pub fn accept(
        &mut self,
        line: &RunLine<DocId>,
        observer: &mut dyn PipelineObserver,
    ) -> Option<RunLine<DocId>> {
        if self.current.as_ref() != Some(&line.query) {
            self.current = Some(line.query.clone());
            self.next_rank = 1;
            if !self.scored.contains_key(&line.query) {
                observer.warn(PipelineWarning::MissingTopic {
                    query: line.query.clone(),
                    missing_from: "entity judgments".to_string(),
                });
            }
        }
        self.summary.scanned += 1;

        let scored = self.scored.get(&line.query)?;
        let linked = self.links.entities(&line.candidate)?;
        if scored.is_disjoint(linked) {
            return None;
        }

        let rank = self.next_rank;
        self.next_rank += 1;
        self.summary.retained += 1;
        Some(RunLine {
            rank,
            tag: self.run_tag.clone(),
            ..line.clone()
        })
    }

    pub fn summary(&self) -> FilterSummary {
        self.summary
    }
}

/// Filter an in-memory run. Queries without scored entities lose every document.
pub fn filter_by_entity_overlap(
    lines: &[RunLine<DocId>],
    scored: &HashMap<QueryId, HashSet<EntityId>>,
    links: &EntityLinks,
    run_tag: &str,
    observer: &mut dyn PipelineObserver,
) -> Vec<RunLine<DocId>> {
    let mut filter = OverlapFilter::new(scored, links, run_tag);
    lines
        .iter()
        .filter_map(|line| filter.accept(line, observer))
        .collect()
}

/// Stream a run file through the filter, writing retained lines to `writer`.
pub fn filter_run<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    source: &str,
    scored: &HashMap<QueryId, HashSet<EntityId>>,
    links: &EntityLinks,
    run_tag: &str,
    observer: &mut dyn PipelineObserver,
) -> Result<FilterSummary> {
    let mut filter = OverlapFilter::new(scored, links, run_tag);
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(parsed) = parse_run_line::<DocId>(&line, source, idx + 1)? else {
            continue;
        };
        if let Some(kept) = filter.accept(&parsed, observer) {
            writeln!(writer, "{}", kept)?;
        }
    }
    writer.flush()?;
    Ok(filter.summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn link(doc: &str, entities: &[&str]) -> (DocId, HashSet<EntityId>) {
        (
            DocId::new(doc),
            entities.iter().map(|e| EntityId::new(*e)).collect(),
        )
    }

    fn scored(rows: &[(&str, &[&str])]) -> HashMap<QueryId, HashSet<EntityId>> {
        rows.iter()
            .map(|(q, es)| (QueryId::new(*q), es.iter().map(|e| EntityId::new(*e)).collect()))
            .collect()
    }

    fn line(query: &str, doc: &str, rank: u32, score: &str) -> RunLine<DocId> {
        RunLine {
            query: QueryId::new(query),
            iteration: "Q0".to_string(),
            candidate: DocId::new(doc),
            rank,
            score: score.parse().unwrap(),
            raw_score: score.to_string(),
            tag: "bm25".to_string(),
        }
    }

    #[test]
    fn keeps_only_overlapping_documents() {
        let links: EntityLinks = vec![link("d1", &["e5"]), link("d2", &["e9"])].into_iter().collect();
        let scored = scored(&[("q1", &["e5"][..])]);
        let lines = vec![line("q1", "d1", 1, "2.0"), line("q1", "d2", 2, "1.0")];
        let out = filter_by_entity_overlap(&lines, &scored, &links, "Entity-Filtered", &mut Vec::<PipelineWarning>::new());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].candidate.as_str(), "d1");
        assert_eq!(out[0].rank, 1);
        assert_eq!(out[0].tag, "Entity-Filtered");
    }

    #[test]
    fn survivors_are_reranked_densely_with_original_scores() {
        let links: EntityLinks = vec![
            link("d1", &["x"]),
            link("d2", &["e1"]),
            link("d3", &["y"]),
            link("d4", &["e1", "e2"]),
        ]
        .into_iter()
        .collect();
        let scored = scored(&[("q1", &["e1", "e2"][..])]);
        let lines = vec![
            line("q1", "d1", 1, "9.5"),
            line("q1", "d2", 2, "8.25"),
            line("q1", "d3", 3, "7.0"),
            line("q1", "d4", 4, "6.125"),
        ];
        let out = filter_by_entity_overlap(&lines, &scored, &links, "F", &mut Vec::<PipelineWarning>::new());
        let got: Vec<(&str, u32, &str)> = out
            .iter()
            .map(|l| (l.candidate.as_str(), l.rank, l.raw_score.as_str()))
            .collect();
        assert_eq!(got, vec![("d2", 1, "8.25"), ("d4", 2, "6.125")]);
    }

    #[test]
    fn rank_restarts_per_query_and_unscored_query_is_emptied() {
        let links: EntityLinks = vec![link("a", &["e"]), link("b", &["e"]), link("c", &["e"])]
            .into_iter()
            .collect();
        let scored = scored(&[("q1", &["e"][..]), ("q3", &["e"][..])]);
        let lines = vec![
            line("q1", "a", 1, "1"),
            line("q1", "b", 2, "0.5"),
            line("q2", "a", 1, "1"),
            line("q3", "c", 7, "0.1"),
        ];
        let out = filter_by_entity_overlap(&lines, &scored, &links, "F", &mut Vec::<PipelineWarning>::new());
        let got: Vec<(&str, &str, u32)> = out
            .iter()
            .map(|l| (l.query.as_str(), l.candidate.as_str(), l.rank))
            .collect();
        assert_eq!(got, vec![("q1", "a", 1), ("q1", "b", 2), ("q3", "c", 1)]);
    }

    #[test]
    fn never_grows_or_reorders() {
        let links: EntityLinks = vec![link("a", &["e"]), link("c", &["e"])].into_iter().collect();
        let scored = scored(&[("q1", &["e"][..])]);
        let lines = vec![
            line("q1", "c", 1, "3"),
            line("q1", "b", 2, "2"),
            line("q1", "a", 3, "1"),
        ];
        let out = filter_by_entity_overlap(&lines, &scored, &links, "F", &mut Vec::<PipelineWarning>::new());
        assert!(out.len() <= lines.len());
        let order: Vec<&str> = out.iter().map(|l| l.candidate.as_str()).collect();
        assert_eq!(order, vec!["c", "a"]);
    }

    #[test]
    fn filter_run_streams_and_counts() {
        let links: EntityLinks = vec![link("d1", &["e5"]), link("d2", &["e9"])].into_iter().collect();
        let scored = scored(&[("q1", &["e5"][..])]);
        let input = "q1 Q0 d1 1 12.50 bm25\nq1 Q0 d2 2 11.00 bm25\n";
        let mut out = Vec::new();
        let summary = filter_run(
            Cursor::new(input),
            &mut out,
            "run",
            &scored,
            &links,
            "Entity-Filtered",
            &mut Vec::<PipelineWarning>::new(),
        )
        .unwrap();
        assert_eq!(summary, FilterSummary { scanned: 2, retained: 1 });
        assert_eq!(String::from_utf8(out).unwrap(), "q1 Q0 d1 1 12.50 Entity-Filtered\n");
    }

    #[test]
    fn query_without_judgments_is_reported_once() {
        let links: EntityLinks = vec![link("d1", &["e5"])].into_iter().collect();
        let scored = scored(&[("q1", &["e5"][..])]);
        let input = "q1 Q0 d1 1 2.0 bm25
q2 Q0 d1 1 1.0 bm25
q2 Q0 d2 2 0.5 bm25
";
        let mut out = Vec::new();
        let mut warnings: Vec<PipelineWarning> = Vec::new();
        let summary = filter_run(
            Cursor::new(input),
            &mut out,
            "run",
            &scored,
            &links,
            "F",
            &mut warnings,
        )
        .unwrap();
        assert_eq!(summary, FilterSummary { scanned: 3, retained: 1 });
        assert_eq!(
            warnings,
            vec![PipelineWarning::MissingTopic {
                query: QueryId::new("q2"),
                missing_from: "entity judgments".to_string(),
            }]
        );
    }
}
