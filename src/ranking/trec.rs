//! TREC run and qrels reading/writing.
//!
//! Run lines: `<qid> <iter> <candidate> <rank> <score> <tag>`.
//! Qrels lines: `<qid> <iter> <candidate> <grade>`.
//! Fields are separated by any amount of whitespace; blank lines are skipped.

use super::{CandidateId, Grade, QueryId, Qrels, RankedSet};
use crate::error::{RankauditError, Result};
use crate::report;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// One line of a run file, kept verbatim enough to be written back out.
#[derive(Debug, Clone, PartialEq)]
pub struct RunLine<C> {
    pub query: QueryId,
    pub iteration: String,
    pub candidate: C,
    pub rank: u32,
    pub score: f64,
    /// Score exactly as it appeared in the file.
    pub raw_score: String,
    pub tag: String,
}

impl<C: CandidateId> RunLine<C> {
    pub fn new(query: QueryId, candidate: C, rank: u32, score: f64, tag: &str) -> Self {
        Self {
            query,
            iteration: "Q0".to_string(),
            candidate,
            rank,
            score,
            raw_score: score.to_string(),
            tag: tag.to_string(),
        }
    }
}

impl<C: CandidateId> fmt::Display for RunLine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.query, self.iteration, self.candidate, self.rank, self.raw_score, self.tag
        )
    }
}

/// Parse a single run line. `Ok(None)` for blank lines.
pub fn parse_run_line<C: CandidateId>(
    line: &str,
    source: &str,
    line_no: usize,
) -> Result<Option<RunLine<C>>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() < 6 {
        return Err(RankauditError::malformed(
            source,
            line_no,
            format!("expected 6 fields, found {}", fields.len()),
        ));
    }
    let rank: u32 = fields[3].parse().map_err(|_| {
        RankauditError::malformed(source, line_no, format!("invalid rank '{}'", fields[3]))
    })?;
    let score: f64 = fields[4].parse().map_err(|_| {
        RankauditError::malformed(source, line_no, format!("invalid score '{}'", fields[4]))
    })?;
    Ok(Some(RunLine {
        query: QueryId::new(fields[0]),
        iteration: fields[1].to_string(),
        candidate: C::from(fields[2].to_string()),
        rank,
        score,
        raw_score: fields[4].to_string(),
        tag: fields[5].to_string(),
    }))
}

/// Read every run line in file order.
pub fn read_run_lines<C: CandidateId, R: BufRead>(reader: R, source: &str) -> Result<Vec<RunLine<C>>> {
    let mut lines = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(parsed) = parse_run_line(&line, source, idx + 1)? {
            lines.push(parsed);
        }
    }
    Ok(lines)
}

/// Read a run into a ranked set. Duplicate (query, candidate) pairs: last score wins.
pub fn read_run<C: CandidateId, R: BufRead>(reader: R, source: &str) -> Result<RankedSet<C>> {
    let mut ranking = RankedSet::new();
    for line in read_run_lines::<C, R>(reader, source)? {
        ranking.insert_candidate(line.query, line.candidate, line.score);
    }
    Ok(ranking)
}

/// Read relevance judgments. Duplicate (query, candidate) pairs: last grade wins.
pub fn read_qrels<C: CandidateId, R: BufRead>(reader: R, source: &str) -> Result<Qrels<C>> {
    let mut qrels = Qrels::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 4 {
            return Err(RankauditError::malformed(
                source,
                idx + 1,
                format!("expected 4 fields, found {}", fields.len()),
            ));
        }
        let grade: Grade = fields[3].parse().map_err(|_| {
            RankauditError::malformed(source, idx + 1, format!("invalid relevance grade '{}'", fields[3]))
        })?;
        qrels.insert_candidate(QueryId::new(fields[0]), C::from(fields[2].to_string()), grade);
    }
    Ok(qrels)
}

/// Load a run file and log how many queries and rows it holds.
pub fn load_run<C: CandidateId>(path: &Path, name: &str, element: &str) -> Result<RankedSet<C>> {
    let file = File::open(path)?;
    let ranking = read_run(BufReader::new(file), &path.display().to_string())?;
    report::stat(&format!("Queries in {} ranking", name), ranking.len());
    report::stat(
        &format!("{} in {} ranking (rows)", capitalize(element), name),
        ranking.total_candidates(),
    );
    Ok(ranking)
}

/// Load a qrels file.
pub fn load_qrels<C: CandidateId>(path: &Path) -> Result<Qrels<C>> {
    let file = File::open(path)?;
    let qrels = read_qrels(BufReader::new(file), &path.display().to_string())?;
    log::debug!("Loaded judgments for {} queries from {}", qrels.len(), path.display());
    Ok(qrels)
}

/// Write a ranked set as a run: per query, score descending with ranks from 1.
pub fn write_ranked_set<C: CandidateId, W: Write>(
    ranking: &RankedSet<C>,
    mut writer: W,
    tag: &str,
) -> Result<()> {
    for (query, candidates) in ranking.iter() {
        for (idx, (candidate, score)) in candidates.ranked().into_iter().enumerate() {
            writeln!(writer, "{} Q0 {} {} {} {}", query, candidate, idx + 1, score, tag)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
