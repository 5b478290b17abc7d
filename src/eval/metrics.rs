//! Metric rows produced by trec_eval: MAP, nDCG@20, P@20 and MRR.

use crate::error::{RankauditError, Result};
use crate::report::{fixed, Table};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Metrics of one evaluated run, keyed by trec_eval's measure name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub label: String,
    pub values: BTreeMap<String, f64>,
}

impl MetricRow {
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }

    /// Mean average precision, the key runs are sorted by.
    pub fn map(&self) -> Option<f64> {
        self.get("map")
    }
}

/// Report name for a trec_eval measure; unknown measures keep their own name.
pub fn display_name(metric: &str) -> &str {
    match metric {
        "map" => "MAP",
        "ndcg_cut_20" => "nDCG@20",
        "P_20" => "P@20",
        "recip_rank" => "MRR",
        other => other,
    }
}

/// Measures whose value is text rather than a number.
const TEXT_MEASURES: [&str; 2] = ["runid", "relstring"];

/// Parse `metric <ws> scope <ws> value` lines, keeping the `all` aggregate.
pub fn parse_trec_eval_output(output: &str, label: &str) -> Result<MetricRow> {
    let mut values = BTreeMap::new();
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() || TEXT_MEASURES.contains(&fields[0]) {
            continue;
        }
        if fields.len() != 3 {
            return Err(RankauditError::Evaluator(format!(
                "unexpected trec_eval line: '{}'",
                line
            )));
        }
        if fields[1] != "all" {
            continue;
        }
        let value: f64 = fields[2].parse().map_err(|_| {
            RankauditError::Evaluator(format!("invalid value for {}: '{}'", fields[0], fields[2]))
        })?;
        values.insert(fields[0].to_string(), value);
    }
    if values.is_empty() {
        return Err(RankauditError::Evaluator(format!(
            "trec_eval produced no metrics for {}",
            label
        )));
    }
    Ok(MetricRow {
        label: label.to_string(),
        values,
    })
}

/// Best MAP first; rows without MAP go last.
pub fn sort_by_map(rows: &mut [MetricRow]) {
    rows.sort_by(|a, b| match (a.map(), b.map()) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// One row per run, one column per measure seen in any row.
pub fn metric_table(rows: &[MetricRow]) -> Table {
    let measures: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.values.keys().map(String::as_str))
        .collect();
    let mut table = Table::new(
        std::iter::once("Run".to_string()).chain(measures.iter().map(|m| display_name(m).to_string())),
    );
    for row in rows {
        table.row(std::iter::once(row.label.clone()).chain(
            measures
                .iter()
                .map(|m| row.get(m).map(fixed).unwrap_or_else(|| "-".to_string())),
        ));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "map                   \tall\t0.2671\n\
                          recip_rank            \tall\t0.6012\n\
                          P_20                  \tall\t0.3450\n\
                          ndcg_cut_20           \tall\t0.4102\n";

    #[test]
    fn parses_aggregate_metrics() {
        let row = parse_trec_eval_output(OUTPUT, "Original").unwrap();
        assert_eq!(row.label, "Original");
        assert_eq!(row.values.len(), 4);
        assert_eq!(row.map(), Some(0.2671));
        assert_eq!(row.get("P_20"), Some(0.345));
    }

    #[test]
    fn per_query_lines_are_ignored() {
        let row = parse_trec_eval_output("map\t301\t0.1\nmap\tall\t0.2\n", "r").unwrap();
        assert_eq!(row.map(), Some(0.2));
    }

    #[test]
    fn garbage_value_is_an_error() {
        let err = parse_trec_eval_output("map\tall\tn/a\n", "r").unwrap_err();
        assert!(matches!(err, RankauditError::Evaluator(_)));
    }

    #[test]
    fn text_measures_are_skipped() {
        let row = parse_trec_eval_output("runid\tall\tTEMP\nmap\tall\t0.25\nrelstring\t301\t1-0-1\n", "r").unwrap();
        assert_eq!(row.map(), Some(0.25));
        assert!(row.get("runid").is_none());
    }

    #[test]
    fn empty_output_is_an_error() {
        assert!(parse_trec_eval_output("", "r").is_err());
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name("map"), "MAP");
        assert_eq!(display_name("ndcg_cut_20"), "nDCG@20");
        assert_eq!(display_name("P_20"), "P@20");
        assert_eq!(display_name("recip_rank"), "MRR");
        assert_eq!(display_name("bpref"), "bpref");
    }

    #[test]
    fn rows_sort_by_map_descending() {
        let mut rows = vec![
            parse_trec_eval_output("map\tall\t0.2\n", "Original").unwrap(),
            parse_trec_eval_output("P_20\tall\t0.4\n", "NoMap").unwrap(),
            parse_trec_eval_output("map\tall\t0.3\n", "Balanced").unwrap(),
        ];
        sort_by_map(&mut rows);
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Balanced", "Original", "NoMap"]);
    }

    #[test]
    fn table_uses_display_names_and_fills_gaps() {
        let rows = vec![
            parse_trec_eval_output(OUTPUT, "Original").unwrap(),
            parse_trec_eval_output("map\tall\t0.3\n", "Balanced").unwrap(),
        ];
        let rendered = metric_table(&rows).render();
        let header = rendered.lines().nth(1).unwrap();
        assert!(header.contains("MAP"));
        assert!(header.contains("nDCG@20"));
        assert!(header.contains("MRR"));
        let balanced = rendered.lines().find(|l| l.starts_with("Balanced")).unwrap();
        assert!(balanced.contains("0.3000"));
        assert!(balanced.contains(" -"));
    }
}
