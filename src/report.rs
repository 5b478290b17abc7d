//! Progress statistics, result tables and the JSON run report.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Log one named statistic as ` - <title:>  <value>`.
pub fn stat(title: &str, value: impl Display) {
    log::info!("{}", stat_line(title, value));
}

fn stat_line(title: &str, value: impl Display) -> String {
    format!(" - {:<40} {}", format!("{}:", title), value)
}

/// Log a section header.
pub fn divider(title: &str) {
    log::info!("{}", divider_line(title));
}

fn divider_line(title: &str) -> String {
    format!("{:-<10} {} {:-<10}", "", title, "")
}

/// Format a float for tables and stats.
pub fn fixed(value: f64) -> String {
    format!("{:.4}", value)
}

/// Fixed-width stdout table.
pub struct Table {
    widths: Vec<usize>,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Self {
        let header: Vec<String> = header.into_iter().map(Into::into).collect();
        Self {
            widths: header.iter().map(|h| h.chars().count()).collect(),
            header,
            rows: Vec::new(),
        }
    }

    pub fn row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
        let cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        for (idx, cell) in cells.iter().enumerate() {
            let width = cell.chars().count();
            match self.widths.get_mut(idx) {
                Some(w) => *w = (*w).max(width),
                None => self.widths.push(width),
            }
        }
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column left-aligned, the rest right-aligned.
    pub fn render(&self) -> String {
        let total: usize = self.widths.iter().sum::<usize>() + self.widths.len().saturating_sub(1) * 2;
        let rule = format!("{:-<1$}", "", total);
        let mut out = String::new();
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&self.format_row(&self.header));
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&self.format_row(row));
            out.push('\n');
        }
        out.push_str(&rule);
        out
    }

    fn format_row(&self, cells: &[String]) -> String {
        let mut parts = Vec::with_capacity(self.widths.len());
        for (idx, width) in self.widths.iter().enumerate() {
            let cell = cells.get(idx).map(String::as_str).unwrap_or("");
            if idx == 0 {
                parts.push(format!("{:<1$}", cell, width));
            } else {
                parts.push(format!("{:>1$}", cell, width));
            }
        }
        parts.join("  ").trim_end().to_string()
    }

    pub fn print(&self) {
        println!("{}", self.render());
    }
}

/// Size and content hash of an input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputFingerprint {
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: u64,
}

pub fn fingerprint(path: &Path) -> Result<InputFingerprint> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut bytes = 0u64;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        bytes += n as u64;
    }
    Ok(InputFingerprint {
        path: path.to_path_buf(),
        sha256: format!("{:x}", hasher.finalize()),
        bytes,
    })
}

/// Machine-readable record of one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub command: String,
    pub generated_at: DateTime<Utc>,
    pub inputs: Vec<InputFingerprint>,
    pub warnings: usize,
    pub statistics: serde_json::Value,
}

impl RunReport {
    /// Fingerprints every input; an unreadable input fails the report.
    pub fn new(
        command: &str,
        inputs: &[&Path],
        warnings: usize,
        statistics: serde_json::Value,
    ) -> Result<Self> {
        let inputs = inputs
            .iter()
            .map(|p| fingerprint(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            command: command.to_string(),
            generated_at: Utc::now(),
            inputs,
            warnings,
            statistics,
        })
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        log::info!("Run report written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stat_line_layout() {
        let line = stat_line("Queries in initial ranking", 50);
        assert!(line.starts_with(" - Queries in initial ranking:"));
        assert!(line.ends_with(" 50"));
        assert_eq!(line.len(), 3 + 40 + 1 + 2);
    }

    #[test]
    fn divider_layout() {
        assert_eq!(divider_line("Balancing"), "---------- Balancing ----------");
    }

    #[test]
    fn table_aligns_columns() {
        let mut table = Table::new(["Run", "MAP"]);
        table.row(["BM25", "0.2500"]);
        table.row(["Balanced-long", "0.31"]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "Run               MAP");
        assert_eq!(lines[3], "BM25           0.2500");
        assert_eq!(lines[4], "Balanced-long    0.31");
        assert!(lines[0].chars().all(|c| c == '-'));
    }

    #[test]
    fn fingerprint_hashes_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.txt");
        std::fs::write(&path, "abc").unwrap();
        let fp = fingerprint(&path).unwrap();
        assert_eq!(fp.bytes, 3);
        assert_eq!(
            fp.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn report_round_trips_to_json() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("qrels.txt");
        std::fs::write(&input, "q1 0 d1 1\n").unwrap();
        let report = RunReport::new(
            "balance",
            &[input.as_path()],
            2,
            serde_json::json!({"queries": 1}),
        )
        .unwrap();
        let out = dir.path().join("report.json");
        report.write_json(&out).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["command"], "balance");
        assert_eq!(value["warnings"], 2);
        assert_eq!(value["inputs"][0]["bytes"], 10);
        assert_eq!(value["statistics"]["queries"], 1);
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn missing_input_fails_report() {
        let err = RunReport::new("x", &[Path::new("/nonexistent/run")], 0, serde_json::Value::Null);
        assert!(err.is_err());
    }
}
