//! Runs the external `trec_eval` binary.

use super::metrics::{parse_trec_eval_output, MetricRow};
use crate::config::EvaluatorConfig;
use crate::error::{RankauditError, Result};
use crate::ranking::trec::write_ranked_set;
use crate::ranking::{CandidateId, RankedSet};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Handle on a trec_eval installation and the measures to request.
#[derive(Debug, Clone)]
pub struct TrecEval {
    binary: PathBuf,
    measures: Vec<String>,
}

impl TrecEval {
    pub fn new(binary: impl Into<PathBuf>, measures: Vec<String>) -> Self {
        Self {
            binary: binary.into(),
            measures,
        }
    }

    pub fn from_config(config: &EvaluatorConfig) -> Self {
        Self::new(config.binary.clone(), config.measures.clone())
    }

    fn args(&self, run: &Path, qrels: &Path) -> Vec<String> {
        let mut args = Vec::with_capacity(self.measures.len() * 2 + 2);
        for measure in &self.measures {
            args.push("-m".to_string());
            args.push(measure.clone());
        }
        args.push(qrels.display().to_string());
        args.push(run.display().to_string());
        args
    }

    /// Score a run file. A failed invocation is returned as an error, never retried.
    pub async fn evaluate(&self, run: &Path, qrels: &Path, label: &str) -> Result<MetricRow> {
        log::debug!("Running {} on {}", self.binary.display(), run.display());
        let output = Command::new(&self.binary)
            .args(self.args(run, qrels))
            .output()
            .await
            .map_err(|e| {
                RankauditError::Evaluator(format!("failed to start {}: {}", self.binary.display(), e))
            })?;
        if !output.status.success() {
            return Err(RankauditError::Evaluator(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        parse_trec_eval_output(&String::from_utf8_lossy(&output.stdout), label)
    }

    /// Score an in-memory ranking through a temporary run file.
    pub async fn evaluate_ranked_set<C: CandidateId>(
        &self,
        ranking: &RankedSet<C>,
        qrels: &Path,
        label: &str,
    ) -> Result<MetricRow> {
        let dir = tempfile::TempDir::new()?;
        let run_path = dir.path().join("temp_rank.run");
        {
            let file = File::create(&run_path)?;
            write_ranked_set(ranking, BufWriter::new(file), "TEMP")?;
        }
        log::debug!("Temporary ranking stored to {}", run_path.display());
        self.evaluate(&run_path, qrels, label).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_put_measures_before_files() {
        let eval = TrecEval::new("trec_eval", vec!["map".to_string(), "P.20".to_string()]);
        let args = eval.args(Path::new("run.txt"), Path::new("qrels.txt"));
        assert_eq!(args, vec!["-m", "map", "-m", "P.20", "qrels.txt", "run.txt"]);
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let eval = TrecEval::new(dir.path().join("no-such-trec-eval"), vec!["map".to_string()]);
        let err = eval
            .evaluate(Path::new("run"), Path::new("qrels"), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, RankauditError::Evaluator(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn evaluates_through_script() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("fake_trec_eval.sh");
        std::fs::write(
            &script,
            "#!/bin/sh\nprintf 'map\\tall\\t0.5000\\nrecip_rank\\tall\\t1.0000\\n'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut ranking: RankedSet<crate::ranking::DocId> = RankedSet::new();
        ranking.insert_candidate(
            crate::ranking::QueryId::new("q1"),
            crate::ranking::DocId::new("d1"),
            1.0,
        );
        let eval = TrecEval::new(&script, vec!["map".to_string()]);
        let row = eval
            .evaluate_ranked_set(&ranking, Path::new("qrels.txt"), "Balanced")
            .await
            .unwrap();
        assert_eq!(row.label, "Balanced");
        assert_eq!(row.map(), Some(0.5));
    }
}
