//! Runs trec_eval over several rankings and prints one effectiveness table.

use clap::Parser;
use rankaudit::{
    eval::{metric_table, sort_by_map, TrecEval},
    report::{self, RunReport},
    Config,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "score")]
struct Args {
    /// Ranking file and its display name; repeat to compare rankings
    #[arg(long, num_args = 2, value_names = ["PATH", "NAME"], required = true)]
    ranking: Vec<String>,

    /// TREC ground-truth file (.txt)
    #[arg(long)]
    qrels: PathBuf,

    /// Write a JSON run report to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;
    let evaluator = TrecEval::from_config(&config.evaluator);

    report::divider("Phase 1: Scoring Ranking(s)");
    let mut rows = Vec::new();
    let mut inputs: Vec<&Path> = vec![args.qrels.as_path()];
    let mut failures = 0usize;
    for pair in args.ranking.chunks(2) {
        let (path, name) = (Path::new(&pair[0]), &pair[1]);
        report::stat("Scoring ranking", name);
        inputs.push(path);
        match evaluator.evaluate(path, &args.qrels, name).await {
            Ok(row) => rows.push(row),
            Err(e) => {
                failures += 1;
                log::error!("Could not score ranking {} ({}): {}", name, path.display(), e);
            }
        }
    }

    sort_by_map(&mut rows);
    if rows.is_empty() {
        println!("No ranking could be scored.");
    } else {
        println!("\nEffectiveness per ranking:\n");
        metric_table(&rows).print();
    }

    if let Some(path) = &args.json {
        let statistics = serde_json::json!({ "effectiveness": rows });
        RunReport::new("score", &inputs, failures, statistics)?.write_json(path)?;
    }

    Ok(())
}
