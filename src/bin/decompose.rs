//! Positive / negative / unknown composition of one or more rankings.

use clap::Parser;
use rankaudit::{
    pipeline::decompose_ranking,
    ranking::trec::{load_qrels, load_run},
    report::{self, fixed, RunReport, Table},
    stats::{summarize_decomposition, DecompositionSummary, Summary},
    Config, DocId, LogObserver, Qrels, RankedSet,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "decompose")]
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

#[derive(Serialize)]
struct Composition<'a> {
    name: &'a str,
    path: &'a Path,
    queries: usize,
    classes: DecompositionSummary,
}

fn log_class(class: &str, summary: Option<Summary>) {
    let title = format!("Mean num. {} documents", class);
    match summary {
        Some(s) => report::stat(&title, format!("{:.2} (min={}, max={})", s.mean, s.min, s.max)),
        None => report::stat(&title, "n/a"),
    }
}

fn mean_cell(summary: Option<Summary>) -> String {
    summary.map(|s| format!("{:.2}", s.mean)).unwrap_or_else(|| "-".to_string())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    // Only validates the environment; decomposition has no tunables.
    let _config = Config::load()?;
    let mut observer = LogObserver::new();

    report::divider("Phase 1: Loading Data");
    let qrels: Qrels<DocId> = load_qrels(&args.qrels)?;
    report::stat("Queries with judgments", qrels.len());

    report::divider("Phase 2: Decomposing Rankings");
    let mut inputs: Vec<&Path> = vec![args.qrels.as_path()];
    let mut compositions = Vec::new();
    for pair in args.ranking.chunks(2) {
        let (path, name) = (Path::new(&pair[0]), pair[1].as_str());
        report::divider(&format!("{} Ranking", name));
        report::stat("Loading ranking", path.display());
        let ranking: RankedSet<DocId> = match load_run(path, name, "documents") {
            Ok(ranking) => ranking,
            Err(e) => {
                log::warn!("Could not parse ranking: {} ({}), skipping: {}", name, path.display(), e);
                continue;
            }
        };
        inputs.push(path);

        let rows = decompose_ranking(&ranking, &qrels, &mut observer);
        let classes = summarize_decomposition(&rows);
        log_class("positive", classes.positive);
        log_class("negative", classes.negative);
        log_class("unknown", classes.unknown);
        compositions.push(Composition {
            name,
            path,
            queries: rows.len(),
            classes,
        });
    }

    let mut table = Table::new(["Ranking", "Queries", "Positive", "Negative", "Unknown"]);
    for c in &compositions {
        table.row([
            c.name.to_string(),
            c.queries.to_string(),
            mean_cell(c.classes.positive),
            mean_cell(c.classes.negative),
            mean_cell(c.classes.unknown),
        ]);
    }
    if !table.is_empty() {
        println!("\nAverage documents per query by relevance class:\n");
        table.print();
    }
    if let Some(unknown_heavy) = compositions
        .iter()
        .filter_map(|c| c.classes.unknown.map(|s| (c.name, s.mean)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
    {
        log::info!(
            "The ranking with the most unjudged documents is '{}' ({} per query on average).",
            unknown_heavy.0,
            fixed(unknown_heavy.1)
        );
    }

    if let Some(path) = &args.json {
        let statistics = serde_json::json!({ "rankings": compositions });
        RunReport::new("decompose", &inputs, observer.count(), statistics)?.write_json(path)?;
    }

    Ok(())
}
