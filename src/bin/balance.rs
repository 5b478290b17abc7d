//! Shows what 1:1 class balancing does to a document ranking: documents
//! pruned per query and the resulting inflation of effectiveness scores.

use clap::Parser;
use rankaudit::{
    eval::{metric_table, sort_by_map, MetricRow, TrecEval},
    pipeline::{balance_ranking, lost_queries},
    ranking::trec::{load_qrels, load_run},
    report::{self, fixed, RunReport, Table},
    stats::{prune_counts, summarize_counts},
    Config, DocId, LogObserver, Qrels, RankedSet,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "balance")]
struct Args {
    /// Ranking file (.run)
    #[arg(long)]
    ranking: PathBuf,

    /// TREC ground-truth file (.txt)
    #[arg(long)]
    qrels: PathBuf,

    /// Write a JSON run report to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

async fn evaluate(
    evaluator: &TrecEval,
    ranking: &RankedSet<DocId>,
    qrels: &Path,
    label: &str,
) -> Option<MetricRow> {
    match evaluator.evaluate_ranked_set(ranking, qrels, label).await {
        Ok(row) => Some(row),
        Err(e) => {
            log::error!("Evaluation of the {} ranking failed: {}", label, e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;
    let evaluator = TrecEval::from_config(&config.evaluator);
    let mut observer = LogObserver::new();

    report::divider("Phase 1: Loading Data");
    let ranking: RankedSet<DocId> = load_run(&args.ranking, "given", "documents")?;
    let qrels: Qrels<DocId> = load_qrels(&args.qrels)?;

    report::divider("Phase 2: Balancing Ranking");
    let balanced = balance_ranking(&ranking, &qrels, &mut observer);
    let mut counts = prune_counts(&ranking, &balanced);
    counts.sort_by(|a, b| b.pruned.cmp(&a.pruned));

    let mut table = Table::new(["Query", "Documents (Before)", "Documents (After)", "Pruned"]);
    for row in &counts {
        table.row([
            row.query.to_string(),
            row.before.to_string(),
            row.after.to_string(),
            row.pruned.to_string(),
        ]);
    }
    println!("\nDocuments before and after balancing:\n");
    table.print();

    let pruned: Vec<usize> = counts.iter().map(|c| c.pruned).collect();
    let pruned_summary = summarize_counts(&pruned);
    match pruned_summary {
        Some(s) => report::stat("Mean documents pruned", format!("{:.1}", s.mean)),
        None => report::stat("Mean documents pruned", "n/a (no balanceable queries)"),
    }
    let lost = lost_queries(&ranking, &balanced);
    report::stat("Queries lost", lost.len());

    report::divider("Phase 3: Evaluation");
    let original = evaluate(&evaluator, &ranking, &args.qrels, "Original").await;
    let balanced_row = evaluate(&evaluator, &balanced, &args.qrels, "Balanced").await;
    let mut rows: Vec<MetricRow> = original.iter().chain(balanced_row.iter()).cloned().collect();
    sort_by_map(&mut rows);
    if !rows.is_empty() {
        println!("\nEffectiveness before and after balancing:\n");
        metric_table(&rows).print();
    }

    report::divider("Summary");
    log::info!("To summarize, if balancing is used on the evaluation candidates:");
    if let Some(s) = pruned_summary {
        log::info!(
            "Prunes out, on average, {:.1} documents per query (min={}, max={}).",
            s.mean,
            s.min,
            s.max
        );
    }
    let map_of = |row: &Option<MetricRow>| row.as_ref().and_then(MetricRow::map);
    if let (Some(before), Some(after)) = (map_of(&original), map_of(&balanced_row)) {
        log::info!(
            "And causes an artificial inflation of MAP from {} to {}, by pruning the majority relevance class.",
            fixed(before),
            fixed(after)
        );
    }

    if let Some(path) = &args.json {
        let statistics = serde_json::json!({
            "prune_counts": counts,
            "pruned": pruned_summary,
            "lost_queries": lost,
            "effectiveness": rows,
        });
        RunReport::new("balance", &[args.ranking.as_path(), args.qrels.as_path()], observer.count(), statistics)?
            .write_json(path)?;
    }

    Ok(())
}
