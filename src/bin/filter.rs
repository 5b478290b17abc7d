//! Reproduces the entity-judgment balancing and the entity-overlap document
//! filter, then compares the filtered ranking with a reference ranking.

use anyhow::Context;
use clap::Parser;
use rankaudit::{
    pipeline::{balance_judgments, filter_run, lost_queries, scored_entities},
    ranking::{
        trec::{load_qrels, load_run},
        EntityLinks,
    },
    report::{self, RunReport},
    stats::compare_overlap,
    Config, DocId, EntityId, LogObserver, Qrels, RankedSet,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "filter")]
struct Args {
    /// Initial ranking file (.run)
    #[arg(long)]
    initial: PathBuf,

    /// Entity ground-truth file (.txt)
    #[arg(long)]
    ent_qrels: PathBuf,

    /// Dataset with entity links (.jsonl)
    #[arg(long)]
    dataset: PathBuf,

    /// Where the filtered ranking is written (.run)
    #[arg(long)]
    save: PathBuf,

    /// Reference ranking for the overlap analysis (.run)
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Tag written into the filtered run (default from config)
    #[arg(long)]
    run_tag: Option<String>,

    /// Write a JSON run report to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

fn percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;
    let run_tag = args.run_tag.clone().unwrap_or(config.filter.run_tag);
    if run_tag.is_empty() || run_tag.chars().any(char::is_whitespace) {
        anyhow::bail!("--run-tag must be a non-empty single token, got '{}'", run_tag);
    }
    let mut observer = LogObserver::new();

    report::divider("Phase 1: Candidate Entities Balancing");
    let ent_qrels: Qrels<EntityId> = load_qrels(&args.ent_qrels)?;
    let balanced = balance_judgments(&ent_qrels, &mut observer);
    let lost = lost_queries(&ent_qrels, &balanced);
    report::stat("Input queries", ent_qrels.len());
    report::stat("Queries after balancing", balanced.len());
    if lost.is_empty() {
        report::stat("Queries lost", "None");
    } else {
        let names: Vec<String> = lost.iter().map(|q| q.to_string()).collect();
        report::stat("Queries lost", names.join(", "));
    }
    let scored = scored_entities(&balanced);

    report::divider("Phase 2: Document Filtering");
    let links = EntityLinks::load(&args.dataset)?;
    let initial = File::open(&args.initial)
        .with_context(|| format!("Failed to open initial ranking: {}", args.initial.display()))?;
    let output = File::create(&args.save)
        .with_context(|| format!("Failed to create filtered ranking: {}", args.save.display()))?;
    let summary = filter_run(
        BufReader::new(initial),
        BufWriter::new(output),
        &args.initial.display().to_string(),
        &scored,
        &links,
        &run_tag,
        &mut observer,
    )?;
    report::stat("Total documents scanned", summary.scanned);
    report::stat("Documents retained", summary.retained);
    report::stat("Filtered ranking saved to", args.save.display());

    let filtered: RankedSet<DocId> = load_run(&args.save, "filtered", "documents")?;
    let mut overlap = None;
    if let Some(reference_path) = &args.reference {
        let reference: RankedSet<DocId> = load_run(reference_path, "reference", "documents")?;
        let result = compare_overlap(&filtered, &reference, &mut observer);

        report::divider("Phase 3: Overlap Analysis");
        report::stat("Comparable queries", result.comparable_queries());
        match result.summary {
            Some(s) => {
                report::stat("Mean overlap (|Df ∩ Dp| / |Dp|)", percent(s.mean));
                report::stat(
                    "Overlap range (min, max)",
                    format!("[{}, {}]", percent(s.min), percent(s.max)),
                );
            }
            None => report::stat("Mean overlap (|Df ∩ Dp| / |Dp|)", "n/a (no comparable queries)"),
        }
        overlap = Some(result);
    }

    if let Some(path) = &args.json {
        let mut inputs: Vec<&Path> = vec![args.initial.as_path(), args.ent_qrels.as_path(), args.dataset.as_path()];
        if let Some(reference) = &args.reference {
            inputs.push(reference.as_path());
        }
        let statistics = serde_json::json!({
            "input_queries": ent_qrels.len(),
            "balanced_queries": balanced.len(),
            "lost_queries": lost,
            "scanned": summary.scanned,
            "retained": summary.retained,
            "overlap": overlap,
        });
        RunReport::new("filter", &inputs, observer.count(), statistics)?.write_json(path)?;
    }

    Ok(())
}
