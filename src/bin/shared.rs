//! Classifies entities as positive, negative or shared through the documents
//! that link them, and lists the shared entities that get discarded.

use clap::Parser;
use rankaudit::{
    pipeline::classify_all_entities,
    ranking::{trec::load_qrels, EntityLinks},
    report::{self, RunReport, Table},
    stats::{class_distribution, entity_prevalence},
    titles::{resolve_titles, TitleMapping},
    Config, DocId, EntityId, LogObserver, Qrels,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shared")]
struct Args {
    /// Dataset with entity links (.jsonl)
    #[arg(long)]
    dataset: PathBuf,

    /// TREC ground-truth file (.txt)
    #[arg(long)]
    qrels: PathBuf,

    /// Show only the most prevalent shared entities
    #[arg(long)]
    limit: Option<usize>,

    /// Write a JSON run report to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;
    let mapping = config.titles.db_path.as_ref().map(TitleMapping::open);
    let mut observer = LogObserver::new();

    report::divider("Phase 1: Loading Data");
    let qrels: Qrels<DocId> = load_qrels(&args.qrels)?;
    report::stat("Queries with judgments", qrels.len());
    let links = EntityLinks::load(&args.dataset)?;

    report::divider("Phase 2: Classifying Entities");
    let classified = classify_all_entities(&qrels, &links, &mut observer);
    let distribution = class_distribution(&classified);
    match distribution {
        Some(d) => {
            let (pos, neg, shared) = d.percentages();
            report::stat("Mean positive entities", format!("{:.1} ({:.2}%)", d.mean_positive, pos));
            report::stat("Mean negative entities", format!("{:.1} ({:.2}%)", d.mean_negative, neg));
            report::stat("Mean shared entities", format!("{:.1} ({:.2}%)", d.mean_shared, shared));
        }
        None => report::stat("Mean entities per class", "n/a (no judged queries)"),
    }

    report::divider("Phase 3: Shared (Removed) Entities");
    let mut prevalence = entity_prevalence(classified.iter().map(|(_, c)| &c.shared));
    if let Some(limit) = args.limit {
        prevalence.truncate(limit);
    }
    let ids: Vec<EntityId> = prevalence.iter().map(|(e, _)| e.clone()).collect();
    let titles = resolve_titles(mapping.as_ref(), &ids).await;

    let mut table = Table::new(["Entity ID", "Entity Title", "Prevalence"]);
    for (entity, share) in &prevalence {
        table.row([
            entity.to_string(),
            titles.get(entity).cloned().unwrap_or_default(),
            format!("{:.2}", share),
        ]);
    }
    if table.is_empty() {
        println!("\nNo shared entities found.");
    } else {
        println!("\nMost common 'shared' entities:\n");
        table.print();
    }

    report::divider("Summary");
    log::info!("Entities linked from both relevant and non-relevant documents are removed from the candidate pool.");
    if let Some(d) = distribution {
        log::info!("In this case, on average, {:.1} entities are filtered out per query.", d.mean_shared);
    }
    if let Some((entity, share)) = prevalence.first() {
        let name = titles.get(entity).map(String::as_str).unwrap_or(entity.as_str());
        log::info!(
            "The most common 'shared' entity is '{}', which is shared for {:.2} of the queries.",
            name,
            share
        );
    }

    if let Some(path) = &args.json {
        let shared: Vec<serde_json::Value> = prevalence
            .iter()
            .map(|(entity, share)| {
                serde_json::json!({
                    "entity": entity,
                    "title": titles.get(entity),
                    "prevalence": share,
                })
            })
            .collect();
        let statistics = serde_json::json!({
            "queries": classified.len(),
            "distribution": distribution,
            "shared_entities": shared,
        });
        RunReport::new(
            "shared",
            &[args.dataset.as_path(), args.qrels.as_path()],
            observer.count(),
            statistics,
        )?
        .write_json(path)?;
    }

    Ok(())
}
