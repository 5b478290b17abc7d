//! Counts scored entities that could never have been retrieved through the
//! initial ranking's documents.

use clap::Parser;
use rankaudit::{
    pipeline::audit_all,
    ranking::{trec::load_run, EntityLinks},
    report::{self, RunReport, Table},
    stats::summarize_counts,
    Config, DocId, EntityId, LogObserver, RankedSet,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "illegal")]
struct Args {
    /// Initial ranking file (.run)
    #[arg(long)]
    initial: PathBuf,

    /// Dataset with entity links (.jsonl)
    #[arg(long)]
    dataset: PathBuf,

    /// Entity ranking file (.run)
    #[arg(long)]
    entity_ranking: PathBuf,

    /// Write a JSON run report to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let _config = Config::load()?;
    let mut observer = LogObserver::new();

    report::divider("Phase 1: Loading Rankings");
    let links = EntityLinks::load(&args.dataset)?;
    let initial: RankedSet<DocId> = load_run(&args.initial, "initial", "documents")?;
    let entities: RankedSet<EntityId> = load_run(&args.entity_ranking, "entity", "entities")?;

    let mut rows = audit_all(&initial, &entities, &links, &mut observer);
    rows.sort_by(|a, b| b.illegal.cmp(&a.illegal));

    report::divider("Phase 2: Entity Subsets");
    let mut table = Table::new(["Topic", "Retrieved", "Scored", "Illegal", "Legal"]);
    for row in &rows {
        table.row([
            row.query.to_string(),
            row.retrieved.to_string(),
            row.scored.to_string(),
            row.illegal.to_string(),
            row.legal.to_string(),
        ]);
    }
    println!("\nEntity statistics:\n");
    table.print();

    let column = |f: fn(&rankaudit::pipeline::EntityLegality) -> usize| -> Vec<usize> {
        rows.iter().map(f).collect()
    };
    let retrieved = column(|r| r.retrieved);
    let scored = column(|r| r.scored);
    let illegal = column(|r| r.illegal);
    let legal = column(|r| r.legal);
    for (name, values) in [
        ("retrieved", &retrieved),
        ("scored", &scored),
        ("illegal", &illegal),
        ("legal", &legal),
    ] {
        let title = format!("Mean entities ({})", name);
        match summarize_counts(values) {
            Some(s) => report::stat(&title, format!("{:.2}", s.mean)),
            None => report::stat(&title, "n/a"),
        }
    }

    let total_scored: usize = scored.iter().sum();
    let total_legal: usize = legal.iter().sum();
    let total_illegal: usize = illegal.iter().sum();
    report::divider("Summary");
    log::info!(
        "There are {} scored query-entity pairs in the entity ranking ({}).",
        total_scored,
        args.entity_ranking.display()
    );
    log::info!(
        "Of which, {} can be derived from the initial ranking ({}).",
        total_legal,
        args.initial.display()
    );
    log::info!(
        "Where, {} are 'illegal' and have been injected from some other source, such as the entity judgments.",
        total_illegal
    );

    if let Some(path) = &args.json {
        let statistics = serde_json::json!({
            "per_query": rows,
            "total_scored": total_scored,
            "total_legal": total_legal,
            "total_illegal": total_illegal,
        });
        RunReport::new(
            "illegal",
            &[args.initial.as_path(), args.dataset.as_path(), args.entity_ranking.as_path()],
            observer.count(),
            statistics,
        )?
        .write_json(path)?;
    }

    Ok(())
}
