//! Most prevalent entities of an entity ranking, with their average rank.

use clap::Parser;
use rankaudit::{
    config::top_k_limit,
    ranking::trec::load_run,
    report::{self, RunReport, Table},
    stats::rank_prevalence,
    titles::{resolve_titles, TitleMapping},
    Config, EntityId, RankedSet,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "prevalence")]
struct Args {
    /// Entity ranking file (.run)
    #[arg(long)]
    entity_ranking: PathBuf,

    /// Limit prevalence to the top-k entities per query (negative = all; default from config)
    #[arg(long, allow_negative_numbers = true)]
    k: Option<i64>,

    /// Write a JSON run report to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load()?;
    let top_k = match args.k {
        Some(k) => top_k_limit(k),
        None => config.prevalence.limit(),
    };
    let mapping = config.titles.db_path.as_ref().map(TitleMapping::open);

    report::divider("Phase 1: Loading Data");
    let ranking: RankedSet<EntityId> = load_run(&args.entity_ranking, "given", "entities")?;
    report::stat(
        "Limiting prevalence to",
        top_k.map_or_else(|| "All".to_string(), |k| format!("Top-{}", k)),
    );

    report::divider("Phase 2: Entity Prevalence");
    let rows = rank_prevalence(&ranking, top_k);
    let ids: Vec<EntityId> = rows.iter().map(|r| r.candidate.clone()).collect();
    let titles = resolve_titles(mapping.as_ref(), &ids).await;

    let prevalence_title = top_k.map_or_else(|| "Prevalence".to_string(), |k| format!("Prevalence in Top-{}", k));
    let mut table = Table::new([
        "Entity ID".to_string(),
        "Entity Title".to_string(),
        prevalence_title,
        "Avg. Rank".to_string(),
    ]);
    for row in &rows {
        table.row([
            row.candidate.to_string(),
            titles.get(&row.candidate).cloned().unwrap_or_default(),
            format!("{:.2}", row.prevalence),
            format!("{:.2}", row.avg_rank),
        ]);
    }
    println!("\nEntities from given ranking sorted by prevalence:\n");
    table.print();

    if let Some(path) = &args.json {
        let entities: Vec<serde_json::Value> = rows
            .iter()
            .map(|r| {
                serde_json::json!({
                    "entity": r.candidate,
                    "title": titles.get(&r.candidate),
                    "prevalence": r.prevalence,
                    "avg_rank": r.avg_rank,
                })
            })
            .collect();
        let statistics = serde_json::json!({ "top_k": top_k, "entities": entities });
        RunReport::new("prevalence", &[args.entity_ranking.as_path()], 0, statistics)?.write_json(path)?;
    }

    Ok(())
}
