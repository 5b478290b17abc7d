//! Size statistics of an entity ranking.

use clap::Parser;
use rankaudit::{
    ranking::trec::load_run,
    report::{self, RunReport, Table},
    stats::{candidates_per_query, summarize_counts, unique_candidates, unique_candidates_for},
    Config, EntityId, QueryId, RankedSet,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "entities")]
struct Args {
    /// Entity ranking file (.run)
    #[arg(long)]
    entity_ranking: PathBuf,

    /// Also report unique entities of this query
    #[arg(long)]
    query: Option<String>,

    /// Write a JSON run report to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let _config = Config::load()?;

    let ranking: RankedSet<EntityId> = load_run(&args.entity_ranking, "given", "entities")?;
    let unique = unique_candidates(&ranking).len();
    report::stat("Unique entities (Total)", unique);
    if let Some(query) = args.query.as_deref().map(QueryId::new) {
        match unique_candidates_for(&ranking, &query) {
            Some(entities) => report::stat(&format!("Unique entities (#{})", query), entities.len()),
            None => log::error!("Could not find given query in ranking: {}", query),
        }
    }

    let per_query = candidates_per_query(&ranking);
    let mut table = Table::new(["Query", "Entities"]);
    for (query, count) in &per_query {
        table.row([query.to_string(), count.to_string()]);
    }
    println!("\nEntities per query:\n");
    table.print();

    let counts: Vec<usize> = per_query.iter().map(|(_, n)| *n).collect();
    let summary = summarize_counts(&counts);
    match summary {
        Some(s) => report::stat("Mean entities per query", format!("{:.2}", s.mean)),
        None => report::stat("Mean entities per query", "n/a (empty ranking)"),
    }

    if let Some(path) = &args.json {
        let statistics = serde_json::json!({
            "queries": ranking.len(),
            "rows": ranking.total_candidates(),
            "unique_entities": unique,
            "entities_per_query": summary,
        });
        RunReport::new("entities", &[args.entity_ranking.as_path()], 0, statistics)?.write_json(path)?;
    }

    Ok(())
}
