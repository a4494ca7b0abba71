use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use clap::Parser;
use process::{
    Ingestor,
    database::RedisStore,
    models::{CANDIDATES_ENDPOINT, ENDPOINT},
    remote::FecClient,
    store::{CandidateStore, MemoryStore},
};
use rollup::{aggregate, display_name_for, resolve_national_totals};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Runs a single ingestion pass outside the server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, env = "FEC_API_KEY", default_value = "DEMO_KEY")]
    api_key: String,

    #[arg(long, env = "FEC_BASE_URL", default_value = ENDPOINT)]
    base_url: String,

    #[arg(long, env = "FEC_CANDIDATES_URL", default_value = CANDIDATES_ENDPOINT)]
    candidates_url: String,

    #[arg(long, env = "FEC_PER_PAGE", default_value_t = 100)]
    per_page: u32,

    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    /// Ingest into memory and print the national ranking instead of writing to Redis.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let store: Arc<dyn CandidateStore> = if args.dry_run {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            RedisStore::connect(&args.redis_url)
                .await
                .with_context(|| format!("connecting to {}", args.redis_url))?,
        )
    };

    let source = Arc::new(
        FecClient::new(args.base_url, args.api_key, args.per_page)
            .with_candidates_url(args.candidates_url),
    );
    let report = Ingestor::new(source, store.clone()).run().await?;

    info!(
        "Ingested {} rows across {} pages and {} candidate profiles in {}s",
        report.upserted,
        report.pages,
        report.profiles,
        (report.finished_at - report.started_at).num_seconds()
    );

    if args.dry_run {
        let records = store.all().await?;
        let facts: Vec<_> = records.iter().flat_map(|record| record.facts(None)).collect();
        let names: HashMap<_, _> = store
            .profiles()
            .await?
            .into_iter()
            .map(|profile| (profile.candidate_id, profile.name))
            .collect();

        for candidate in resolve_national_totals(&aggregate(&facts)).candidates() {
            let name = display_name_for(&names, &candidate.candidate_id, Some(&candidate.name));
            info!("{:>12.2}  {name}", candidate.total);
        }
    }

    Ok(())
}
