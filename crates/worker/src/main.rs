use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockpick_core::config::Settings;
use stockpick_core::domain::{ranking, scoring};
use stockpick_core::ingest::feed::HttpDataFeed;
use stockpick_core::ingest::seed::seed_catalog;
use stockpick_core::storage::memory::MemoryCatalog;
use stockpick_core::storage::postgres::PgCatalog;
use stockpick_core::storage::CatalogAccess;

#[derive(Debug, Parser)]
#[command(name = "stockpick_worker")]
struct Args {
    /// Fetch and score in memory without touching the database.
    #[arg(long)]
    dry_run: bool,

    /// How many top picks to log in dry-run mode.
    #[arg(long, default_value_t = ranking::DEFAULT_LIMIT)]
    limit: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let res = run(&settings, &args).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "worker run failed");
    }
    res
}

async fn run(settings: &Settings, args: &Args) -> anyhow::Result<()> {
    let feed = HttpDataFeed::from_settings(settings)?;

    if args.dry_run {
        let catalog = MemoryCatalog::new();
        let summary = seed_catalog(&feed, &catalog)
            .await
            .context("seeding in-memory catalog failed")?;
        tracing::info!(
            dry_run = true,
            fetched = summary.fetched,
            unique = summary.inserted,
            "data feed fetched"
        );

        let records = catalog.list_all().await?;
        for (idx, scored) in ranking::rank(records, args.limit).iter().enumerate() {
            let b = scoring::breakdown(&scored.record);
            tracing::info!(
                rank = idx + 1,
                ticker = %scored.record.ticker,
                brokerage = %scored.record.brokerage,
                score = b.total,
                rating = b.rating,
                action = b.action,
                growth = b.growth,
                "top pick"
            );
        }
        return Ok(());
    }

    let pool = stockpick_core::storage::connect_with_retry(settings).await?;
    stockpick_core::storage::migrate(&pool).await?;

    let catalog = PgCatalog::new(pool);
    let summary = seed_catalog(&feed, &catalog)
        .await
        .context("seeding catalog failed")?;

    tracing::info!(
        fetched = summary.fetched,
        inserted = summary.inserted,
        skipped = summary.fetched - summary.inserted,
        "catalog seeded"
    );
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
