use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockpick_core::config::{env_or, Settings};
use stockpick_core::ingest::feed::HttpDataFeed;
use stockpick_core::ingest::seed::seed_catalog;
use stockpick_core::service::ScoreQueryService;
use stockpick_core::storage::postgres::PgCatalog;
use stockpick_core::storage::CatalogAccess;

mod routes;

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

    let catalog = connect_catalog(&settings).await;

    if let Some(catalog) = &catalog {
        if env_or("SEED_ON_STARTUP", true) {
            seed_on_startup(&settings, catalog.as_ref()).await;
        }
    }

    let state = routes::AppState {
        service: catalog.map(ScoreQueryService::new),
    };
    let app = routes::router(state);

    let port: u16 = env_or("PORT", 3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Connects and migrates. Any failure leaves the API up in degraded mode.
async fn connect_catalog(settings: &Settings) -> Option<Arc<dyn CatalogAccess>> {
    let pool = match stockpick_core::storage::connect_with_retry(settings).await {
        Ok(pool) => pool,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "db connect failed; starting API in degraded mode");
            return None;
        }
    };

    if let Err(e) = stockpick_core::storage::migrate(&pool).await {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %format!("{e:#}"), "db migrations failed; starting API in degraded mode");
        return None;
    }

    let catalog: Arc<dyn CatalogAccess> = Arc::new(PgCatalog::new(pool));
    Some(catalog)
}

/// Seeding failures are reported but never stop the API from serving what is already stored.
async fn seed_on_startup(settings: &Settings, catalog: &dyn CatalogAccess) {
    let feed = match HttpDataFeed::from_settings(settings) {
        Ok(feed) => feed,
        Err(e) => {
            tracing::warn!(error = %e, "data feed not configured; skipping startup seed");
            return;
        }
    };

    match seed_catalog(&feed, catalog).await {
        Ok(summary) => {
            tracing::info!(
                fetched = summary.fetched,
                inserted = summary.inserted,
                "catalog seeded"
            );
        }
        Err(e) => {
            let err = anyhow::Error::new(e);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %format!("{err:#}"), "catalog seeding failed; serving stored data");
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
