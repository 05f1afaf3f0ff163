//! TeleUsage Server
//!
//! Usage record engine: seeds the subscriber directory, generates a batch of
//! synthetic call traffic, then serves usage summaries and CDR reports.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use std::env;
use std::sync::Arc;
use teleusage_core::{
    config::StorageBackend,
    traits::{CdrRepository, SubscriberRepository},
    AppConfig, AppError,
};
use teleusage_db::{
    create_pool, ensure_schema, InMemoryCdrRepository, InMemorySubscriberRepository,
    PgCdrRepository, PgSubscriberRepository,
};
use teleusage_services::{ReportExporter, SubscriberSeeder, TrafficGenerator, UsageAggregator};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
fn default_directives(level: &str) -> String {
    format!(
        "teleusage={lvl},teleusage_core={lvl},teleusage_api={lvl},teleusage_services={lvl},teleusage_db={lvl},actix_web=info,sqlx=warn",
        lvl = level
    )
}

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&log_level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Build the subscriber directory and record store for the configured backend
async fn open_stores(
    config: &AppConfig,
) -> Result<(Arc<dyn SubscriberRepository>, Arc<dyn CdrRepository>), AppError> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage, records are lost on restart");
            let subscribers: Arc<dyn SubscriberRepository> =
                Arc::new(InMemorySubscriberRepository::new());
            let cdrs: Arc<dyn CdrRepository> = Arc::new(InMemoryCdrRepository::new());
            Ok((subscribers, cdrs))
        }
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&config.database).await?;
            ensure_schema(&pool).await?;

            let subscribers: Arc<dyn SubscriberRepository> =
                Arc::new(PgSubscriberRepository::new(pool.clone()));
            let cdrs: Arc<dyn CdrRepository> = Arc::new(PgCdrRepository::new(pool));
            Ok((subscribers, cdrs))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting TeleUsage v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    let (subscribers, cdrs) = open_stores(&config)
        .await
        .context("failed to open storage")?;

    let seed = config.seed.subscribers()?;
    SubscriberSeeder::new(subscribers.clone(), seed)
        .seed()
        .await
        .context("failed to seed subscriber directory")?;

    if config.generator.on_startup {
        TrafficGenerator::new(subscribers.clone(), cdrs.clone(), config.generator.clone())
            .generate()
            .await
            .context("failed to generate call records")?;
    } else {
        info!("Startup traffic generation disabled");
    }

    let exporter = web::Data::new(
        ReportExporter::new(subscribers.clone(), cdrs.clone(), &config.reports.directory)
            .context("failed to prepare reports directory")?,
    );
    let aggregator = web::Data::new(UsageAggregator::new(subscribers, cdrs));

    let bind_addr = config.server_addr();
    info!(
        "Starting HTTP server on {} with {} workers, reports in {}",
        bind_addr,
        config.server.workers,
        config.reports.directory.display()
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .app_data(exporter.clone())
            .app_data(aggregator.clone())
            // Middleware
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(teleusage_api::configure)
            // Root redirect to health
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/health"))
                        .finish()
                }),
            )
    })
    .workers(config.server.workers)
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}
