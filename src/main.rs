use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_orchestrator::api::{self, AppState};
use order_orchestrator::clients::{HttpCustomerDirectory, HttpInventory};
use order_orchestrator::config::Settings;
use order_orchestrator::metrics::Metrics;
use order_orchestrator::{InMemoryOrderStore, OrderEngine};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;

    // RUST_LOG wins over the configured filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log.filter)),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting order orchestrator");

    let metrics = Arc::new(Metrics::new().context("failed to register metrics")?);
    tracing::info!("Metrics registry created with {} metrics", metrics.registry().gather().len());

    let directory = HttpCustomerDirectory::new(&settings.customer_service.endpoint())
        .context("invalid customer service settings")?
        .with_metrics(metrics.clone());
    let inventory = HttpInventory::new(&settings.inventory_service.endpoint())
        .context("invalid inventory service settings")?
        .with_metrics(metrics.clone());
    tracing::info!(
        customer_service = %settings.customer_service.base_url,
        inventory_service = %settings.inventory_service.base_url,
        "Remote services configured"
    );

    let engine = OrderEngine::new(Arc::new(InMemoryOrderStore::default()))
        .with_oracles(Arc::new(directory), Arc::new(inventory))
        .with_metrics(metrics.clone());
    let state = web::Data::new(AppState::new(engine).with_metrics(metrics));

    let bind = (settings.server.host.clone(), settings.server.port);
    tracing::info!("Listening on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind(bind)
        .context("failed to bind HTTP listener")?
        .run()
        .await?;

    tracing::info!("Shut down");
    Ok(())
}
