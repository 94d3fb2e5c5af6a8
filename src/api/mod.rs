use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::engine::OrderEngine;
use crate::metrics::Metrics;

// ============================================================================
// HTTP API
// ============================================================================
//
// Thin actix-web layer: each route maps onto one engine operation.
//
//   /api/orders/...   order operations
//   /health           liveness
//   /metrics          Prometheus text exposition
//
// ============================================================================

pub mod error;
pub mod orders;

pub use self::error::ApiError;

pub struct AppState {
    pub engine: OrderEngine,
    pub metrics: Option<Arc<Metrics>>,
}

impl AppState {
    pub fn new(engine: OrderEngine) -> Self {
        Self {
            engine,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

/// Register every route. Literal segments are registered before `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api/orders")
            .route("", web::post().to(orders::create_order))
            .route("", web::get().to(orders::list_orders))
            .route("/statistics", web::get().to(orders::statistics))
            .route("/revenue", web::get().to(orders::revenue))
            .route("/preflight", web::post().to(orders::preflight))
            .route("/status/{status}", web::get().to(orders::list_by_status))
            .route("/customer/{customer_id}", web::get().to(orders::list_by_customer))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}/status", web::patch().to(orders::update_status)),
    )
    .route("/health", web::get().to(health))
    .route("/metrics", web::get().to(metrics));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "UP",
        "service": "order-service",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn metrics(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let Some(metrics) = &state.metrics else {
        return Ok(HttpResponse::NotFound().finish());
    };

    let body = metrics
        .render()
        .map_err(|e| ApiError::Internal(format!("metrics encoding failed: {}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}
