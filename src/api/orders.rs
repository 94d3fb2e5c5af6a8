use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::domain::inventory::OrderLine;
use crate::domain::order::{OrderId, OrderStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub total_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightRequest {
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueResponse {
    pub total_revenue: Decimal,
}

pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let CreateOrderRequest {
        customer_id,
        total_amount,
    } = body.into_inner();

    let order = state.engine.create_order(customer_id, total_amount).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn list_orders(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.engine.list_all().await)
}

pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = OrderId(path.into_inner());
    let order = state.engine.find_by_id(id).await.ok_or(ApiError::NotFound(id))?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn list_by_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let status: OrderStatus = path.parse()?;
    Ok(HttpResponse::Ok().json(state.engine.list_by_status(status).await))
}

/// `?status=` narrows the listing to one status.
pub async fn list_by_customer(
    state: web::Data<AppState>,
    path: web::Path<String>,
    filter: web::Query<StatusFilter>,
) -> Result<HttpResponse, ApiError> {
    let customer_id = path.into_inner();

    let orders = match &filter.status {
        Some(status) => {
            let status: OrderStatus = status.parse()?;
            state
                .engine
                .list_by_customer_and_status(&customer_id, status)
                .await
        }
        None => state.engine.list_by_customer(&customer_id).await,
    };

    Ok(HttpResponse::Ok().json(orders))
}

pub async fn update_status(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = OrderId(path.into_inner());
    let status: OrderStatus = body.status.parse()?;

    let order = state
        .engine
        .update_status(id, status)
        .await
        .ok_or(ApiError::NotFound(id))?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn statistics(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.engine.statistics().await)
}

pub async fn revenue(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(RevenueResponse {
        total_revenue: state.engine.calculate_total_revenue().await,
    })
}

pub async fn preflight(
    state: web::Data<AppState>,
    body: web::Json<PreflightRequest>,
) -> HttpResponse {
    let report = state.engine.preflight(&body.customer_id, &body.items).await;
    HttpResponse::Ok().json(report)
}
