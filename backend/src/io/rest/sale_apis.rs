//! # REST API for the Sales Ledger
//!
//! Recording sales and printing their receipts.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use crate::io::rest::ApiJson;
use crate::io::rest::mappers::pedigree_mapper::PedigreeMapper;
use crate::io::rest::mappers::sale_mapper::SaleMapper;
use crate::AppState;
use shared::RecordSaleRequest;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(record_sale))
        .route("/:id", get(get_sale))
        .route("/:id/receipt", get(get_receipt))
        .route("/:id/receipt/text", get(get_receipt_text))
}

/// Record a sale; every listed animal is marked sold
pub async fn record_sale(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RecordSaleRequest>,
) -> impl IntoResponse {
    info!("POST /api/sales - request: {:?}", request);

    let command = match SaleMapper::to_record_command(request) {
        Ok(command) => command,
        Err(e) => return e.into_response(),
    };

    match state.sale_service.record_sale(command).await {
        Ok(sale) => {
            let message = format!("Sale to {} recorded", sale.buyer_name);
            (StatusCode::CREATED, Json(SaleMapper::to_sale_response(sale, message))).into_response()
        }
        Err(e) => {
            error!("Failed to record sale: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/sales/{}", sale_id);

    match state.sale_service.get_sale(&sale_id).await {
        Ok(sale) => (StatusCode::OK, Json(SaleMapper::to_dto(sale))).into_response(),
        Err(e) => {
            error!("Failed to get sale {}: {}", sale_id, e);
            e.into_response()
        }
    }
}

pub async fn list_sales(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/sales");

    match state.sale_service.list_sales().await {
        Ok(sales) => (StatusCode::OK, Json(SaleMapper::to_list_response(sales))).into_response(),
        Err(e) => {
            error!("Failed to list sales: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_receipt(
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/sales/{}/receipt", sale_id);

    match state.report_service.sale_receipt(&sale_id).await {
        Ok(receipt) => (StatusCode::OK, Json(PedigreeMapper::to_receipt_dto(receipt))).into_response(),
        Err(e) => {
            error!("Failed to build receipt for {}: {}", sale_id, e);
            e.into_response()
        }
    }
}

pub async fn get_receipt_text(
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/sales/{}/receipt/text", sale_id);

    match state.report_service.sale_receipt_text(&sale_id).await {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(e) => {
            error!("Failed to render receipt for {}: {}", sale_id, e);
            e.into_response()
        }
    }
}
