use super::common::{paginate, PaginationParams};
use crate::{
    entities::product_warehouse::Model as StockLevel, ApiResponse, ApiResult, AppState,
    PaginatedResponse,
};
use axum::extract::{Json, Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StockLevelResponse {
    pub product_id: String,
    pub warehouse_id: i32,
    pub quantity: i32,
    pub last_updated: DateTime<Utc>,
}

impl From<StockLevel> for StockLevelResponse {
    fn from(row: StockLevel) -> Self {
        Self {
            product_id: row.product_id,
            warehouse_id: row.warehouse_id,
            quantity: row.quantity,
            last_updated: row.last_updated,
        }
    }
}

/// List stock levels, most recently changed first
#[utoipa::path(
    get,
    path = "/api/v1/stock-levels",
    params(PaginationParams),
    responses(
        (status = 200, description = "Stock levels returned", body = PaginatedResponse<StockLevelResponse>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-levels"
)]
pub async fn list_stock_levels(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<StockLevelResponse>> {
    let page = params.resolve(&state.config);
    let (rows, total) = state.services.stock_levels.list_stock_levels(page).await?;
    Ok(Json(ApiResponse::success(paginate(rows, total, page))))
}

/// Stock level of one product in one warehouse
#[utoipa::path(
    get,
    path = "/api/v1/stock-levels/{product_id}/{warehouse_id}",
    params(
        ("product_id" = String, Path, description = "Product id"),
        ("warehouse_id" = i32, Path, description = "Warehouse id")
    ),
    responses(
        (status = 200, description = "Stock level returned", body = StockLevelResponse),
        (status = 404, description = "No stock entry", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-levels"
)]
pub async fn get_stock_level(
    State(state): State<AppState>,
    Path((product_id, warehouse_id)): Path<(String, i32)>,
) -> ApiResult<StockLevelResponse> {
    let row = state
        .services
        .stock_levels
        .get_stock_level(&product_id, warehouse_id)
        .await?;
    Ok(Json(ApiResponse::success(row.into())))
}
