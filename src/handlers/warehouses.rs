use super::common::{created_response, no_content_response, paginate, validate_input, PaginationParams};
use crate::{
    entities::warehouse::Model as WarehouseModel,
    errors::ServiceError,
    services::warehouses::{UpdateWarehouseInput, WarehouseInput},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WarehouseResponse {
    pub warehouse_id: i32,
    pub warehouse_name: String,
    pub location: Option<String>,
}

impl From<WarehouseModel> for WarehouseResponse {
    fn from(model: WarehouseModel) -> Self {
        Self {
            warehouse_id: model.warehouse_id,
            warehouse_name: model.warehouse_name,
            location: model.location,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/warehouses",
    request_body = WarehouseInput,
    responses(
        (status = 201, description = "Warehouse created", body = WarehouseResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(payload): Json<WarehouseInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let warehouse = state.services.warehouses.create_warehouse(payload).await?;
    Ok(created_response(WarehouseResponse::from(warehouse)))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouses",
    params(PaginationParams),
    responses((status = 200, description = "Warehouses returned", body = PaginatedResponse<WarehouseResponse>)),
    tag = "warehouses"
)]
pub async fn list_warehouses(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<WarehouseResponse>> {
    let page = params.resolve(&state.config);
    let (warehouses, total) = state.services.warehouses.list_warehouses(page).await?;
    Ok(Json(ApiResponse::success(paginate(warehouses, total, page))))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouses/{id}",
    params(("id" = i32, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Warehouse returned", body = WarehouseResponse),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<i32>,
) -> ApiResult<WarehouseResponse> {
    let warehouse = state.services.warehouses.get_warehouse(warehouse_id).await?;
    Ok(Json(ApiResponse::success(warehouse.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/warehouses/{id}",
    params(("id" = i32, Path, description = "Warehouse id")),
    request_body = UpdateWarehouseInput,
    responses(
        (status = 200, description = "Warehouse updated", body = WarehouseResponse),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn update_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<i32>,
    Json(payload): Json<UpdateWarehouseInput>,
) -> ApiResult<WarehouseResponse> {
    validate_input(&payload)?;
    let warehouse = state
        .services
        .warehouses
        .update_warehouse(warehouse_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(warehouse.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/warehouses/{id}",
    params(("id" = i32, Path, description = "Warehouse id")),
    responses(
        (status = 204, description = "Warehouse deleted"),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn delete_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<i32>,
) -> Result<Response, ServiceError> {
    state.services.warehouses.delete_warehouse(warehouse_id).await?;
    Ok(no_content_response())
}
