use super::common::{created_response, no_content_response, paginate, validate_input, PaginationParams};
use crate::{
    entities::supplier::Model as SupplierModel,
    errors::ServiceError,
    services::suppliers::{SupplierInput, UpdateSupplierInput},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupplierResponse {
    pub supplier_id: i32,
    pub supplier_name: String,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SupplierModel> for SupplierResponse {
    fn from(model: SupplierModel) -> Self {
        Self {
            supplier_id: model.supplier_id,
            supplier_name: model.supplier_name,
            contact_phone: model.contact_phone,
            contact_email: model.contact_email,
            address: model.address,
            city: model.city,
            country: model.country,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Create a new supplier
#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    request_body = SupplierInput,
    responses(
        (status = 201, description = "Supplier created", body = SupplierResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<SupplierInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let supplier = state.services.suppliers.create_supplier(payload).await?;
    Ok(created_response(SupplierResponse::from(supplier)))
}

/// List suppliers, newest first
#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    params(PaginationParams),
    responses((status = 200, description = "Suppliers returned", body = PaginatedResponse<SupplierResponse>)),
    tag = "suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<SupplierResponse>> {
    let page = params.resolve(&state.config);
    let (suppliers, total) = state.services.suppliers.list_suppliers(page).await?;
    Ok(Json(ApiResponse::success(paginate(suppliers, total, page))))
}

/// Get a supplier by ID
#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{id}",
    params(("id" = i32, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier returned", body = SupplierResponse),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<i32>,
) -> ApiResult<SupplierResponse> {
    let supplier = state.services.suppliers.get_supplier(supplier_id).await?;
    Ok(Json(ApiResponse::success(supplier.into())))
}

/// Update a supplier
#[utoipa::path(
    put,
    path = "/api/v1/suppliers/{id}",
    params(("id" = i32, Path, description = "Supplier id")),
    request_body = UpdateSupplierInput,
    responses(
        (status = 200, description = "Supplier updated", body = SupplierResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<i32>,
    Json(payload): Json<UpdateSupplierInput>,
) -> ApiResult<SupplierResponse> {
    validate_input(&payload)?;
    let supplier = state
        .services
        .suppliers
        .update_supplier(supplier_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(supplier.into())))
}

/// Delete a supplier
#[utoipa::path(
    delete,
    path = "/api/v1/suppliers/{id}",
    params(("id" = i32, Path, description = "Supplier id")),
    responses(
        (status = 204, description = "Supplier deleted"),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<i32>,
) -> Result<Response, ServiceError> {
    state.services.suppliers.delete_supplier(supplier_id).await?;
    Ok(no_content_response())
}
