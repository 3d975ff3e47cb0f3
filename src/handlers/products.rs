use super::common::{created_response, no_content_response, paginate, validate_input, PaginationParams};
use crate::{
    entities::product::Model as ProductModel,
    errors::ServiceError,
    services::products::{ProductInput, UpdateProductInput},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    #[schema(example = "HD261016042917")]
    pub product_id: String,
    pub product_name: String,
    pub price: Decimal,
    pub discount: Decimal,
    pub plant_type: Option<String>,
    pub unit: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    #[schema(example = "Available")]
    pub status: String,
    pub category_id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductModel> for ProductResponse {
    fn from(model: ProductModel) -> Self {
        Self {
            product_id: model.product_id,
            product_name: model.product_name,
            price: model.price,
            discount: model.discount,
            plant_type: model.plant_type,
            unit: model.unit,
            image_url: model.image_url,
            description: model.description,
            status: model.status.to_string(),
            category_id: model.category_id,
            supplier_id: model.supplier_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let product = state.services.products.create_product(payload).await?;
    Ok(created_response(ProductResponse::from(product)))
}

/// List products, newest first
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(PaginationParams),
    responses((status = 200, description = "Products returned", body = PaginatedResponse<ProductResponse>)),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<ProductResponse>> {
    let page = params.resolve(&state.config);
    let (products, total) = state.services.products.list_products(page).await?;
    Ok(Json(ApiResponse::success(paginate(products, total, page))))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product returned", body = ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<ProductResponse> {
    let product = state.services.products.get_product(&product_id).await?;
    Ok(Json(ApiResponse::success(product.into())))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(payload): Json<UpdateProductInput>,
) -> ApiResult<ProductResponse> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .update_product(&product_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(product.into())))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Response, ServiceError> {
    state.services.products.delete_product(&product_id).await?;
    Ok(no_content_response())
}
