use super::common::{created_response, no_content_response, paginate, validate_input, PaginationParams};
use crate::{
    entities::category::Model as CategoryModel,
    errors::ServiceError,
    services::categories::{CategoryInput, UpdateCategoryInput},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub category_id: i32,
    pub category_name: String,
    pub description: Option<String>,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(model: CategoryModel) -> Self {
        Self {
            category_id: model.category_id,
            category_name: model.category_name,
            description: model.description,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryInput>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let category = state.services.categories.create_category(payload).await?;
    Ok(created_response(CategoryResponse::from(category)))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(PaginationParams),
    responses((status = 200, description = "Categories returned", body = PaginatedResponse<CategoryResponse>)),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<CategoryResponse>> {
    let page = params.resolve(&state.config);
    let (categories, total) = state.services.categories.list_categories(page).await?;
    Ok(Json(ApiResponse::success(paginate(categories, total, page))))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category returned", body = CategoryResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
) -> ApiResult<CategoryResponse> {
    let category = state.services.categories.get_category(category_id).await?;
    Ok(Json(ApiResponse::success(category.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = UpdateCategoryInput,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
    Json(payload): Json<UpdateCategoryInput>,
) -> ApiResult<CategoryResponse> {
    validate_input(&payload)?;
    let category = state
        .services
        .categories
        .update_category(category_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(category.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
) -> Result<Response, ServiceError> {
    state.services.categories.delete_category(category_id).await?;
    Ok(no_content_response())
}
