use crate::{common::PageRequest, config::AppConfig, errors::ServiceError, ApiResponse, PaginatedResponse};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input.validate().map_err(ServiceError::from)
}

/// Pagination parameters for list operations
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-based page number; values below 1 are treated as 1
    pub page: Option<u64>,
    /// Page size; 0 or above the configured maximum uses the default
    pub limit: Option<u64>,
}

impl PaginationParams {
    pub fn resolve(&self, config: &AppConfig) -> PageRequest {
        PageRequest::normalize(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(0),
            config.api_default_page_size,
            config.api_max_page_size,
        )
    }
}

/// Builds a paginated body, converting each item into its response shape.
pub fn paginate<M, T: From<M>>(items: Vec<M>, total: u64, page: PageRequest) -> PaginatedResponse<T> {
    PaginatedResponse {
        items: items.into_iter().map(T::from).collect(),
        total,
        page: page.page,
        limit: page.limit,
        total_pages: page.total_pages(total),
    }
}
