use super::common::{created_response, no_content_response, paginate, validate_input, PaginationParams};
use crate::{
    common::new_movement_code,
    entities::{inventory_transaction::Model as MovementModel, MovementKind},
    errors::ServiceError,
    services::ledger_reconciliation::{with_deadline, NewMovement},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordMovementRequest {
    #[validate(length(max = 64))]
    pub product_id: String,
    pub warehouse_id: i32,
    pub quantity: i32,
    /// "in" for a goods receipt, "out" for a goods issue
    #[schema(example = "in")]
    pub transaction_type: String,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovementResponse {
    #[schema(example = "HD261016042917")]
    pub transaction_id: String,
    pub product_id: String,
    pub warehouse_id: i32,
    pub quantity: i32,
    #[schema(example = "out")]
    pub transaction_type: String,
    pub transaction_date: DateTime<Utc>,
    pub note: Option<String>,
}

impl From<MovementModel> for MovementResponse {
    fn from(model: MovementModel) -> Self {
        Self {
            transaction_id: model.transaction_id,
            product_id: model.product_id,
            warehouse_id: model.warehouse_id,
            quantity: model.quantity,
            transaction_type: model.transaction_type.to_string(),
            transaction_date: model.transaction_date,
            note: model.note,
        }
    }
}

fn parse_kind(raw: &str) -> Result<MovementKind, ServiceError> {
    MovementKind::from_str(&raw.trim().to_ascii_lowercase()).map_err(|_| {
        ServiceError::ValidationError("transaction type must be \"in\" or \"out\"".to_string())
    })
}

/// Record a goods receipt or goods issue
#[utoipa::path(
    post,
    path = "/api/v1/movements",
    request_body = RecordMovementRequest,
    responses(
        (status = 201, description = "Movement recorded and stock adjusted", body = MovementResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "No stock entry for an issue", body = crate::errors::ErrorResponse),
        (status = 408, description = "Movement deadline elapsed; nothing applied", body = crate::errors::ErrorResponse),
        (status = 409, description = "Insufficient stock", body = crate::errors::ErrorResponse),
        (status = 500, description = "Movement rolled back", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn record_movement(
    State(state): State<AppState>,
    Json(payload): Json<RecordMovementRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let kind = parse_kind(&payload.transaction_type)?;

    let movement = NewMovement {
        movement_id: new_movement_code(&state.config.movement_code_prefix),
        product_id: payload.product_id.trim().to_string(),
        warehouse_id: payload.warehouse_id,
        quantity: payload.quantity,
        note: payload.note,
    };

    let ledger = state.services.ledger.clone();
    let recorded = with_deadline(state.config.movement_timeout(), |token| async move {
        match kind {
            MovementKind::Receipt => ledger.record_receipt(movement, &token).await,
            MovementKind::Issue => ledger.record_issue(movement, &token).await,
        }
    })
    .await?;

    info!(movement_id = %recorded.transaction_id, kind = %kind, "movement recorded");
    Ok(created_response(MovementResponse::from(recorded)))
}

/// List movements, newest first
#[utoipa::path(
    get,
    path = "/api/v1/movements",
    params(PaginationParams),
    responses(
        (status = 200, description = "Movements returned", body = PaginatedResponse<MovementResponse>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<MovementResponse>> {
    let page = params.resolve(&state.config);
    let (movements, total) = state.services.ledger.list_movements(page).await?;
    Ok(Json(ApiResponse::success(paginate(movements, total, page))))
}

/// Get a single movement
#[utoipa::path(
    get,
    path = "/api/v1/movements/{id}",
    params(("id" = String, Path, description = "Movement id")),
    responses(
        (status = 200, description = "Movement returned", body = MovementResponse),
        (status = 404, description = "Movement not found", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn get_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<String>,
) -> ApiResult<MovementResponse> {
    let movement = state.services.ledger.get_movement(&movement_id).await?;
    Ok(Json(ApiResponse::success(movement.into())))
}

/// Delete a movement record. Stock levels are not adjusted.
#[utoipa::path(
    delete,
    path = "/api/v1/movements/{id}",
    params(("id" = String, Path, description = "Movement id")),
    responses(
        (status = 204, description = "Movement deleted"),
        (status = 404, description = "Movement not found", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn delete_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<String>,
) -> Result<Response, ServiceError> {
    state.services.ledger.delete_movement(&movement_id).await?;
    Ok(no_content_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    #[test]
    fn kind_parsing_accepts_case_and_whitespace() {
        assert_eq!(parse_kind("in").unwrap(), MovementKind::Receipt);
        assert_eq!(parse_kind(" OUT ").unwrap(), MovementKind::Issue);
        assert_matches!(parse_kind("transfer"), Err(ServiceError::ValidationError(_)));
    }

    proptest! {
        #[test]
        fn only_in_and_out_parse(raw in "[a-zA-Z ]{0,6}") {
            let normalized = raw.trim().to_ascii_lowercase();
            let parsed = parse_kind(&raw);
            prop_assert_eq!(parsed.is_ok(), normalized == "in" || normalized == "out");
        }
    }
}
