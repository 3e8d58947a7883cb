//! HTTP handlers for stock movement endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{MovementKind, StockMovement};
use shared::types::{PaginatedResponse, Pagination};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::movement::{
    MovementFilter, MovementOutcome, MovementService, RecordAdjustmentInput, RecordPurchaseInput,
    RecordSaleInput,
};
use crate::AppState;

/// Record a sale
pub async fn record_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordSaleInput>,
) -> AppResult<Json<MovementOutcome>> {
    let service = MovementService::new(state.db);
    let outcome = service
        .record_sale(current_user.0.pharmacy_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(outcome))
}

/// Record a purchase intake
pub async fn record_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordPurchaseInput>,
) -> AppResult<Json<MovementOutcome>> {
    let service = MovementService::new(state.db);
    let outcome = service
        .record_purchase(current_user.0.pharmacy_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(outcome))
}

/// Record an adjustment or expiry/damage write-off
pub async fn record_adjustment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordAdjustmentInput>,
) -> AppResult<Json<MovementOutcome>> {
    let service = MovementService::new(state.db);
    let outcome = service
        .record_adjustment(current_user.0.pharmacy_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(outcome))
}

/// Query parameters for the movement listing
#[derive(Debug, Deserialize)]
pub struct ListMovementsQuery {
    pub medication_id: Option<Uuid>,
    pub kind: Option<MovementKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List movements with optional filters and pagination
pub async fn list_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListMovementsQuery>,
) -> AppResult<Json<PaginatedResponse<StockMovement>>> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if end < start {
            return Err(AppError::validation(
                "end_date",
                "End date cannot be before start date",
            ));
        }
    }

    let filter = MovementFilter {
        medication_id: query.medication_id,
        kind: query.kind,
        start_date: query.start_date,
        end_date: query.end_date,
    };

    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    let service = MovementService::new(state.db);
    let movements = service
        .list_movements(current_user.0.pharmacy_id, filter, pagination)
        .await?;
    Ok(Json(movements))
}

/// Get the full movement history for a medication
pub async fn get_medication_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(medication_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = MovementService::new(state.db);
    let movements = service
        .get_movements_for_medication(current_user.0.pharmacy_id, medication_id)
        .await?;
    Ok(Json(movements))
}
