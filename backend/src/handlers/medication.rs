//! HTTP handlers for medication catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::Medication;
use shared::types::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::middleware::{require_admin, CurrentUser};
use crate::services::medication::{
    CreateMedicationInput, MedicationFilter, MedicationService, UpdateMedicationInput,
};
use crate::AppState;

/// Create a medication
pub async fn create_medication(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateMedicationInput>,
) -> AppResult<Json<Medication>> {
    let service = MedicationService::new(state.db);
    let medication = service.create(current_user.0.pharmacy_id, input).await?;
    Ok(Json(medication))
}

/// Get a medication by ID
pub async fn get_medication(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(medication_id): Path<Uuid>,
) -> AppResult<Json<Medication>> {
    let service = MedicationService::new(state.db);
    let medication = service
        .get(current_user.0.pharmacy_id, medication_id)
        .await?;
    Ok(Json(medication))
}

/// Query parameters for the medication listing
#[derive(Debug, Deserialize)]
pub struct ListMedicationsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List medications with optional search and pagination
pub async fn list_medications(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListMedicationsQuery>,
) -> AppResult<Json<PaginatedResponse<Medication>>> {
    let filter = MedicationFilter {
        search: query.search,
        category: query.category,
    };

    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    let service = MedicationService::new(state.db);
    let medications = service
        .list(current_user.0.pharmacy_id, filter, pagination)
        .await?;
    Ok(Json(medications))
}

/// Update a medication's catalog attributes
pub async fn update_medication(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(medication_id): Path<Uuid>,
    Json(input): Json<UpdateMedicationInput>,
) -> AppResult<Json<Medication>> {
    let service = MedicationService::new(state.db);
    let medication = service
        .update(current_user.0.pharmacy_id, medication_id, input)
        .await?;
    Ok(Json(medication))
}

/// Delete a medication (admin only)
pub async fn delete_medication(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(medication_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_admin(&current_user.0)?;

    let service = MedicationService::new(state.db);
    service
        .delete(current_user.0.pharmacy_id, medication_id)
        .await?;
    Ok(Json(()))
}
