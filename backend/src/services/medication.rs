//! Medication catalog service
//!
//! CRUD over the stock ledger rows. On-hand quantity is intentionally
//! absent from the update path: it only changes through the movement
//! service.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Medication;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::{validate_non_negative, validate_required_text, validate_unit_price};

use crate::error::{AppError, AppResult};

/// Medication service for catalog maintenance
#[derive(Clone)]
pub struct MedicationService {
    db: PgPool,
}

/// Input for creating a medication
#[derive(Debug, Deserialize)]
pub struct CreateMedicationInput {
    pub name: String,
    pub category: String,
    pub unit: String,
    /// Initial on-hand quantity; sets the ledger baseline
    pub quantity: i32,
    pub unit_price: Decimal,
    pub expiry_date: NaiveDate,
    pub batch_number: String,
    pub supplier: String,
    pub low_stock_threshold: i32,
    pub description: Option<String>,
}

/// Input for updating a medication's catalog attributes
#[derive(Debug, Deserialize)]
pub struct UpdateMedicationInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub unit_price: Option<Decimal>,
    pub low_stock_threshold: Option<i32>,
    pub description: Option<String>,
}

/// Filter for the medication listing
#[derive(Debug, Default, Clone)]
pub struct MedicationFilter {
    /// Case-insensitive substring match on the name
    pub search: Option<String>,
    pub category: Option<String>,
}

const MEDICATION_COLUMNS: &str = "id, pharmacy_id, name, category, unit, quantity, unit_price, \
     expiry_date, batch_number, supplier, low_stock_threshold, description, created_at, updated_at";

impl MedicationService {
    /// Create a new MedicationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a medication
    pub async fn create(
        &self,
        pharmacy_id: Uuid,
        input: CreateMedicationInput,
    ) -> AppResult<Medication> {
        validate_required_text(&input.name).map_err(|msg| AppError::validation("name", msg))?;
        validate_required_text(&input.category)
            .map_err(|msg| AppError::validation("category", msg))?;
        validate_required_text(&input.unit).map_err(|msg| AppError::validation("unit", msg))?;
        validate_required_text(&input.supplier)
            .map_err(|msg| AppError::validation("supplier", msg))?;
        validate_required_text(&input.batch_number)
            .map_err(|msg| AppError::validation("batch_number", msg))?;
        validate_non_negative(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;
        validate_unit_price(input.unit_price)
            .map_err(|msg| AppError::validation("unit_price", msg))?;
        validate_non_negative(input.low_stock_threshold)
            .map_err(|msg| AppError::validation("low_stock_threshold", msg))?;

        let medication = sqlx::query_as::<_, Medication>(&format!(
            r#"
            INSERT INTO medications (
                pharmacy_id, name, category, unit, quantity, unit_price, expiry_date,
                batch_number, supplier, low_stock_threshold, description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {MEDICATION_COLUMNS}
            "#
        ))
        .bind(pharmacy_id)
        .bind(input.name.trim())
        .bind(input.category.trim())
        .bind(input.unit.trim())
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(input.expiry_date)
        .bind(input.batch_number.trim())
        .bind(input.supplier.trim())
        .bind(input.low_stock_threshold)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(medication)
    }

    /// Get a medication by ID
    pub async fn get(&self, pharmacy_id: Uuid, medication_id: Uuid) -> AppResult<Medication> {
        sqlx::query_as::<_, Medication>(&format!(
            r#"
            SELECT {MEDICATION_COLUMNS}
            FROM medications
            WHERE id = $1 AND pharmacy_id = $2
            "#
        ))
        .bind(medication_id)
        .bind(pharmacy_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Medication".to_string()))
    }

    /// List medications for a pharmacy, ordered by name
    pub async fn list(
        &self,
        pharmacy_id: Uuid,
        filter: MedicationFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Medication>> {
        let search = filter.search.map(|s| format!("%{}%", s.trim()));

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM medications
            WHERE pharmacy_id = $1
              AND ($2::text IS NULL OR name ILIKE $2)
              AND ($3::text IS NULL OR category = $3)
            "#,
        )
        .bind(pharmacy_id)
        .bind(&search)
        .bind(&filter.category)
        .fetch_one(&self.db)
        .await?;

        let medications = sqlx::query_as::<_, Medication>(&format!(
            r#"
            SELECT {MEDICATION_COLUMNS}
            FROM medications
            WHERE pharmacy_id = $1
              AND ($2::text IS NULL OR name ILIKE $2)
              AND ($3::text IS NULL OR category = $3)
            ORDER BY name ASC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(pharmacy_id)
        .bind(&search)
        .bind(&filter.category)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: medications,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Update a medication's catalog attributes. Quantity is not updatable
    /// here: record a movement instead.
    pub async fn update(
        &self,
        pharmacy_id: Uuid,
        medication_id: Uuid,
        input: UpdateMedicationInput,
    ) -> AppResult<Medication> {
        let existing = self.get(pharmacy_id, medication_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let category = input.category.unwrap_or(existing.category);
        let unit = input.unit.unwrap_or(existing.unit);
        let unit_price = input.unit_price.unwrap_or(existing.unit_price);
        let low_stock_threshold = input
            .low_stock_threshold
            .unwrap_or(existing.low_stock_threshold);
        let description = input.description.or(existing.description);

        validate_required_text(&name).map_err(|msg| AppError::validation("name", msg))?;
        validate_required_text(&category).map_err(|msg| AppError::validation("category", msg))?;
        validate_required_text(&unit).map_err(|msg| AppError::validation("unit", msg))?;
        validate_unit_price(unit_price).map_err(|msg| AppError::validation("unit_price", msg))?;
        validate_non_negative(low_stock_threshold)
            .map_err(|msg| AppError::validation("low_stock_threshold", msg))?;

        let medication = sqlx::query_as::<_, Medication>(&format!(
            r#"
            UPDATE medications
            SET name = $1, category = $2, unit = $3, unit_price = $4,
                low_stock_threshold = $5, description = $6, updated_at = NOW()
            WHERE id = $7 AND pharmacy_id = $8
            RETURNING {MEDICATION_COLUMNS}
            "#
        ))
        .bind(name.trim())
        .bind(category.trim())
        .bind(unit.trim())
        .bind(unit_price)
        .bind(low_stock_threshold)
        .bind(&description)
        .bind(medication_id)
        .bind(pharmacy_id)
        .fetch_one(&self.db)
        .await?;

        Ok(medication)
    }

    /// Administrative delete. Movement history goes with the row (FK cascade).
    pub async fn delete(&self, pharmacy_id: Uuid, medication_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM medications WHERE id = $1 AND pharmacy_id = $2")
            .bind(medication_id)
            .bind(pharmacy_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Medication".to_string()));
        }

        Ok(())
    }
}
