//! Stock movement service: the transactional core of the inventory
//!
//! Every quantity change goes through here. A movement is a single atomic
//! unit: validate, lock the medication row, mutate the on-hand quantity,
//! append the audit record, commit. Nothing mutates `medications.quantity`
//! outside this service.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{AdjustmentKind, MovementKind, StockMovement};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::{
    remaining_after_removal, total_amount, validate_expiry_date, validate_movement_quantity,
    validate_reason, validate_required_text, validate_unit_price,
};

use crate::error::{AppError, AppResult};

/// Bounded retries for movements that lose a serialization race
const MAX_CONFLICT_RETRIES: u32 = 2;

/// Movement service owning the transactional read-modify-write cycle
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
}

/// Input for recording a sale
#[derive(Debug, Deserialize)]
pub struct RecordSaleInput {
    pub medication_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub customer_name: Option<String>,
    pub reference_id: Option<Uuid>,
}

/// Input for recording a purchase intake
#[derive(Debug, Deserialize)]
pub struct RecordPurchaseInput {
    pub medication_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub supplier: String,
    pub batch_number: String,
    pub expiry_date: chrono::NaiveDate,
    pub reference_id: Option<Uuid>,
}

/// Input for recording a stock-decreasing adjustment or write-off
#[derive(Debug, Deserialize)]
pub struct RecordAdjustmentInput {
    pub medication_id: Uuid,
    pub kind: AdjustmentKind,
    pub quantity: i32,
    pub reason: String,
    pub notes: Option<String>,
}

/// Before/after snapshot returned by every movement operation
#[derive(Debug, Clone, Serialize)]
pub struct MovementOutcome {
    pub movement_id: Uuid,
    pub previous_quantity: i32,
    pub new_quantity: i32,
}

/// Filter for the movement history listing. Date bounds are inclusive and
/// applied to the movement date.
#[derive(Debug, Default, Clone)]
pub struct MovementFilter {
    pub medication_id: Option<Uuid>,
    pub kind: Option<MovementKind>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

/// Medication fields read under the row lock
#[derive(Debug, sqlx::FromRow)]
struct LockedMedication {
    id: Uuid,
    quantity: i32,
    batch_number: String,
}

/// Column values for one appended movement record
struct NewMovement {
    pharmacy_id: Uuid,
    medication_id: Uuid,
    kind: MovementKind,
    quantity: i32,
    previous_quantity: i32,
    new_quantity: i32,
    unit_price: Option<Decimal>,
    total_amount: Option<Decimal>,
    reference_id: Option<Uuid>,
    batch_number: Option<String>,
    notes: Option<String>,
    created_by: Option<Uuid>,
}

impl MovementService {
    /// Create a new MovementService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a sale: decrease stock, rejecting oversells
    pub async fn record_sale(
        &self,
        pharmacy_id: Uuid,
        user_id: Uuid,
        input: RecordSaleInput,
    ) -> AppResult<MovementOutcome> {
        validate_movement_quantity(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;
        validate_unit_price(input.unit_price)
            .map_err(|msg| AppError::validation("unit_price", msg))?;

        let mut attempt = 0;
        loop {
            match self.try_record_sale(pharmacy_id, user_id, &input).await {
                Err(AppError::Database(ref err))
                    if is_serialization_failure(err) && attempt < MAX_CONFLICT_RETRIES =>
                {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        medication_id = %input.medication_id,
                        "serialization conflict on sale, retrying"
                    );
                }
                Err(AppError::Database(ref err)) if is_serialization_failure(err) => {
                    return Err(conflict_exhausted());
                }
                result => return result,
            }
        }
    }

    /// Record a purchase intake: increase stock and roll the medication's
    /// batch fields forward to the received batch
    pub async fn record_purchase(
        &self,
        pharmacy_id: Uuid,
        user_id: Uuid,
        input: RecordPurchaseInput,
    ) -> AppResult<MovementOutcome> {
        validate_movement_quantity(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;
        validate_unit_price(input.unit_price)
            .map_err(|msg| AppError::validation("unit_price", msg))?;
        validate_required_text(&input.supplier)
            .map_err(|msg| AppError::validation("supplier", msg))?;
        validate_required_text(&input.batch_number)
            .map_err(|msg| AppError::validation("batch_number", msg))?;
        let today = Utc::now().date_naive();
        validate_expiry_date(input.expiry_date, today)
            .map_err(|msg| AppError::validation("expiry_date", msg))?;

        let mut attempt = 0;
        loop {
            match self.try_record_purchase(pharmacy_id, user_id, &input).await {
                Err(AppError::Database(ref err))
                    if is_serialization_failure(err) && attempt < MAX_CONFLICT_RETRIES =>
                {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        medication_id = %input.medication_id,
                        "serialization conflict on purchase, retrying"
                    );
                }
                Err(AppError::Database(ref err)) if is_serialization_failure(err) => {
                    return Err(conflict_exhausted());
                }
                result => return result,
            }
        }
    }

    /// Record an adjustment or expiry/damage write-off: decrease stock
    pub async fn record_adjustment(
        &self,
        pharmacy_id: Uuid,
        user_id: Uuid,
        input: RecordAdjustmentInput,
    ) -> AppResult<MovementOutcome> {
        validate_movement_quantity(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;
        validate_reason(&input.reason).map_err(|msg| AppError::validation("reason", msg))?;

        let mut attempt = 0;
        loop {
            match self
                .try_record_adjustment(pharmacy_id, user_id, &input)
                .await
            {
                Err(AppError::Database(ref err))
                    if is_serialization_failure(err) && attempt < MAX_CONFLICT_RETRIES =>
                {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        medication_id = %input.medication_id,
                        "serialization conflict on adjustment, retrying"
                    );
                }
                Err(AppError::Database(ref err)) if is_serialization_failure(err) => {
                    return Err(conflict_exhausted());
                }
                result => return result,
            }
        }
    }

    /// One transactional sale attempt
    async fn try_record_sale(
        &self,
        pharmacy_id: Uuid,
        user_id: Uuid,
        input: &RecordSaleInput,
    ) -> AppResult<MovementOutcome> {
        let mut tx = self.db.begin().await?;

        let medication = Self::lock_medication(&mut tx, pharmacy_id, input.medication_id).await?;

        let new_quantity = remaining_after_removal(medication.quantity, input.quantity)
            .ok_or(AppError::InsufficientStock {
                available: medication.quantity,
            })?;

        Self::update_quantity(&mut tx, medication.id, new_quantity).await?;

        let movement_id = Self::insert_movement(
            &mut tx,
            NewMovement {
                pharmacy_id,
                medication_id: medication.id,
                kind: MovementKind::Sale,
                quantity: MovementKind::Sale.signed_delta(input.quantity),
                previous_quantity: medication.quantity,
                new_quantity,
                unit_price: Some(input.unit_price),
                total_amount: Some(total_amount(input.quantity, input.unit_price)),
                reference_id: input.reference_id,
                batch_number: Some(medication.batch_number),
                notes: input
                    .customer_name
                    .as_deref()
                    .map(|name| format!("Sold to {}", name)),
                created_by: Some(user_id),
            },
        )
        .await?;

        tx.commit().await?;

        Ok(MovementOutcome {
            movement_id,
            previous_quantity: medication.quantity,
            new_quantity,
        })
    }

    /// One transactional purchase attempt
    async fn try_record_purchase(
        &self,
        pharmacy_id: Uuid,
        user_id: Uuid,
        input: &RecordPurchaseInput,
    ) -> AppResult<MovementOutcome> {
        let mut tx = self.db.begin().await?;

        let medication = Self::lock_medication(&mut tx, pharmacy_id, input.medication_id).await?;

        let new_quantity = medication.quantity + input.quantity;

        // The medication row tracks the latest received batch: supplier,
        // batch number, expiry and price roll forward with each purchase.
        sqlx::query(
            r#"
            UPDATE medications
            SET quantity = $1, supplier = $2, batch_number = $3, expiry_date = $4,
                unit_price = $5, updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(new_quantity)
        .bind(&input.supplier)
        .bind(&input.batch_number)
        .bind(input.expiry_date)
        .bind(input.unit_price)
        .bind(medication.id)
        .execute(&mut *tx)
        .await?;

        let movement_id = Self::insert_movement(
            &mut tx,
            NewMovement {
                pharmacy_id,
                medication_id: medication.id,
                kind: MovementKind::Purchase,
                quantity: MovementKind::Purchase.signed_delta(input.quantity),
                previous_quantity: medication.quantity,
                new_quantity,
                unit_price: Some(input.unit_price),
                total_amount: Some(total_amount(input.quantity, input.unit_price)),
                reference_id: input.reference_id,
                batch_number: Some(input.batch_number.clone()),
                notes: Some(format!("Received from {}", input.supplier)),
                created_by: Some(user_id),
            },
        )
        .await?;

        tx.commit().await?;

        Ok(MovementOutcome {
            movement_id,
            previous_quantity: medication.quantity,
            new_quantity,
        })
    }

    /// One transactional adjustment attempt
    async fn try_record_adjustment(
        &self,
        pharmacy_id: Uuid,
        user_id: Uuid,
        input: &RecordAdjustmentInput,
    ) -> AppResult<MovementOutcome> {
        let mut tx = self.db.begin().await?;

        let medication = Self::lock_medication(&mut tx, pharmacy_id, input.medication_id).await?;

        let new_quantity = remaining_after_removal(medication.quantity, input.quantity)
            .ok_or(AppError::InsufficientStock {
                available: medication.quantity,
            })?;

        Self::update_quantity(&mut tx, medication.id, new_quantity).await?;

        let kind = input.kind.movement_kind();
        let notes = match input.notes.as_deref() {
            Some(extra) if !extra.trim().is_empty() => {
                format!("{}; {}", input.reason.trim(), extra.trim())
            }
            _ => input.reason.trim().to_string(),
        };

        let movement_id = Self::insert_movement(
            &mut tx,
            NewMovement {
                pharmacy_id,
                medication_id: medication.id,
                kind,
                quantity: kind.signed_delta(input.quantity),
                previous_quantity: medication.quantity,
                new_quantity,
                unit_price: None,
                total_amount: None,
                reference_id: None,
                batch_number: Some(medication.batch_number),
                notes: Some(notes),
                created_by: Some(user_id),
            },
        )
        .await?;

        tx.commit().await?;

        Ok(MovementOutcome {
            movement_id,
            previous_quantity: medication.quantity,
            new_quantity,
        })
    }

    /// Read the medication row under a row lock, scoped to the tenant.
    /// The lock is held until the enclosing transaction commits, so the
    /// quantity read here stays valid for the conditional write.
    async fn lock_medication(
        tx: &mut Transaction<'_, Postgres>,
        pharmacy_id: Uuid,
        medication_id: Uuid,
    ) -> AppResult<LockedMedication> {
        sqlx::query_as::<_, LockedMedication>(
            r#"
            SELECT id, quantity, batch_number
            FROM medications
            WHERE id = $1 AND pharmacy_id = $2
            FOR UPDATE
            "#,
        )
        .bind(medication_id)
        .bind(pharmacy_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Medication".to_string()))
    }

    /// Write the new on-hand quantity for a locked medication row
    async fn update_quantity(
        tx: &mut Transaction<'_, Postgres>,
        medication_id: Uuid,
        new_quantity: i32,
    ) -> AppResult<()> {
        sqlx::query("UPDATE medications SET quantity = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_quantity)
            .bind(medication_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Append one movement record inside the enclosing transaction
    async fn insert_movement(
        tx: &mut Transaction<'_, Postgres>,
        movement: NewMovement,
    ) -> AppResult<Uuid> {
        let movement_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO stock_movements (
                pharmacy_id, medication_id, kind, quantity, previous_quantity, new_quantity,
                unit_price, total_amount, reference_id, batch_number, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(movement.pharmacy_id)
        .bind(movement.medication_id)
        .bind(movement.kind)
        .bind(movement.quantity)
        .bind(movement.previous_quantity)
        .bind(movement.new_quantity)
        .bind(movement.unit_price)
        .bind(movement.total_amount)
        .bind(movement.reference_id)
        .bind(&movement.batch_number)
        .bind(&movement.notes)
        .bind(movement.created_by)
        .fetch_one(&mut **tx)
        .await?;

        Ok(movement_id)
    }

    /// List movements for a pharmacy, newest first, with optional filters
    pub async fn list_movements(
        &self,
        pharmacy_id: Uuid,
        filter: MovementFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<StockMovement>> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM stock_movements
            WHERE pharmacy_id = $1
              AND ($2::uuid IS NULL OR medication_id = $2)
              AND ($3::movement_kind IS NULL OR kind = $3)
              AND ($4::date IS NULL OR created_at::date >= $4)
              AND ($5::date IS NULL OR created_at::date <= $5)
            "#,
        )
        .bind(pharmacy_id)
        .bind(filter.medication_id)
        .bind(filter.kind)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, pharmacy_id, medication_id, kind, quantity, previous_quantity,
                   new_quantity, unit_price, total_amount, reference_id, batch_number,
                   notes, created_at, created_by
            FROM stock_movements
            WHERE pharmacy_id = $1
              AND ($2::uuid IS NULL OR medication_id = $2)
              AND ($3::movement_kind IS NULL OR kind = $3)
              AND ($4::date IS NULL OR created_at::date >= $4)
              AND ($5::date IS NULL OR created_at::date <= $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(pharmacy_id)
        .bind(filter.medication_id)
        .bind(filter.kind)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: movements,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Full movement history for one medication, newest first
    pub async fn get_movements_for_medication(
        &self,
        pharmacy_id: Uuid,
        medication_id: Uuid,
    ) -> AppResult<Vec<StockMovement>> {
        // Validate the medication belongs to the pharmacy
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM medications WHERE id = $1 AND pharmacy_id = $2)",
        )
        .bind(medication_id)
        .bind(pharmacy_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Medication".to_string()));
        }

        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, pharmacy_id, medication_id, kind, quantity, previous_quantity,
                   new_quantity, unit_price, total_amount, reference_id, batch_number,
                   notes, created_at, created_by
            FROM stock_movements
            WHERE medication_id = $1 AND pharmacy_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(medication_id)
        .bind(pharmacy_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }
}

/// Serialization failures (40001) and deadlocks (40P01) are the only error
/// classes eligible for automatic retry.
fn is_serialization_failure(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
        }
        _ => false,
    }
}

fn conflict_exhausted() -> AppError {
    AppError::Conflict(
        "Stock movement could not be serialized against concurrent activity".to_string(),
    )
}
