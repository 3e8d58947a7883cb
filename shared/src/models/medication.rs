//! Medication models: the current-state stock ledger

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A medication row. `quantity` is the single source of truth for current
/// stock and is mutated exclusively through the movement service.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Medication {
    pub id: Uuid,
    pub pharmacy_id: Uuid,
    pub name: String,
    pub category: String,
    /// Unit of measure (tablet, bottle, box, ...)
    pub unit: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Expiry date of the latest received batch
    pub expiry_date: NaiveDate,
    /// Batch number of the latest received batch
    pub batch_number: String,
    pub supplier: String,
    pub low_stock_threshold: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
