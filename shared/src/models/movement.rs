//! Stock movement models: the append-only quantity-change log

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of stock movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "movement_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Sale,
    Purchase,
    Adjustment,
    Expired,
    Damaged,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Sale => "sale",
            MovementKind::Purchase => "purchase",
            MovementKind::Adjustment => "adjustment",
            MovementKind::Expired => "expired",
            MovementKind::Damaged => "damaged",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(MovementKind::Sale),
            "purchase" => Some(MovementKind::Purchase),
            "adjustment" => Some(MovementKind::Adjustment),
            "expired" => Some(MovementKind::Expired),
            "damaged" => Some(MovementKind::Damaged),
            _ => None,
        }
    }

    /// Whether this kind adds stock. Purchases are the only inbound kind;
    /// adjustments have no positive path.
    pub fn is_inbound(&self) -> bool {
        matches!(self, MovementKind::Purchase)
    }

    /// Signed ledger delta for a movement of this kind with the given
    /// (unsigned) magnitude.
    pub fn signed_delta(&self, quantity: i32) -> i32 {
        if self.is_inbound() {
            quantity
        } else {
            -quantity
        }
    }
}

/// Stock-decreasing write-off kinds accepted by the adjustment operation.
/// A separate enum so callers cannot route sales or purchases through the
/// adjustment path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Adjustment,
    Expired,
    Damaged,
}

impl AdjustmentKind {
    pub fn movement_kind(&self) -> MovementKind {
        match self {
            AdjustmentKind::Adjustment => MovementKind::Adjustment,
            AdjustmentKind::Expired => MovementKind::Expired,
            AdjustmentKind::Damaged => MovementKind::Damaged,
        }
    }
}

/// One immutable quantity-changing event against a medication.
///
/// `quantity` is the signed delta; `new_quantity = previous_quantity + quantity`
/// holds for every record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub pharmacy_id: Uuid,
    pub medication_id: Uuid,
    pub kind: MovementKind,
    pub quantity: i32,
    pub previous_quantity: i32,
    pub new_quantity: i32,
    pub unit_price: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    /// Originating sale/purchase/adjustment record, if any
    pub reference_id: Option<Uuid>,
    /// Batch number snapshot at the moment of the movement
    pub batch_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}
