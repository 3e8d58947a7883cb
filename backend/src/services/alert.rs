//! Stock alert service
//!
//! Read-only alert views derived from the ledger. All three sets come from
//! one snapshot read so their counts are mutually consistent within a
//! response.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Medication;
use shared::validation::{expiry_status, is_low_stock, ExpiryStatus};

use crate::error::AppResult;

/// Alert service for low-stock and expiry monitoring
#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
}

/// The three alert sets, computed from a single ledger snapshot
#[derive(Debug, Clone, Serialize)]
pub struct StockAlerts {
    /// quantity <= low_stock_threshold
    pub low_stock: Vec<Medication>,
    /// today <= expiry_date <= today + window, sorted by expiry ascending
    pub expiring_soon: Vec<Medication>,
    /// expiry_date < today
    pub expired: Vec<Medication>,
}

impl AlertService {
    /// Create a new AlertService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Compute the alert sets for a pharmacy. A medication can appear in
    /// both the low-stock set and one of the expiry sets.
    pub async fn get_alerts(
        &self,
        pharmacy_id: Uuid,
        expiring_window_days: i64,
    ) -> AppResult<StockAlerts> {
        let medications = sqlx::query_as::<_, Medication>(
            r#"
            SELECT id, pharmacy_id, name, category, unit, quantity, unit_price,
                   expiry_date, batch_number, supplier, low_stock_threshold, description,
                   created_at, updated_at
            FROM medications
            WHERE pharmacy_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(pharmacy_id)
        .fetch_all(&self.db)
        .await?;

        let today = Utc::now().date_naive();

        let mut alerts = StockAlerts {
            low_stock: Vec::new(),
            expiring_soon: Vec::new(),
            expired: Vec::new(),
        };

        for medication in medications {
            if is_low_stock(medication.quantity, medication.low_stock_threshold) {
                alerts.low_stock.push(medication.clone());
            }
            match expiry_status(medication.expiry_date, today, expiring_window_days) {
                ExpiryStatus::ExpiringSoon => alerts.expiring_soon.push(medication),
                ExpiryStatus::Expired => alerts.expired.push(medication),
                ExpiryStatus::Ok => {}
            }
        }

        alerts.expiring_soon.sort_by_key(|m| m.expiry_date);

        Ok(alerts)
    }
}
