//! HTTP handlers for stock alert endpoints

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::alert::{AlertService, StockAlerts};
use crate::AppState;

/// Get the low-stock, expiring-soon and expired alert sets
pub async fn get_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<StockAlerts>> {
    let window_days = state.config.alerts.expiring_soon_days;
    let service = AlertService::new(state.db);
    let alerts = service
        .get_alerts(current_user.0.pharmacy_id, window_days)
        .await?;
    Ok(Json(alerts))
}
