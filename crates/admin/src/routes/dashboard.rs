//! Dashboard totals.

use axum::Json;
use axum::extract::State;

use crate::db::{DashboardStats, OrderRepository};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// `GET /api/dashboard` — revenue, order counts, and out-of-stock count.
pub async fn stats(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
) -> Result<Json<DashboardStats>> {
    Ok(Json(
        OrderRepository::new(state.pool()).dashboard_stats().await?,
    ))
}
