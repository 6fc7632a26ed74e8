//! The customer read-model.
//!
//! There is no customers table; the rollup is derived from orders on every
//! request and discarded.

use axum::Json;
use axum::extract::State;

use maison_core::customers::{self, CustomerSummary};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// `GET /api/customers` — customers grouped by normalized email, biggest
/// spenders first, VIPs flagged.
pub async fn list(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
) -> Result<Json<Vec<CustomerSummary>>> {
    let rows = OrderRepository::new(state.pool()).customer_rows().await?;
    Ok(Json(customers::summarize(&rows)))
}
