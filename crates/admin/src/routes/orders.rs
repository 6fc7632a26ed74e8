//! Order fulfillment handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use maison_core::{OrderId, OrderStatus};

use crate::db::{Order, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// `GET /api/orders` — every order, newest first, lines included.
pub async fn list(State(state): State<AppState>, _auth: RequireAdminAuth) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderRepository::new(state.pool()).list().await?))
}

#[derive(Serialize, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// `PUT /api/orders/{id}/status` — set fulfillment status.
///
/// Processing → shipped → delivered is the expected progression, but any
/// status is accepted; the progression is advisory.
pub async fn set_status(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<OrderId>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<StatusRequest>> {
    let updated = OrderRepository::new(state.pool())
        .set_status(id, request.status)
        .await?;
    if !updated {
        return Err(AppError::NotFound(format!("no order {id}")));
    }

    tracing::info!(order_id = %id, status = %request.status, "order status updated");
    Ok(Json(request))
}
