//! HTTP route handlers for the back-office.
//!
//! Every route requires the admin token (see [`crate::middleware::auth`]).
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                - Liveness check
//!
//! # Inventory
//! GET    /api/inventory                       - List (sweeps expired drops first)
//! POST   /api/inventory                       - Create product
//! PUT    /api/inventory/{id}                  - Update product (slug untouched)
//! DELETE /api/inventory/{id}                  - Delete product (irreversible)
//! DELETE /api/inventory/{id}/images/{index}   - Remove one gallery image
//! POST   /api/inventory/background-removal    - Strip an image's background
//!
//! # Orders
//! GET /api/orders                             - List newest-first with items
//! PUT /api/orders/{id}/status                 - Set fulfillment status
//!
//! # Customers & dashboard
//! GET /api/customers                          - Rollup derived from orders
//! GET /api/dashboard                          - Revenue and count totals
//! ```

pub mod customers;
pub mod dashboard;
pub mod inventory;
pub mod orders;

use axum::Router;
use axum::routing::{delete, get, post, put};

use crate::state::AppState;

/// Build the back-office API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/inventory",
            get(inventory::list).post(inventory::create),
        )
        .route(
            "/api/inventory/{id}",
            put(inventory::update).delete(inventory::delete),
        )
        .route(
            "/api/inventory/{id}/images/{index}",
            delete(inventory::remove_image),
        )
        .route(
            "/api/inventory/background-removal",
            post(inventory::remove_background),
        )
        .route("/api/orders", get(orders::list))
        .route("/api/orders/{id}/status", put(orders::set_status))
        .route("/api/customers", get(customers::list))
        .route("/api/dashboard", get(dashboard::stats))
}
