//! Session cart handlers.
//!
//! The cart stores price snapshots taken at add time. The server is the
//! single writer: every handler rehydrates the session's cart, applies one
//! mutation, and persists the full line set back to the vault.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use maison_core::cart::{Cart, CartError, CartLine};
use maison_core::promotion::{self, PromotionMode};
use maison_core::{Price, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::routes::CartSession;
use crate::services::SessionCartStorage;
use crate::state::AppState;

/// The cart as handed to the client.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub count: u32,
    pub total: Price,
    pub has_drop_item: bool,
}

impl CartView {
    fn from_cart(cart: &Cart<SessionCartStorage>) -> Self {
        Self {
            lines: cart.lines().to_vec(),
            count: cart.count(),
            total: cart.total(),
            has_drop_item: cart.has_drop_item(),
        }
    }
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct QuantityRequest {
    /// Signed adjustment; the resulting quantity floors at one.
    pub delta: i64,
}

fn open_cart(state: &AppState, session: &CartSession) -> Result<Cart<SessionCartStorage>> {
    Cart::open(state.carts().storage_for(&session.id))
        .map_err(|error| AppError::Internal(format!("cart storage failure: {error}")))
}

fn into_app_error(error: CartError) -> AppError {
    AppError::Internal(format!("cart storage failure: {error}"))
}

fn respond(session: &CartSession, cart: &Cart<SessionCartStorage>) -> Response {
    session.attach(Json(CartView::from_cart(cart)).into_response())
}

/// `GET /api/cart`
pub async fn show(State(state): State<AppState>, session: CartSession) -> Result<Response> {
    let cart = open_cart(&state, &session)?;
    Ok(respond(&session, &cart))
}

/// `POST /api/cart/items` — snapshot the product at today's resolved price
/// and merge it into the cart.
pub async fn add_item(
    State(state): State<AppState>,
    session: CartSession,
    Json(request): Json<AddItemRequest>,
) -> Result<Response> {
    if request.quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_owned()));
    }

    let product = ProductRepository::new(state.pool())
        .by_id(request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no product {}", request.product_id)))?;

    let now = Utc::now();
    if !promotion::is_purchasable(&product, now) {
        return Err(AppError::BadRequest(format!(
            "{} is out of stock",
            product.name
        )));
    }

    let resolved = promotion::resolve(&product, now);
    let drop_active = resolved.mode == PromotionMode::DropActive;
    let line = CartLine {
        product_id: product.id,
        name: product.name.clone(),
        price: resolved.effective_price,
        original_price: resolved.original_price,
        image: product.images.first().cloned().unwrap_or_default(),
        quantity: request.quantity,
        category: product.category.clone(),
        is_drop: drop_active,
        release_date: drop_active.then_some(product.release_date).flatten(),
    };

    let mut cart = open_cart(&state, &session)?;
    cart.add(line).map_err(into_app_error)?;
    Ok(respond(&session, &cart))
}

/// `POST /api/cart/items/{id}/quantity`
pub async fn update_quantity(
    State(state): State<AppState>,
    session: CartSession,
    Path(id): Path<ProductId>,
    Json(request): Json<QuantityRequest>,
) -> Result<Response> {
    let mut cart = open_cart(&state, &session)?;
    cart.update_quantity(id, request.delta).map_err(into_app_error)?;
    Ok(respond(&session, &cart))
}

/// `DELETE /api/cart/items/{id}` — drop the whole line regardless of
/// quantity; unknown ids are a no-op.
pub async fn remove_item(
    State(state): State<AppState>,
    session: CartSession,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let mut cart = open_cart(&state, &session)?;
    cart.remove(id).map_err(into_app_error)?;
    Ok(respond(&session, &cart))
}

/// `DELETE /api/cart`
pub async fn clear(State(state): State<AppState>, session: CartSession) -> Result<Response> {
    let mut cart = open_cart(&state, &session)?;
    cart.clear().map_err(into_app_error)?;
    Ok(respond(&session, &cart))
}
