//! Checkout session and completion handlers.
//!
//! The flow mirrors the inline-widget gateway model: the client asks for a
//! widget configuration priced from its cart, collects payment through the
//! gateway, then posts the transaction reference back here. Completion
//! verifies the charge server-side before any order is recorded.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use maison_core::cart::Cart;
use maison_core::{Email, OrderId};

use crate::checkout::{self, CheckoutForm};
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::routes::CartSession;
use crate::services::paystack::{PaystackClient, WidgetConfig};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SessionRequest {
    pub email: String,
}

/// `POST /api/checkout/session` — mint a reference and shape the widget
/// configuration for the cart's current total.
pub async fn session(
    State(state): State<AppState>,
    session: CartSession,
    Json(request): Json<SessionRequest>,
) -> Result<Response> {
    let email = Email::parse(&request.email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let cart = Cart::open(state.carts().storage_for(&session.id))
        .map_err(|error| AppError::Internal(format!("cart storage failure: {error}")))?;
    if cart.lines().is_empty() {
        return Err(AppError::BadRequest("Your cart is empty.".to_owned()));
    }

    let reference = PaystackClient::new_reference();
    let widget: WidgetConfig = state
        .paystack()
        .widget_config(cart.total(), &email, &reference)?;

    Ok(session.attach(Json(widget).into_response()))
}

#[derive(Deserialize)]
pub struct CompleteRequest {
    pub reference: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub order_notes: Option<String>,
}

#[derive(Serialize)]
pub struct CompleteResponse {
    pub order_id: OrderId,
    pub reference: String,
    /// Where the client should navigate to show the confirmation.
    pub redirect: String,
}

/// `POST /api/checkout/complete` — verify the charge, then run the
/// placement sequence.
pub async fn complete(
    State(state): State<AppState>,
    session: CartSession,
    Json(request): Json<CompleteRequest>,
) -> Result<Response> {
    let email = Email::parse(&request.email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    // Never trust the client's word that it paid.
    let verified = state.paystack().verify(&request.reference).await?;

    let form = CheckoutForm {
        first_name: request.first_name,
        last_name: request.last_name,
        email,
        phone: request.phone,
        address: request.address,
        city: request.city,
        state: request.state,
        order_notes: request.order_notes.filter(|n| !n.trim().is_empty()),
    };

    let mut cart = Cart::open(state.carts().storage_for(&session.id))
        .map_err(|error| AppError::Internal(format!("cart storage failure: {error}")))?;

    let store = OrderRepository::new(state.pool());
    let placed = checkout::place_order(
        &store,
        state.mailer(),
        &mut cart,
        &form,
        &verified.reference,
    )
    .await?;

    tracing::info!(
        order_id = %placed.order_id,
        reference = %placed.reference,
        includes_drop = placed.includes_drop,
        "order placed"
    );

    let redirect = format!(
        "/order-confirmed?ref={}&drop={}",
        placed.reference, placed.includes_drop
    );
    let body = CompleteResponse {
        order_id: placed.order_id,
        reference: placed.reference,
        redirect,
    };
    Ok(session.attach(Json(body).into_response()))
}
