//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                           - Liveness check
//! GET  /health/ready                     - Readiness check (database ping)
//!
//! # Products
//! GET  /api/products                     - Product listing (?category=)
//! GET  /api/products/{slug}              - Product detail with resolved pricing
//!
//! # Drops
//! GET  /api/drops                        - Active drops, soonest release first
//! GET  /api/drops/{slug}/countdown       - Per-second countdown (SSE)
//!
//! # Cart (per-session, cookie-bound)
//! GET    /api/cart                       - Cart contents with totals
//! POST   /api/cart/items                 - Add a product (merges quantity)
//! POST   /api/cart/items/{id}/quantity   - Adjust quantity by a delta
//! DELETE /api/cart/items/{id}            - Remove a line
//! DELETE /api/cart                       - Empty the cart
//!
//! # Checkout
//! POST /api/checkout/session             - Widget config for the cart total
//! POST /api/checkout/complete            - Verify charge, place the order
//! ```

pub mod cart;
pub mod checkout;
pub mod drops;
pub mod products;

use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::response::Response;
use axum::routing::{delete, get, post};

use crate::state::AppState;

/// Name of the session cookie that binds a browser to its cart.
pub const SESSION_COOKIE: &str = "maison_session";

/// Build the storefront API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::list))
        .route("/api/products/{slug}", get(products::detail))
        .route("/api/drops", get(drops::list))
        .route("/api/drops/{slug}/countdown", get(drops::countdown))
        .route("/api/cart", get(cart::show).delete(cart::clear))
        .route("/api/cart/items", post(cart::add_item))
        .route(
            "/api/cart/items/{id}/quantity",
            post(cart::update_quantity),
        )
        .route("/api/cart/items/{id}", delete(cart::remove_item))
        .route("/api/checkout/session", post(checkout::session))
        .route("/api/checkout/complete", post(checkout::complete))
}

/// The caller's cart session, read from the session cookie or freshly
/// minted when absent. New sessions are stamped back onto the response via
/// [`CartSession::attach`].
pub struct CartSession {
    pub id: String,
    is_new: bool,
}

impl CartSession {
    /// Set the session cookie on the response when the session is new.
    pub fn attach(&self, mut response: Response) -> Response {
        if self.is_new && let Ok(value) =
            format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id).parse()
        {
            response.headers_mut().append(SET_COOKIE, value);
        }
        response
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CartSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let existing = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, id)| id.to_owned());

        Ok(existing.map_or_else(
            || Self {
                id: uuid::Uuid::new_v4().to_string(),
                is_new: true,
            },
            |id| Self { id, is_new: false },
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;

    use super::*;

    async fn session_for(request: Request<Body>) -> CartSession {
        let (mut parts, _) = request.into_parts();
        CartSession::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_existing_cookie_is_reused() {
        let request = Request::builder()
            .header(COOKIE, "other=1; maison_session=abc-123")
            .body(Body::empty())
            .unwrap();

        let session = session_for(request).await;
        assert_eq!(session.id, "abc-123");
        assert!(!session.is_new);
    }

    #[tokio::test]
    async fn test_missing_cookie_mints_a_session() {
        let request = Request::builder().body(Body::empty()).unwrap();

        let session = session_for(request).await;
        assert!(session.is_new);
        assert!(uuid::Uuid::parse_str(&session.id).is_ok());
    }

    #[tokio::test]
    async fn test_new_session_sets_cookie_on_response() {
        let request = Request::builder().body(Body::empty()).unwrap();
        let session = session_for(request).await;

        let response = session.attach(Response::new(axum::body::Body::empty()));
        let cookie = response.headers().get(SET_COOKIE).unwrap();
        assert!(cookie.to_str().unwrap().starts_with("maison_session="));
    }
}
