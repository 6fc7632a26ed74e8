//! Authentication extractor for admin routes.
//!
//! The back-office runs behind a single opaque token configured in the
//! environment. Requests present it either as a bearer header or as the
//! `maison_admin_token` cookie; anything else is a 401. There are no user
//! accounts or roles.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;

use crate::state::AppState;

/// Name of the cookie the admin frontend stores the token in.
pub const ADMIN_TOKEN_COOKIE: &str = "maison_admin_token";

/// Extractor that requires the admin token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_auth: RequireAdminAuth) -> impl IntoResponse {
///     "hello, back office"
/// }
/// ```
pub struct RequireAdminAuth;

/// Rejection for requests without a valid token.
pub struct AdminAuthRejection;

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or(AdminAuthRejection)?;

        if presented == state.config().api_token.expose_secret() {
            Ok(Self)
        } else {
            Err(AdminAuthRejection)
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ADMIN_TOKEN_COOKIE)
        .map(|(_, token)| token.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;

    use super::*;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_is_extracted() {
        let parts = parts_with(&[("authorization", "Bearer tok-123")]);
        assert_eq!(bearer_token(&parts).as_deref(), Some("tok-123"));
    }

    #[test]
    fn test_cookie_token_is_extracted() {
        let parts = parts_with(&[("cookie", "theme=dark; maison_admin_token=tok-456")]);
        assert_eq!(cookie_token(&parts).as_deref(), Some("tok-456"));
    }

    #[test]
    fn test_absent_credentials_yield_nothing() {
        let parts = parts_with(&[]);
        assert_eq!(bearer_token(&parts), None);
        assert_eq!(cookie_token(&parts), None);
    }
}
