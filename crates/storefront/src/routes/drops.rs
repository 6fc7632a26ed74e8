//! Active drops and the release countdown stream.

use std::convert::Infallible;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::Utc;
use futures::{Stream, StreamExt};

use maison_core::promotion;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::routes::products::ProductView;
use crate::services::countdown::countdown_stream;
use crate::state::AppState;

/// `GET /api/drops` — drops still ahead of release, soonest first.
///
/// Filtered by the pricing resolver's predicate, never by the stored flag
/// alone, so an expired drop disappears from here the moment its release
/// passes.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let now = Utc::now();
    let rows = ProductRepository::new(state.pool()).active_drops(now).await?;
    Ok(Json(rows.iter().map(|p| ProductView::resolve(p, now)).collect()))
}

/// `GET /api/drops/{slug}/countdown` — per-second time-remaining events.
///
/// The stream ends after its first all-zero tick; the client disconnecting
/// cancels it. Requesting a countdown for anything that is not an active
/// drop is a 404.
pub async fn countdown(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let product = ProductRepository::new(state.pool())
        .by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no product with slug {slug}")))?;

    let now = Utc::now();
    if !promotion::drop_is_active(product.release_date, now) || !product.is_drop {
        return Err(AppError::NotFound(format!("{slug} has no active drop")));
    }
    let release = product
        .release_date
        .ok_or_else(|| AppError::Internal("active drop without release date".to_owned()))?;

    let stream = countdown_stream(release).map(|left| {
        // Serializing four integers cannot fail.
        let event = Event::default()
            .json_data(&left)
            .unwrap_or_else(|_| Event::default().data("{}"));
        Ok::<_, Infallible>(event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
