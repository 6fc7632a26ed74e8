//! Catalog listing and detail handlers.
//!
//! Pricing is resolved at request time against the wall clock, so a drop
//! whose release has passed renders as standard (or sale) pricing even if
//! the back-office reconciler has not swept it yet.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maison_core::product::Product;
use maison_core::promotion::{self, PromotionMode};
use maison_core::{Price, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// A product as the storefront presents it: promotion already resolved,
/// raw stock count withheld.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub mode: PromotionMode,
    /// What the buyer pays right now.
    pub price: Price,
    /// Struck-through price; present exactly when `mode` is not standard.
    pub original_price: Option<Price>,
    pub images: Vec<String>,
    pub category: String,
    pub subcategory: String,
    pub gender: String,
    pub style: String,
    pub is_bestseller: bool,
    pub is_new_arrival: bool,
    pub is_drop: bool,
    pub release_date: Option<DateTime<Utc>>,
    pub purchasable: bool,
}

impl ProductView {
    /// Resolve a catalog row into its presented form at `now`.
    #[must_use]
    pub fn resolve(product: &Product, now: DateTime<Utc>) -> Self {
        let resolved = promotion::resolve(product, now);
        let drop_active = resolved.mode == PromotionMode::DropActive;

        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            mode: resolved.mode,
            price: resolved.effective_price,
            original_price: resolved.original_price,
            images: product.images.clone(),
            category: product.category.clone(),
            subcategory: product.subcategory.clone(),
            gender: product.gender.clone(),
            style: product.style.clone(),
            is_bestseller: product.is_bestseller,
            is_new_arrival: product.is_new_arrival,
            is_drop: drop_active,
            release_date: drop_active.then_some(product.release_date).flatten(),
            purchasable: promotion::is_purchasable(product, now),
        }
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

/// `GET /api/products` — the catalog, optionally filtered by category.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let rows = cached_listing(&state, query.category.as_deref()).await?;
    let now = Utc::now();
    Ok(Json(rows.iter().map(|p| ProductView::resolve(p, now)).collect()))
}

/// `GET /api/products/{slug}` — one product with resolved pricing.
pub async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductView>> {
    let product = ProductRepository::new(state.pool())
        .by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no product with slug {slug}")))?;

    Ok(Json(ProductView::resolve(&product, Utc::now())))
}

/// Fetch a listing through the short-lived catalog cache.
async fn cached_listing(
    state: &AppState,
    category: Option<&str>,
) -> Result<Arc<Vec<Product>>> {
    let key = category.unwrap_or_default().to_owned();
    if let Some(cached) = state.catalog_cache().get(&key).await {
        return Ok(cached);
    }

    let repo = ProductRepository::new(state.pool());
    let rows = match category {
        Some(category) => repo.list_by_category(category).await?,
        None => repo.list().await?,
    };
    let rows = Arc::new(rows);
    state.catalog_cache().insert(key, Arc::clone(&rows)).await;
    Ok(rows)
}
