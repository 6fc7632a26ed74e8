//! Inventory management handlers, including the drop lifecycle sweep.
//!
//! Expired drops are reconciled lazily: every inventory listing first plans
//! the sweep with [`maison_core::drops::plan`], applies each expiry
//! best-effort, and then re-reads the table so the response reflects what
//! is actually stored. A failed update is logged and retried implicitly on
//! the next listing; the storefront's pricing resolver keeps buyers
//! correct in the meantime.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};

use maison_core::ProductId;
use maison_core::drops::{self, DropExpiry};
use maison_core::product::{self, Product, ProductWrite};

use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Seam for applying planned expiries, faked in tests.
pub trait ExpiryStore {
    fn expire(
        &self,
        expiry: &DropExpiry,
    ) -> impl Future<Output = std::result::Result<(), RepositoryError>> + Send;
}

impl ExpiryStore for ProductRepository<'_> {
    async fn expire(&self, expiry: &DropExpiry) -> std::result::Result<(), RepositoryError> {
        self.expire_drop(expiry).await
    }
}

/// Apply every planned expiry, skipping individual failures. Returns the
/// number of products the plan touched (applied or not), so callers know
/// whether a re-read is worthwhile.
pub async fn sweep_expired_drops<S: ExpiryStore>(
    store: &S,
    products: &[Product],
    now: DateTime<Utc>,
) -> usize {
    let plan = drops::plan(products, now);
    for expiry in &plan {
        if let Err(error) = store.expire(expiry).await {
            tracing::warn!(
                product_id = %expiry.product_id,
                %error,
                "drop expiry failed, will retry on next listing"
            );
        }
    }
    plan.len()
}

/// `GET /api/inventory` — the full catalog, drops reconciled first.
pub async fn list(State(state): State<AppState>, _auth: RequireAdminAuth) -> Result<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.pool());
    let mut products = repo.list().await?;

    let swept = sweep_expired_drops(&repo, &products, Utc::now()).await;
    if swept > 0 {
        // Authoritative re-read; the response never shows half-applied rows.
        products = repo.list().await?;
    }

    Ok(Json(products))
}

/// `POST /api/inventory` — create a product. The slug is derived from the
/// name here, once; later renames do not change it.
pub async fn create(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Json(write): Json<ProductWrite>,
) -> Result<(StatusCode, Json<Product>)> {
    let write = write.normalize()?;
    let slug = product::slugify(&write.name);
    if slug.is_empty() {
        return Err(AppError::BadRequest(
            "product name must contain at least one alphanumeric character".to_owned(),
        ));
    }

    let created = ProductRepository::new(state.pool()).create(&write, &slug).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/inventory/{id}` — overwrite a product's editable fields.
pub async fn update(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<ProductId>,
    Json(write): Json<ProductWrite>,
) -> Result<Json<Product>> {
    let write = write.normalize()?;
    let updated = ProductRepository::new(state.pool())
        .update(id, &write)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no product {id}")))?;
    Ok(Json(updated))
}

/// `DELETE /api/inventory/{id}` — remove a product permanently.
pub async fn delete(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("no product {id}")))
    }
}

/// `DELETE /api/inventory/{id}/images/{index}` — drop one gallery image by
/// position.
pub async fn remove_image(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path((id, index)): Path<(ProductId, usize)>,
) -> Result<Json<Product>> {
    let repo = ProductRepository::new(state.pool());
    let mut product = repo
        .by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no product {id}")))?;

    if index >= product.images.len() {
        return Err(AppError::BadRequest(format!(
            "image index {index} out of range"
        )));
    }
    product.images.remove(index);
    repo.update_images(id, &product.images).await?;

    Ok(Json(product))
}

/// `POST /api/inventory/background-removal` — run one uploaded image
/// through the removal waterfall and stream back the processed PNG.
pub async fn remove_background(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut image: Option<Vec<u8>> = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("unreadable upload: {e}")))?;
            image = Some(bytes.to_vec());
            break;
        }
    }
    let image = image.ok_or_else(|| {
        AppError::BadRequest("multipart field 'image' is required".to_owned())
    })?;

    let processed = state.background_remover().remove_background(&image).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/png")],
        processed,
    )
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeDelta;

    use maison_core::Price;

    use super::*;

    struct FlakyStore {
        fail_for: Vec<i64>,
        applied: Mutex<Vec<i64>>,
    }

    impl ExpiryStore for FlakyStore {
        async fn expire(&self, expiry: &DropExpiry) -> std::result::Result<(), RepositoryError> {
            if self.fail_for.contains(&expiry.product_id.as_i64()) {
                return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
            }
            self.applied.lock().unwrap().push(expiry.product_id.as_i64());
            Ok(())
        }
    }

    fn drop_product(id: i64, release: DateTime<Utc>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Drop {id}"),
            slug: format!("drop-{id}"),
            description: String::new(),
            price: Price::from_naira(1_000_000),
            on_sale: false,
            sale_price: None,
            stock: 5,
            in_stock: true,
            category: "drops".to_owned(),
            subcategory: String::new(),
            images: vec![],
            is_bestseller: false,
            is_new_arrival: false,
            is_drop: true,
            release_date: Some(release),
            early_access_price: Some(Price::from_naira(750_000)),
            gender: String::new(),
            style: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_sweep_skips_failures_and_applies_the_rest() {
        let now = Utc::now();
        let products = vec![
            drop_product(1, now - TimeDelta::minutes(1)),
            drop_product(2, now - TimeDelta::hours(2)),
            drop_product(3, now + TimeDelta::days(1)),
        ];
        let store = FlakyStore {
            fail_for: vec![1],
            applied: Mutex::new(Vec::new()),
        };

        let swept = sweep_expired_drops(&store, &products, now).await;

        // Both expired drops were planned; the failure did not stop the
        // other from being applied, and the live drop was untouched.
        assert_eq!(swept, 2);
        assert_eq!(*store.applied.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_sweep_with_nothing_expired_is_a_no_op() {
        let now = Utc::now();
        let products = vec![drop_product(1, now + TimeDelta::days(3))];
        let store = FlakyStore {
            fail_for: vec![],
            applied: Mutex::new(Vec::new()),
        };

        assert_eq!(sweep_expired_drops(&store, &products, now).await, 0);
        assert!(store.applied.lock().unwrap().is_empty());
    }
}
