//! Catalog reads for the storefront.
//!
//! The storefront never mutates products (checkout's stock decrement goes
//! through [`super::orders`]); everything here is a read. Expired-drop
//! hiding is the resolver's job, not a query concern — the one exception is
//! [`ProductRepository::active_drops`], whose `release_date > now` filter is
//! the same predicate the resolver applies.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use maison_core::ProductId;
use maison_core::product::Product;

use super::RepositoryError;

const PRODUCT_COLUMNS: &str = "id, name, slug, description, price, on_sale, sale_price, stock, \
     in_stock, category, subcategory, images, is_bestseller, is_new_arrival, is_drop, \
     release_date, early_access_price, gender, style, created_at";

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Product>(&query)
            .fetch_all(self.pool)
            .await?)
    }

    /// Products in a category, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, RepositoryError> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category = $1 ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(category)
            .fetch_all(self.pool)
            .await?)
    }

    /// Look up a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1");
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Drops still ahead of their release time, soonest release first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn active_drops(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_drop AND release_date IS NOT NULL AND release_date > $1 \
             ORDER BY release_date ASC"
        );
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(now)
            .fetch_all(self.pool)
            .await?)
    }
}
