//! Catalog writes and reads for the back-office.
//!
//! Every insert and update goes through a normalized
//! [`ProductWrite`](maison_core::product::ProductWrite), so the promotional
//! invariants hold on any row this repository touches. The slug is written
//! once at creation and never updated afterwards.

use sqlx::PgPool;

use maison_core::ProductId;
use maison_core::drops::DropExpiry;
use maison_core::product::{Product, ProductWrite};

use super::RepositoryError;

const PRODUCT_COLUMNS: &str = "id, name, slug, description, price, on_sale, sale_price, stock, \
     in_stock, category, subcategory, images, is_bestseller, is_new_arrival, is_drop, \
     release_date, early_access_price, gender, style, created_at";

/// Repository for catalog management.
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

    /// Insert a new product. `write` must already be normalized; `slug` is
    /// assigned here, once.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the insert fails.
    pub async fn create(
        &self,
        write: &ProductWrite,
        slug: &str,
    ) -> Result<Product, RepositoryError> {
        let query = format!(
            "INSERT INTO products (name, slug, description, price, on_sale, sale_price, stock, \
             in_stock, category, subcategory, images, is_bestseller, is_new_arrival, is_drop, \
             release_date, early_access_price, gender, style) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(&write.name)
            .bind(slug)
            .bind(&write.description)
            .bind(write.price)
            .bind(write.on_sale)
            .bind(write.sale_price)
            .bind(write.stock)
            .bind(write.in_stock())
            .bind(&write.category)
            .bind(&write.subcategory)
            .bind(&write.images)
            .bind(write.is_bestseller)
            .bind(write.is_new_arrival)
            .bind(write.is_drop)
            .bind(write.release_date)
            .bind(write.early_access_price)
            .bind(&write.gender)
            .bind(&write.style)
            .fetch_one(self.pool)
            .await?)
    }

    /// Overwrite a product's editable fields. The slug and creation time
    /// are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        write: &ProductWrite,
    ) -> Result<Option<Product>, RepositoryError> {
        let query = format!(
            "UPDATE products SET name = $2, description = $3, price = $4, on_sale = $5, \
             sale_price = $6, stock = $7, in_stock = $8, category = $9, subcategory = $10, \
             images = $11, is_bestseller = $12, is_new_arrival = $13, is_drop = $14, \
             release_date = $15, early_access_price = $16, gender = $17, style = $18 \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&write.name)
            .bind(&write.description)
            .bind(write.price)
            .bind(write.on_sale)
            .bind(write.sale_price)
            .bind(write.stock)
            .bind(write.in_stock())
            .bind(&write.category)
            .bind(&write.subcategory)
            .bind(&write.images)
            .bind(write.is_bestseller)
            .bind(write.is_new_arrival)
            .bind(write.is_drop)
            .bind(write.release_date)
            .bind(write.early_access_price)
            .bind(&write.gender)
            .bind(&write.style)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Delete a product. Irreversible; order lines keep their snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace a product's image list.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the update fails.
    pub async fn update_images(
        &self,
        id: ProductId,
        images: &[String],
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE products SET images = $2 WHERE id = $1")
            .bind(id)
            .bind(images)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Apply one planned drop expiry: clear the drop flags and the
    /// new-arrival badge in a single statement.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the update fails.
    pub async fn expire_drop(&self, expiry: &DropExpiry) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE products SET is_drop = FALSE, release_date = NULL, \
             early_access_price = NULL, is_new_arrival = FALSE \
             WHERE id = $1",
        )
        .bind(expiry.product_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
