//! Order writes for checkout.
//!
//! The storefront only ever records orders; reading them back (status
//! updates, customer rollups) is the back-office's territory. Status enums
//! are stored as their lowercase text forms.

use sqlx::PgPool;

use maison_core::{OrderId, ProductId};

use super::RepositoryError;
use crate::checkout::{CheckoutStore, NewOrder, NewOrderItem};

/// Repository for order writes.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl CheckoutStore for OrderRepository<'_> {
    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (customer_name, customer_email, customer_phone, \
             shipping_address, shipping_city, shipping_state, order_notes, total_amount, \
             payment_reference, payment_status, order_status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING id",
        )
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(&order.customer_phone)
        .bind(&order.shipping_address)
        .bind(&order.shipping_city)
        .bind(&order.shipping_state)
        .bind(&order.order_notes)
        .bind(order.total_amount)
        .bind(&order.payment_reference)
        .bind(order.payment_status.as_str())
        .bind(order.order_status.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(OrderId::new(id))
    }

    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), RepositoryError> {
        // One statement per line; orders are a handful of lines at most.
        for item in items {
            sqlx::query(
                "INSERT INTO order_items \
                 (order_id, product_id, product_name, quantity, price_at_purchase) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(item.order_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(i64::from(item.quantity))
            .bind(item.price_at_purchase)
            .execute(self.pool)
            .await?;
        }
        Ok(())
    }

    async fn stock_of(&self, product_id: ProductId) -> Result<Option<i32>, RepositoryError> {
        Ok(
            sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
                .bind(product_id)
                .fetch_optional(self.pool)
                .await?,
        )
    }

    async fn set_stock(
        &self,
        product_id: ProductId,
        stock: i32,
        in_stock: bool,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE products SET stock = $2, in_stock = $3 WHERE id = $1")
            .bind(product_id)
            .bind(stock)
            .bind(in_stock)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
