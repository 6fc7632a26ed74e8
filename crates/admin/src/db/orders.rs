//! Order reads, status updates, and the rows behind the customer rollup
//! and dashboard totals.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use maison_core::customers::CustomerOrderRow;
use maison_core::{Email, OrderId, OrderItemId, OrderStatus, PaymentStatus, Price, ProductId};

use super::RepositoryError;

/// An order as the back-office sees it.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub order_notes: Option<String>,
    pub total_amount: Price,
    pub payment_reference: String,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// One line within an order, snapshotted at purchase time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub price_at_purchase: Price,
}

#[derive(sqlx::FromRow)]
struct OrderRecord {
    id: OrderId,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    shipping_address: String,
    shipping_city: String,
    shipping_state: String,
    order_notes: Option<String>,
    total_amount: Price,
    payment_reference: String,
    payment_status: String,
    order_status: String,
    created_at: DateTime<Utc>,
}

impl OrderRecord {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let order_status = self
            .order_status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;
        let payment_status = self
            .payment_status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Order {
            id: self.id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            shipping_address: self.shipping_address,
            shipping_city: self.shipping_city,
            shipping_state: self.shipping_state,
            order_notes: self.order_notes,
            total_amount: self.total_amount,
            payment_reference: self.payment_reference,
            payment_status,
            order_status,
            created_at: self.created_at,
            items,
        })
    }
}

/// Dashboard totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_revenue: Price,
    pub total_orders: i64,
    pub processing_orders: i64,
    pub out_of_stock_products: i64,
}

/// Repository for back-office order access.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All orders, newest first, with their lines attached.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] on query failure and
    /// [`RepositoryError::DataCorruption`] if a stored status does not
    /// parse.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let records = sqlx::query_as::<_, OrderRecord>(
            "SELECT id, customer_name, customer_email, customer_phone, shipping_address, \
             shipping_city, shipping_state, order_notes, total_amount, payment_reference, \
             payment_status, order_status, created_at \
             FROM orders ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        let order_ids: Vec<i64> = records.iter().map(|r| r.id.as_i64()).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, product_name, quantity, price_at_purchase \
             FROM order_items WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: std::collections::HashMap<OrderId, Vec<OrderItem>> =
            std::collections::HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        records
            .into_iter()
            .map(|record| {
                let own = by_order.remove(&record.id).unwrap_or_default();
                record.into_order(own)
            })
            .collect()
    }

    /// Set an order's fulfillment status. Returns `false` for unknown ids.
    ///
    /// Any status can be set; the forward-only progression is advisory and
    /// enforced by the UI, not here.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the update fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE orders SET order_status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The rows the customer rollup aggregates.
    ///
    /// Orders whose stored email no longer parses are skipped with a
    /// warning rather than failing the whole listing.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the query fails.
    pub async fn customer_rows(&self) -> Result<Vec<CustomerOrderRow>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct RawRow {
            customer_name: String,
            customer_email: String,
            customer_phone: String,
            total_amount: Price,
            created_at: DateTime<Utc>,
        }

        let raw = sqlx::query_as::<_, RawRow>(
            "SELECT customer_name, customer_email, customer_phone, total_amount, created_at \
             FROM orders ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(raw
            .into_iter()
            .filter_map(|row| match Email::parse(&row.customer_email) {
                Ok(email) => Some(CustomerOrderRow {
                    customer_name: row.customer_name,
                    customer_email: email,
                    customer_phone: row.customer_phone,
                    total_amount: row.total_amount,
                    placed_at: row.created_at,
                }),
                Err(error) => {
                    tracing::warn!(%error, "skipping order with unparseable customer email");
                    None
                }
            })
            .collect())
    }

    /// Totals for the dashboard page.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if a query fails.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, RepositoryError> {
        let total_revenue: Price =
            sqlx::query_scalar("SELECT COALESCE(SUM(total_amount), 0) FROM orders")
                .fetch_one(self.pool)
                .await?;
        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;
        let processing_orders: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_status = 'processing'")
                .fetch_one(self.pool)
                .await?;
        let out_of_stock_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE NOT in_stock")
                .fetch_one(self.pool)
                .await?;

        Ok(DashboardStats {
            total_revenue,
            total_orders,
            processing_orders,
            out_of_stock_products,
        })
    }
}
