//! Customer read-model.
//!
//! There is no stored customer entity: every order carries its own
//! denormalized contact fields, and the back-office directory is computed by
//! grouping orders on the normalized email. Purely derived, recomputed on
//! every view.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{Email, Price};

/// Spend at or above which a client is surfaced as a VIP (₦1,000,000).
#[must_use]
pub fn vip_threshold() -> Price {
    Price::from_naira(1_000_000)
}

/// The order fields the rollup consumes.
#[derive(Debug, Clone)]
pub struct CustomerOrderRow {
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub total_amount: Price,
    pub placed_at: DateTime<Utc>,
}

/// One row of the client directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    /// Name from the customer's first-seen order.
    pub name: String,
    /// Normalized grouping key.
    pub email: String,
    pub phone: String,
    pub total_spent: Price,
    pub order_count: u32,
    pub last_order_date: DateTime<Utc>,
    pub is_vip: bool,
}

/// Group orders by normalized email into the client directory, sorted by
/// total spend descending.
#[must_use]
pub fn summarize(orders: &[CustomerOrderRow]) -> Vec<CustomerSummary> {
    let mut by_email: Vec<CustomerSummary> = Vec::new();

    for order in orders {
        let key = order.customer_email.normalized();
        match by_email.iter_mut().find(|c| c.email == key) {
            Some(customer) => {
                customer.total_spent += order.total_amount;
                customer.order_count += 1;
                if order.placed_at > customer.last_order_date {
                    customer.last_order_date = order.placed_at;
                }
            }
            None => by_email.push(CustomerSummary {
                name: order.customer_name.clone(),
                email: key,
                phone: order.customer_phone.clone(),
                total_spent: order.total_amount,
                order_count: 1,
                last_order_date: order.placed_at,
                is_vip: false,
            }),
        }
    }

    for customer in &mut by_email {
        customer.is_vip = customer.total_spent >= vip_threshold();
    }

    by_email.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
    by_email
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn row(email: &str, name: &str, naira: u64, offset_days: i64) -> CustomerOrderRow {
        CustomerOrderRow {
            customer_name: name.to_owned(),
            customer_email: Email::parse(email).unwrap(),
            customer_phone: "+234 800 000 0000".to_owned(),
            total_amount: Price::from_naira(naira),
            placed_at: Utc::now() + Duration::days(offset_days),
        }
    }

    #[test]
    fn test_groups_on_normalized_email() {
        let orders = vec![
            row("Ada@Example.com", "Ada Obi", 200_000, 0),
            row("ada@example.com", "A. Obi", 300_000, 1),
        ];

        let customers = summarize(&orders);
        assert_eq!(customers.len(), 1);
        let ada = &customers[0];
        assert_eq!(ada.email, "ada@example.com");
        assert_eq!(ada.name, "Ada Obi"); // first-seen name wins
        assert_eq!(ada.order_count, 2);
        assert_eq!(ada.total_spent, Price::from_naira(500_000));
    }

    #[test]
    fn test_tracks_latest_order_date_out_of_order() {
        let orders = vec![
            row("ada@example.com", "Ada", 1, 5),
            row("ada@example.com", "Ada", 1, 2),
        ];
        let customers = summarize(&orders);
        assert_eq!(customers[0].last_order_date, orders[0].placed_at);
    }

    #[test]
    fn test_sorted_by_spend_and_vip_flag() {
        let orders = vec![
            row("small@example.com", "Small", 50_000, 0),
            row("vip@example.com", "Vip", 1_000_000, 0),
            row("mid@example.com", "Mid", 400_000, 0),
        ];

        let customers = summarize(&orders);
        let emails: Vec<&str> = customers.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(
            emails,
            vec!["vip@example.com", "mid@example.com", "small@example.com"]
        );
        assert!(customers[0].is_vip);
        assert!(!customers[1].is_vip);
    }

    #[test]
    fn test_empty_orders_empty_directory() {
        assert!(summarize(&[]).is_empty());
    }
}
