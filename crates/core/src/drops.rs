//! Drop expiry reconciliation planner.
//!
//! Brings stored drop flags back in line with what wall-clock time already
//! implies. The planner is pure; when and how often it runs is the calling
//! layer's policy (the back-office runs it on every inventory list load).
//! Readers never wait for it: the resolver in [`crate::promotion`] performs
//! the same time check itself, so a stale flag is only ever a storage-level
//! artifact, never a pricing one.
//!
//! Per-item update failures are tolerated by design. The caller issues the
//! planned updates best-effort, then re-reads the full set from the store —
//! the re-read is the source of truth, and a failed item is simply picked up
//! by the next run. No retries, no rollback.

use chrono::{DateTime, Utc};

use crate::product::Product;
use crate::types::ProductId;

/// One planned expiry: clear the drop state of this product.
///
/// The cleared set is `is_drop`, `release_date`, `early_access_price`, and —
/// deliberately — `is_new_arrival`: an expired drop reverts to plain retail
/// and must not resurface flagged as a new arrival. The asymmetry with the
/// other mutual-exclusivity clears is intentional and load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropExpiry {
    pub product_id: ProductId,
}

impl DropExpiry {
    /// Apply the expiry to an in-memory record.
    ///
    /// Mirrors exactly the update the persistence layer issues; in-memory
    /// store fakes use it so tests and production clear the same fields.
    pub fn apply(product: &mut Product) {
        product.is_drop = false;
        product.release_date = None;
        product.early_access_price = None;
        product.is_new_arrival = false;
    }
}

/// Plan the expiries for every drop whose release time has passed.
///
/// Only drops with a release date at or before `now` expire. A drop with no
/// release date at all is malformed (the write path forbids it) and is left
/// untouched here; the resolver already refuses to treat it as active.
#[must_use]
pub fn plan(products: &[Product], now: DateTime<Utc>) -> Vec<DropExpiry> {
    products
        .iter()
        .filter(|p| p.is_drop && p.release_date.is_some_and(|release| release <= now))
        .map(|p| DropExpiry { product_id: p.id })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::types::Price;

    fn drop_product(id: i64, release_offset: Duration, now: DateTime<Utc>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Drop {id}"),
            slug: format!("drop-{id}"),
            description: String::new(),
            price: Price::from_naira(1_000_000),
            on_sale: false,
            sale_price: None,
            stock: 0,
            in_stock: false,
            category: "Drops".to_owned(),
            subcategory: String::new(),
            images: Vec::new(),
            is_bestseller: false,
            is_new_arrival: false,
            is_drop: true,
            release_date: Some(now + release_offset),
            early_access_price: Some(Price::from_naira(750_000)),
            gender: "Unisex".to_owned(),
            style: "Limited".to_owned(),
            created_at: now,
        }
    }

    #[test]
    fn test_partitions_expired_from_active() {
        let now = Utc::now();
        let products = vec![
            drop_product(1, Duration::hours(-2), now),
            drop_product(2, Duration::hours(3), now),
            drop_product(3, Duration::seconds(0), now),
        ];

        let planned = plan(&products, now);
        let ids: Vec<i64> = planned.iter().map(|e| e.product_id.as_i64()).collect();
        // release == now counts as passed
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_non_drops_are_ignored() {
        let now = Utc::now();
        let mut p = drop_product(1, Duration::hours(-2), now);
        p.is_drop = false;
        assert!(plan(&[p], now).is_empty());
    }

    #[test]
    fn test_drop_without_release_date_is_left_alone() {
        let now = Utc::now();
        let mut p = drop_product(1, Duration::hours(5), now);
        p.release_date = None;
        assert!(plan(&[p], now).is_empty());
    }

    #[test]
    fn test_apply_clears_drop_state_and_new_arrival() {
        let now = Utc::now();
        let mut p = drop_product(1, Duration::hours(-1), now);
        p.is_new_arrival = true;

        let planned = plan(std::slice::from_ref(&p), now);
        assert_eq!(planned.len(), 1);
        DropExpiry::apply(&mut p);

        assert!(!p.is_drop);
        assert!(!p.is_new_arrival);
        assert_eq!(p.release_date, None);
        assert_eq!(p.early_access_price, None);
    }

    #[test]
    fn test_reconciliation_is_idempotent() {
        let now = Utc::now();
        let mut products = vec![
            drop_product(1, Duration::hours(-2), now),
            drop_product(2, Duration::hours(3), now),
        ];

        for expiry in plan(&products.clone(), now) {
            let target = products
                .iter_mut()
                .find(|p| p.id == expiry.product_id)
                .unwrap();
            DropExpiry::apply(target);
        }
        let after_first = products.clone();

        // Second pass with the same clock finds nothing left to expire.
        assert!(plan(&products, now).is_empty());
        assert_eq!(products, after_first);
    }
}
