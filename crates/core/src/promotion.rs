//! Promotion state resolution.
//!
//! A product is in exactly one promotional mode at a time, derived from its
//! record and the current wall-clock time. The resolver is the single
//! authority on "what does this piece cost right now" — the storefront, the
//! cart snapshot, and the admin list all go through it.
//!
//! The stored `is_drop` flag is never trusted on its own: a drop whose
//! release time has passed resolves as standard retail even before the
//! reconciler (see [`crate::drops`]) has persisted that fact. Storefront
//! readers and the admin-side reconciler therefore agree on the same
//! "still active" predicate without coordinating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::Price;

/// The mutually exclusive promotional mode of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromotionMode {
    /// A drop before its release time: early-access pricing, pre-orderable.
    DropActive,
    /// Marked down; sale price applies.
    OnSale,
    /// Standard retail.
    Standard,
}

/// The resolver's output: mode plus the price pair to display and charge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolved {
    pub mode: PromotionMode,
    /// What the buyer pays.
    pub effective_price: Price,
    /// The struck-through standard price; `None` iff mode is standard.
    pub original_price: Option<Price>,
}

/// Whether a drop with this release date is still active at `now`.
#[must_use]
pub fn drop_is_active(release_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    release_date.is_some_and(|release| release > now)
}

/// Derive the promotional mode and effective price pair.
///
/// Strict precedence, first match wins:
/// 1. active drop (`is_drop`, release date in the future) — early-access
///    price, falling back to the standard price if the record is missing one
/// 2. on sale with a sale price
/// 3. standard retail
pub fn resolve(product: &Product, now: DateTime<Utc>) -> Resolved {
    if product.is_drop && drop_is_active(product.release_date, now) {
        return Resolved {
            mode: PromotionMode::DropActive,
            effective_price: product.early_access_price.unwrap_or(product.price),
            original_price: Some(product.price),
        };
    }

    if product.on_sale
        && let Some(sale_price) = product.sale_price
    {
        return Resolved {
            mode: PromotionMode::OnSale,
            effective_price: sale_price,
            original_price: Some(product.price),
        };
    }

    Resolved {
        mode: PromotionMode::Standard,
        effective_price: product.price,
        original_price: None,
    }
}

/// Whether the product can be bought right now.
///
/// Stock gates purchase, except that an active drop is pre-orderable
/// regardless of the derived `in_stock` flag. The override is deliberate:
/// drop stock arrives at release time.
#[must_use]
pub fn is_purchasable(product: &Product, now: DateTime<Utc>) -> bool {
    product.stock > 0 || (product.is_drop && drop_is_active(product.release_date, now))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::types::ProductId;

    fn product() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Atelier Coat".to_owned(),
            slug: "atelier-coat".to_owned(),
            description: String::new(),
            price: Price::from_naira(500_000),
            on_sale: false,
            sale_price: None,
            stock: 5,
            in_stock: true,
            category: "Outerwear".to_owned(),
            subcategory: String::new(),
            images: Vec::new(),
            is_bestseller: false,
            is_new_arrival: false,
            is_drop: false,
            release_date: None,
            early_access_price: None,
            gender: "Unisex".to_owned(),
            style: "Classic".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_standard_has_no_original_price() {
        let resolved = resolve(&product(), Utc::now());
        assert_eq!(resolved.mode, PromotionMode::Standard);
        assert_eq!(resolved.effective_price, Price::from_naira(500_000));
        assert_eq!(resolved.original_price, None);
    }

    #[test]
    fn test_sale_price_applies() {
        let p = Product {
            on_sale: true,
            sale_price: Some(Price::from_naira(350_000)),
            ..product()
        };
        let resolved = resolve(&p, Utc::now());
        assert_eq!(resolved.mode, PromotionMode::OnSale);
        assert_eq!(resolved.effective_price, Price::from_naira(350_000));
        assert_eq!(resolved.original_price, Some(Price::from_naira(500_000)));
    }

    #[test]
    fn test_active_drop_wins_over_sale() {
        let now = Utc::now();
        let p = Product {
            price: Price::from_naira(1_000_000),
            is_drop: true,
            release_date: Some(now + Duration::hours(1)),
            early_access_price: Some(Price::from_naira(750_000)),
            on_sale: true,
            sale_price: Some(Price::from_naira(100)),
            ..product()
        };
        let resolved = resolve(&p, now);
        assert_eq!(resolved.mode, PromotionMode::DropActive);
        assert_eq!(resolved.effective_price, Price::from_naira(750_000));
        assert_eq!(resolved.original_price, Some(Price::from_naira(1_000_000)));
    }

    #[test]
    fn test_expired_drop_is_never_active_despite_stale_flag() {
        let now = Utc::now();
        let p = Product {
            price: Price::from_naira(1_000_000),
            is_drop: true,
            release_date: Some(now - Duration::hours(2)),
            early_access_price: Some(Price::from_naira(750_000)),
            ..product()
        };
        let resolved = resolve(&p, now);
        assert_eq!(resolved.mode, PromotionMode::Standard);
        assert_eq!(resolved.effective_price, Price::from_naira(1_000_000));
        assert_eq!(resolved.original_price, None);
    }

    #[test]
    fn test_drop_missing_early_access_price_falls_back_to_standard_price() {
        let now = Utc::now();
        let p = Product {
            is_drop: true,
            release_date: Some(now + Duration::hours(1)),
            early_access_price: None,
            ..product()
        };
        let resolved = resolve(&p, now);
        assert_eq!(resolved.mode, PromotionMode::DropActive);
        assert_eq!(resolved.effective_price, Price::from_naira(500_000));
    }

    #[test]
    fn test_exactly_one_mode_and_original_iff_not_standard() {
        let now = Utc::now();
        let cases = [
            product(),
            Product {
                on_sale: true,
                sale_price: Some(Price::from_naira(1)),
                ..product()
            },
            Product {
                is_drop: true,
                release_date: Some(now + Duration::minutes(5)),
                early_access_price: Some(Price::from_naira(1)),
                ..product()
            },
            Product {
                is_drop: true,
                release_date: Some(now - Duration::minutes(5)),
                early_access_price: Some(Price::from_naira(1)),
                ..product()
            },
        ];

        for p in &cases {
            let resolved = resolve(p, now);
            assert_eq!(
                resolved.original_price.is_some(),
                resolved.mode != PromotionMode::Standard
            );
        }
    }

    #[test]
    fn test_preorder_override() {
        let now = Utc::now();
        let p = Product {
            stock: 0,
            in_stock: false,
            is_drop: true,
            release_date: Some(now + Duration::hours(1)),
            early_access_price: Some(Price::from_naira(1)),
            ..product()
        };
        assert!(is_purchasable(&p, now));

        let expired = Product {
            release_date: Some(now - Duration::hours(1)),
            ..p
        };
        assert!(!is_purchasable(&expired, now));

        let plain_out_of_stock = Product {
            stock: 0,
            in_stock: false,
            ..product()
        };
        assert!(!is_purchasable(&plain_out_of_stock, now));
    }
}
