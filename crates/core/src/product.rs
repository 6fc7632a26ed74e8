//! Catalog records and write normalization.
//!
//! Every promotional invariant on a product is enforced in exactly one
//! place: [`ProductWrite::normalize`]. Both binaries build their inserts and
//! updates from a normalized write, so no call site re-implements the
//! mutual-exclusivity rules or the `in_stock` derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Maximum number of gallery images per product.
pub const MAX_IMAGES: usize = 4;

/// A catalog entry.
///
/// `slug` is assigned once at creation from the name and never regenerated;
/// `in_stock` is derived (`stock > 0`) and recomputed on every save, never
/// authoritative on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Standard retail price.
    pub price: Price,
    pub on_sale: bool,
    pub sale_price: Option<Price>,
    pub stock: i32,
    pub in_stock: bool,
    pub category: String,
    pub subcategory: String,
    /// Ordered gallery; index 0 is the primary image.
    pub images: Vec<String>,
    pub is_bestseller: bool,
    pub is_new_arrival: bool,
    pub is_drop: bool,
    pub release_date: Option<DateTime<Utc>>,
    pub early_access_price: Option<Price>,
    pub gender: String,
    pub style: String,
    pub created_at: DateTime<Utc>,
}

/// Validation failures on a product write.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductWriteError {
    #[error("product name cannot be empty")]
    EmptyName,
    #[error("stock cannot be negative")]
    NegativeStock,
    #[error("a product on sale requires a sale price")]
    MissingSalePrice,
    #[error("a drop requires a release date")]
    MissingReleaseDate,
    #[error("a drop requires an early-access price")]
    MissingEarlyAccessPrice,
    #[error("a product carries at most {MAX_IMAGES} images")]
    TooManyImages,
}

/// The admin form's view of a product: everything except the identity
/// fields (`id`, `slug`, `created_at`) and the derived `in_stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWrite {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default)]
    pub sale_price: Option<Price>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_bestseller: bool,
    #[serde(default)]
    pub is_new_arrival: bool,
    #[serde(default)]
    pub is_drop: bool,
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub early_access_price: Option<Price>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub style: String,
}

impl ProductWrite {
    /// Enforce the promotional invariants and validate required fields.
    ///
    /// Rules, in order:
    /// - a drop wins over every other flag: it clears `is_bestseller`,
    ///   `is_new_arrival`, `on_sale`, and `sale_price`
    /// - otherwise `is_bestseller` clears `is_new_arrival`, so at most one
    ///   of {bestseller, new-arrival, drop} survives
    /// - a non-drop loses its `early_access_price` and `release_date`
    /// - a product not on sale loses its `sale_price`
    ///
    /// # Errors
    ///
    /// Returns a [`ProductWriteError`] when a required dependent field is
    /// missing (`sale_price` for sales, `release_date` and
    /// `early_access_price` for drops), the name is empty, stock is
    /// negative, or more than [`MAX_IMAGES`] images are attached.
    pub fn normalize(mut self) -> Result<Self, ProductWriteError> {
        if self.name.trim().is_empty() {
            return Err(ProductWriteError::EmptyName);
        }
        if self.stock < 0 {
            return Err(ProductWriteError::NegativeStock);
        }
        if self.images.len() > MAX_IMAGES {
            return Err(ProductWriteError::TooManyImages);
        }

        if self.is_drop {
            self.is_bestseller = false;
            self.is_new_arrival = false;
            self.on_sale = false;
            self.sale_price = None;

            if self.release_date.is_none() {
                return Err(ProductWriteError::MissingReleaseDate);
            }
            if self.early_access_price.is_none() {
                return Err(ProductWriteError::MissingEarlyAccessPrice);
            }
        } else {
            if self.is_bestseller {
                self.is_new_arrival = false;
            }
            self.release_date = None;
            self.early_access_price = None;
        }

        if self.on_sale {
            if self.sale_price.is_none() {
                return Err(ProductWriteError::MissingSalePrice);
            }
        } else {
            self.sale_price = None;
        }

        Ok(self)
    }

    /// The derived availability flag for this write.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Derive a URL slug from a product name.
///
/// Lowercases, collapses every non-alphanumeric run to a single hyphen, and
/// strips leading/trailing hyphens. Assigned once at creation and never
/// regenerated on later edits.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Price;

    fn base_write() -> ProductWrite {
        ProductWrite {
            name: "Silk Overshirt".to_owned(),
            description: String::new(),
            price: Price::from_naira(500_000),
            on_sale: false,
            sale_price: None,
            stock: 3,
            category: "Shirts".to_owned(),
            subcategory: String::new(),
            images: Vec::new(),
            is_bestseller: false,
            is_new_arrival: false,
            is_drop: false,
            release_date: None,
            early_access_price: None,
            gender: "Unisex".to_owned(),
            style: "Classic".to_owned(),
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Silk Overshirt"), "silk-overshirt");
        assert_eq!(slugify("  Ore & Ayo -- N°1  "), "ore-ayo-n-1");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("ALL CAPS 2024"), "all-caps-2024");
    }

    #[test]
    fn test_drop_clears_other_flags() {
        let write = ProductWrite {
            is_drop: true,
            is_bestseller: true,
            is_new_arrival: true,
            on_sale: true,
            sale_price: Some(Price::from_naira(100)),
            release_date: Some(Utc::now()),
            early_access_price: Some(Price::from_naira(750_000)),
            ..base_write()
        };

        let normalized = write.normalize().unwrap();
        assert!(normalized.is_drop);
        assert!(!normalized.is_bestseller);
        assert!(!normalized.is_new_arrival);
        assert!(!normalized.on_sale);
        assert_eq!(normalized.sale_price, None);
    }

    #[test]
    fn test_bestseller_clears_new_arrival() {
        let write = ProductWrite {
            is_bestseller: true,
            is_new_arrival: true,
            ..base_write()
        };

        let normalized = write.normalize().unwrap();
        assert!(normalized.is_bestseller);
        assert!(!normalized.is_new_arrival);
    }

    #[test]
    fn test_non_drop_loses_drop_fields() {
        let write = ProductWrite {
            is_drop: false,
            release_date: Some(Utc::now()),
            early_access_price: Some(Price::from_naira(1)),
            ..base_write()
        };

        let normalized = write.normalize().unwrap();
        assert_eq!(normalized.release_date, None);
        assert_eq!(normalized.early_access_price, None);
    }

    #[test]
    fn test_sale_requires_sale_price() {
        let write = ProductWrite {
            on_sale: true,
            ..base_write()
        };
        assert_eq!(
            write.normalize(),
            Err(ProductWriteError::MissingSalePrice)
        );
    }

    #[test]
    fn test_drop_requires_release_and_price() {
        let missing_date = ProductWrite {
            is_drop: true,
            early_access_price: Some(Price::from_naira(1)),
            ..base_write()
        };
        assert_eq!(
            missing_date.normalize(),
            Err(ProductWriteError::MissingReleaseDate)
        );

        let missing_price = ProductWrite {
            is_drop: true,
            release_date: Some(Utc::now()),
            ..base_write()
        };
        assert_eq!(
            missing_price.normalize(),
            Err(ProductWriteError::MissingEarlyAccessPrice)
        );
    }

    #[test]
    fn test_in_stock_derivation_and_image_cap() {
        let mut write = base_write();
        assert!(write.in_stock());
        write.stock = 0;
        assert!(!write.in_stock());

        write.stock = 1;
        write.images = vec![String::new(); MAX_IMAGES + 1];
        assert_eq!(write.normalize(), Err(ProductWriteError::TooManyImages));
    }
}
