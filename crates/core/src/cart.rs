//! The cart aggregate and its persistence port.
//!
//! The cart is a set of lines keyed by product id, each carrying the price
//! the shopper agreed to pay at the moment of adding — the resolver's
//! effective price, not the raw catalog price. Later catalog edits (or a
//! promotion expiring) never touch an existing line; re-adding a product
//! only bumps its quantity and leaves the original snapshot alone.
//!
//! Persistence goes through the [`CartStorage`] port: every mutation saves
//! the full set synchronously, and opening a cart hydrates from whatever the
//! port has under the fixed application key. Unparseable stored state is
//! logged and treated as an empty cart, never surfaced as an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Fixed application key cart payloads are stored under.
pub const CART_STORAGE_KEY: &str = "maison_cart";

/// One product/quantity/snapshotted-price entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    /// Effective price at the moment of adding; what checkout charges.
    pub price: Price,
    /// Struck-through price at the moment of adding, if any.
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub image: String,
    pub quantity: u32,
    #[serde(default)]
    pub category: String,
    /// Drop state at the moment of adding; drives the deferred-shipment
    /// note on the confirmation surface.
    #[serde(default)]
    pub is_drop: bool,
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
}

/// Failure in the underlying key-value persistence.
#[derive(thiserror::Error, Debug)]
#[error("cart storage: {0}")]
pub struct CartStorageError(pub String);

/// Key-value persistence port for cart payloads.
///
/// Implementations decide where [`CART_STORAGE_KEY`] actually lands — a
/// session-scoped map in the storefront, a plain `HashMap` in tests.
pub trait CartStorage {
    /// Load the serialized cart, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns [`CartStorageError`] if the backing store cannot be read.
    fn load(&self) -> Result<Option<String>, CartStorageError>;

    /// Persist the serialized cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartStorageError`] if the backing store cannot be written.
    fn save(&self, payload: &str) -> Result<(), CartStorageError>;
}

/// Errors from cart mutations.
#[derive(thiserror::Error, Debug)]
pub enum CartError {
    /// The mutation succeeded in memory but could not be persisted.
    #[error(transparent)]
    Storage(#[from] CartStorageError),
    /// The cart could not be serialized (practically unreachable).
    #[error("cart serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The cart aggregate: lines keyed by product id, persisted on every
/// mutation, derived values recomputed on every read.
pub struct Cart<S: CartStorage> {
    lines: Vec<CartLine>,
    storage: S,
}

impl<S: CartStorage> Cart<S> {
    /// Open the cart, hydrating from storage.
    ///
    /// A missing payload is an empty cart; an unparseable one is logged at
    /// warn level and also treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`CartStorageError`] only if the store itself cannot be read.
    pub fn open(storage: S) -> Result<Self, CartStorageError> {
        let lines = match storage.load()? {
            Some(payload) => match serde_json::from_str(&payload) {
                Ok(lines) => lines,
                Err(error) => {
                    tracing::warn!(%error, "failed to parse saved cart, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        Ok(Self { lines, storage })
    }

    /// Add a line. If the product is already carted, its quantity grows by
    /// the incoming quantity and every snapshotted field keeps its original
    /// value. Quantities saturate at `u32::MAX`; the caller does not vet the
    /// incoming number.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if persisting the updated set fails.
    pub fn add(&mut self, line: CartLine) -> Result<(), CartError> {
        match self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => self.lines.push(line),
        }
        self.persist()
    }

    /// Remove the whole line for a product, whatever its quantity.
    /// Removing an id that is not carted is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if persisting the updated set fails.
    pub fn remove(&mut self, product_id: ProductId) -> Result<(), CartError> {
        self.lines.retain(|l| l.product_id != product_id);
        self.persist()
    }

    /// Adjust a line's quantity by `delta`, flooring at 1: a delta that
    /// would land at zero or below leaves the quantity unchanged. This is
    /// deliberately asymmetric with [`Cart::remove`] — the stepper never
    /// deletes a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if persisting the updated set fails.
    pub fn update_quantity(&mut self, product_id: ProductId, delta: i64) -> Result<(), CartError> {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
        {
            let new_quantity = i64::from(line.quantity).saturating_add(delta);
            if new_quantity > 0 {
                line.quantity = u32::try_from(new_quantity).unwrap_or(line.quantity);
            }
        }
        self.persist()
    }

    /// Empty the cart. Called exactly once, after successful order placement.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] if persisting the empty set fails.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.lines.clear();
        self.persist()
    }

    /// The current lines.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Total item count, recomputed on every call.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Total price, recomputed on every call from the snapshotted prices.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(|l| l.price.times(l.quantity)).sum()
    }

    /// Whether any carted line was a drop when it was added.
    #[must_use]
    pub fn has_drop_item(&self) -> bool {
        self.lines.iter().any(|l| l.is_drop)
    }

    fn persist(&self) -> Result<(), CartError> {
        let payload = serde_json::to_string(&self.lines)?;
        self.storage.save(&payload)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// In-memory stand-in for the persistence port.
    #[derive(Clone, Default)]
    struct MemoryStorage {
        payload: Rc<RefCell<Option<String>>>,
        poisoned: bool,
    }

    impl CartStorage for MemoryStorage {
        fn load(&self) -> Result<Option<String>, CartStorageError> {
            Ok(self.payload.borrow().clone())
        }

        fn save(&self, payload: &str) -> Result<(), CartStorageError> {
            if self.poisoned {
                return Err(CartStorageError("store unavailable".to_owned()));
            }
            *self.payload.borrow_mut() = Some(payload.to_owned());
            Ok(())
        }
    }

    fn line(id: i64, price: u64, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("Piece {id}"),
            price: Price::from_naira(price),
            original_price: None,
            image: String::new(),
            quantity,
            category: "Shirts".to_owned(),
            is_drop: false,
            release_date: None,
        }
    }

    #[test]
    fn test_add_merges_quantity_and_keeps_first_snapshot() {
        let mut cart = Cart::open(MemoryStorage::default()).unwrap();
        cart.add(line(1, 350_000, 2)).unwrap();
        // Same product re-added later at a different effective price.
        cart.add(line(1, 500_000, 3)).unwrap();

        assert_eq!(cart.lines().len(), 1);
        let merged = &cart.lines()[0];
        assert_eq!(merged.quantity, 5);
        assert_eq!(merged.price, Price::from_naira(350_000));
        assert_eq!(cart.total(), Price::from_naira(1_750_000));
    }

    #[test]
    fn test_add_saturates_instead_of_overflowing() {
        let mut cart = Cart::open(MemoryStorage::default()).unwrap();
        cart.add(line(1, 100, u32::MAX)).unwrap();
        cart.add(line(1, 100, u32::MAX)).unwrap();
        assert_eq!(cart.lines()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_remove_deletes_whole_line_and_missing_id_is_noop() {
        let mut cart = Cart::open(MemoryStorage::default()).unwrap();
        cart.add(line(1, 100, 4)).unwrap();
        cart.remove(ProductId::new(99)).unwrap();
        assert_eq!(cart.lines().len(), 1);
        cart.remove(ProductId::new(1)).unwrap();
        assert!(cart.lines().is_empty());
    }

    #[test]
    fn test_update_quantity_floors_at_one() {
        let mut cart = Cart::open(MemoryStorage::default()).unwrap();
        cart.add(line(1, 100, 2)).unwrap();

        cart.update_quantity(ProductId::new(1), -100).unwrap();
        assert_eq!(cart.lines()[0].quantity, 2);

        cart.update_quantity(ProductId::new(1), -1).unwrap();
        assert_eq!(cart.lines()[0].quantity, 1);

        // Would land at zero: no-op, not a removal.
        cart.update_quantity(ProductId::new(1), -1).unwrap();
        assert_eq!(cart.lines()[0].quantity, 1);

        cart.update_quantity(ProductId::new(1), 3).unwrap();
        assert_eq!(cart.lines()[0].quantity, 4);
    }

    #[test]
    fn test_derived_values_recompute() {
        let mut cart = Cart::open(MemoryStorage::default()).unwrap();
        cart.add(line(1, 350_000, 2)).unwrap();
        cart.add(line(2, 500_000, 1)).unwrap();
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.total(), Price::from_naira(1_200_000));

        cart.clear().unwrap();
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_persists_every_mutation_and_rehydrates() {
        let storage = MemoryStorage::default();
        {
            let mut cart = Cart::open(storage.clone()).unwrap();
            cart.add(line(1, 100, 2)).unwrap();
        }

        let reopened = Cart::open(storage).unwrap();
        assert_eq!(reopened.count(), 2);
    }

    #[test]
    fn test_unparseable_payload_is_an_empty_cart() {
        let storage = MemoryStorage::default();
        *storage.payload.borrow_mut() = Some("{not json".to_owned());

        let cart = Cart::open(storage).unwrap();
        assert!(cart.lines().is_empty());
    }

    #[test]
    fn test_storage_failure_propagates() {
        let storage = MemoryStorage {
            poisoned: true,
            ..MemoryStorage::default()
        };
        let mut cart = Cart::open(storage).unwrap();
        assert!(matches!(
            cart.add(line(1, 100, 1)),
            Err(CartError::Storage(_))
        ));
    }

    #[test]
    fn test_has_drop_item() {
        let mut cart = Cart::open(MemoryStorage::default()).unwrap();
        cart.add(line(1, 100, 1)).unwrap();
        assert!(!cart.has_drop_item());

        let mut drop_line = line(2, 750_000, 1);
        drop_line.is_drop = true;
        drop_line.release_date = Some(Utc::now());
        cart.add(drop_line).unwrap();
        assert!(cart.has_drop_item());
    }
}
