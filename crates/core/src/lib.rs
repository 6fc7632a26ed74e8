//! Maison Lagos Core - Shared domain library.
//!
//! This crate holds the domain logic used by both Maison Lagos binaries:
//! - `storefront` - Public-facing boutique site
//! - `admin` - Internal back-office
//!
//! # Architecture
//!
//! The core crate is pure: no database access, no HTTP clients, no clocks.
//! Anything that needs the outside world takes it as an argument (the current
//! time, a product list, a storage port), which is what makes the pricing
//! engine testable without infrastructure.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`product`] - Catalog records, slugs, and write normalization
//! - [`promotion`] - Promotion state resolution (drop / sale / standard)
//! - [`drops`] - Drop expiry reconciliation planner
//! - [`countdown`] - Release countdown decomposition
//! - [`cart`] - The cart aggregate and its persistence port
//! - [`customers`] - Customer read-model derived from orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod countdown;
pub mod customers;
pub mod drops;
pub mod product;
pub mod promotion;
pub mod types;

pub use types::*;
