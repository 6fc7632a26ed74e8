//! Maison Lagos back-office library.
//!
//! Catalog management, order fulfillment, the customer read-model, and the
//! dashboard, exposed as an authenticated JSON API.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
