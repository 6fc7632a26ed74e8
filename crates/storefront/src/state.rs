//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use maison_core::product::Product;

use crate::config::StorefrontConfig;
use crate::services::{CartVault, PaystackClient, ResendMailer};

/// How long a cached catalog listing stays fresh. Promotion resolution
/// happens per-request, so caching rows never freezes a drop's state.
const CATALOG_TTL: Duration = Duration::from_secs(60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    paystack: PaystackClient,
    mailer: ResendMailer,
    carts: CartVault,
    catalog_cache: Cache<String, Arc<Vec<Product>>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let paystack = PaystackClient::new(&config.paystack);
        let mailer = ResendMailer::new(&config.resend);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                paystack,
                mailer,
                carts: CartVault::new(),
                catalog_cache: Cache::builder()
                    .max_capacity(64)
                    .time_to_live(CATALOG_TTL)
                    .build(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Paystack client.
    #[must_use]
    pub fn paystack(&self) -> &PaystackClient {
        &self.inner.paystack
    }

    /// Get a reference to the transactional mailer.
    #[must_use]
    pub fn mailer(&self) -> &ResendMailer {
        &self.inner.mailer
    }

    /// Get a reference to the per-session cart vault.
    #[must_use]
    pub fn carts(&self) -> &CartVault {
        &self.inner.carts
    }

    /// Get a reference to the catalog listing cache.
    #[must_use]
    pub fn catalog_cache(&self) -> &Cache<String, Arc<Vec<Product>>> {
        &self.inner.catalog_cache
    }
}
