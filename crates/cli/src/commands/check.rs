//! Configuration sanity check.
//!
//! Loads both binaries' configuration from the current environment the
//! same way the binaries do at startup, so a broken deploy is caught
//! before anything restarts.

use maison_admin::config::AdminConfig;
use maison_storefront::config::StorefrontConfig;

/// Errors from the configuration check.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("storefront config: {0}")]
    Storefront(#[from] maison_storefront::config::ConfigError),

    #[error("admin config: {0}")]
    Admin(#[from] maison_admin::config::ConfigError),
}

/// Validate both configurations.
///
/// # Errors
///
/// Returns [`CheckError`] naming the first binary whose configuration does
/// not load.
pub fn run() -> Result<(), CheckError> {
    dotenvy::dotenv().ok();

    let storefront = StorefrontConfig::from_env()?;
    tracing::info!(addr = %storefront.socket_addr(), "storefront config ok");

    let admin = AdminConfig::from_env()?;
    tracing::info!(
        addr = %admin.socket_addr(),
        removebg_keys = admin.removebg_api_keys.len(),
        "admin config ok"
    );

    Ok(())
}
