//! Cart client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_API_URL` - Cart endpoint (default: <http://127.0.0.1:3000/api/cart>)
//! - `CART_STORAGE_PATH` - File holding the persisted cart ID (default: .shopfront/cart.json)
//! - `CART_SETTLEMENT_POLICY` - `per-operation` or `clear-all` (default: per-operation)

use std::path::PathBuf;

use url::Url;

use crate::error::ConfigError;
use crate::pending::SettlementPolicy;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api/cart";
const DEFAULT_STORAGE_PATH: &str = ".shopfront/cart.json";

/// Cart client configuration.
#[derive(Debug, Clone)]
pub struct CartSyncConfig {
    /// Absolute URL of the `/api/cart` endpoint
    pub api_url: Url,
    /// Where the cart ID is persisted between runs
    pub storage_path: PathBuf,
    /// How pending flags are cleared when an exchange settles
    pub settlement: SettlementPolicy,
}

impl CartSyncConfig {
    /// Configuration for the given endpoint with default storage and policy.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            settlement: SettlementPolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_url = Url::parse(&get_env_or_default("CART_API_URL", DEFAULT_API_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("CART_API_URL".to_string(), e.to_string()))?;
        let storage_path = PathBuf::from(get_env_or_default(
            "CART_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));
        let settlement = get_env_or_default("CART_SETTLEMENT_POLICY", "per-operation")
            .parse::<SettlementPolicy>()
            .map_err(|e| ConfigError::InvalidEnvVar("CART_SETTLEMENT_POLICY".to_string(), e))?;

        Ok(Self {
            api_url,
            storage_path,
            settlement,
        })
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
