//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_STOREFRONT_PRIVATE_TOKEN` - Storefront API private access token
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-01)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (e.g., production)
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.1)

use std::collections::BTreeMap;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_API_VERSION: &str = "2025-01";

/// Tokens below this many bits of entropy per character are rejected.
const MIN_TOKEN_ENTROPY: f64 = 3.3;

/// Substrings that mark a token as copied from a sample `.env`.
const PLACEHOLDER_MARKERS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "token-here",
    "xxx",
    "todo",
    "fixme",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub host: IpAddr,
    pub port: u16,
    pub shopify: ShopifyStorefrontConfig,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Where and how to reach the Shopify Storefront API.
///
/// `Debug` never prints the token.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Store domain (e.g., your-store.myshopify.com)
    pub store: String,
    pub api_version: String,
    /// Private token, sent only from the server
    pub storefront_private_token: SecretString,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_private_token", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from the process environment, after `.env`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value does
    /// not parse, or the Shopify token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is normal outside development.
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: parse_or("STOREFRONT_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_or("STOREFRONT_PORT", 3000)?,
            shopify: ShopifyStorefrontConfig::from_env()?,
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyStorefrontConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let token = required("SHOPIFY_STOREFRONT_PRIVATE_TOKEN")?;
        check_token(&token).map_err(|why| {
            ConfigError::InsecureSecret("SHOPIFY_STOREFRONT_PRIVATE_TOKEN".into(), why)
        })?;

        Ok(Self {
            store: required("SHOPIFY_STORE")?,
            api_version: optional("SHOPIFY_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            storefront_private_token: SecretString::from(token),
        })
    }

    /// GraphQL endpoint for this store and API version.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}/api/{}/graphql.json",
            self.store, self.api_version
        )
    }
}

// =============================================================================
// Environment Access
// =============================================================================

/// Non-empty value of `key`.
fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &str) -> Result<String, ConfigError> {
    optional(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse `key` if set, otherwise use `default`.
fn parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    optional(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let rate = parse_or(key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

// =============================================================================
// Token Checks
// =============================================================================

/// Reject tokens that are sample values or too repetitive to be real.
fn check_token(token: &str) -> Result<(), String> {
    let lower = token.to_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lower.contains(*m)) {
        return Err(format!("looks like a placeholder (contains '{marker}')"));
    }

    let bits = entropy_per_char(token);
    if bits < MIN_TOKEN_ENTROPY {
        return Err(format!(
            "entropy too low ({bits:.2} bits/char, need >= {MIN_TOKEN_ENTROPY:.1}); copy the token from the Shopify admin"
        ));
    }
    Ok(())
}

/// Shannon entropy of the character distribution, in bits.
fn entropy_per_char(s: &str) -> f64 {
    let counts = s.chars().fold(BTreeMap::<char, u32>::new(), |mut acc, c| {
        *acc.entry(c).or_default() += 1;
        acc
    });
    let total = counts.values().sum::<u32>();
    if total == 0 {
        return 0.0;
    }

    counts
        .values()
        .map(|&n| f64::from(n) / f64::from(total))
        .map(|p| -p * p.log2())
        .sum()
}
