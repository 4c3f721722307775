//! Cart store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `CART_STORAGE_KEY` - Key the cart blob is stored under (default: `@GoMarketPlace:cart`)
//! - `CART_DATA_DIR` - Directory used by the file store (default: `./data`)
//! - `CART_MAILBOX_SIZE` - Bounded capacity of the service mailbox (default: 32)
//! - `CART_PERSIST_RETRIES` - Extra write attempts after a failed persist (default: 2)
//! - `CART_RETRY_BACKOFF_MS` - Pause between write attempts (default: 50)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketPlace:cart";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartConfig {
    pub storage_key: String,
    pub data_dir: PathBuf,
    pub mailbox_size: usize,
    pub persist_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: PathBuf::from("data"),
            mailbox_size: 32,
            persist_retries: 2,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

impl CartConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source, falling back to
    /// [`CartConfig::default`] for anything unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let storage_key = match lookup("CART_STORAGE_KEY") {
            Some(key) if key.trim().is_empty() => {
                return Err(ConfigError::InvalidEnvVar(
                    "CART_STORAGE_KEY".to_string(),
                    "must not be empty".to_string(),
                ));
            }
            Some(key) => key,
            None => defaults.storage_key,
        };

        let data_dir = lookup("CART_DATA_DIR").map_or(defaults.data_dir, PathBuf::from);

        let mailbox_size = parse_var(&lookup, "CART_MAILBOX_SIZE")?.unwrap_or(defaults.mailbox_size);
        if mailbox_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CART_MAILBOX_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let persist_retries =
            parse_var(&lookup, "CART_PERSIST_RETRIES")?.unwrap_or(defaults.persist_retries);
        let retry_backoff = parse_var(&lookup, "CART_RETRY_BACKOFF_MS")?
            .map_or(defaults.retry_backoff, Duration::from_millis);

        Ok(Self {
            storage_key,
            data_dir,
            mailbox_size,
            persist_retries,
            retry_backoff,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
        })
        .transpose()
}
