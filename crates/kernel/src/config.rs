//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Default cap on the number of ids accepted by one `bulkGet` call.
const DEFAULT_MAX_BULK_IDS: usize = 1000;

/// Kernel configuration.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Maximum number of ids accepted by a single `bulkGet` call
    /// (default: 1000).
    pub max_bulk_ids: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_bulk_ids: DEFAULT_MAX_BULK_IDS,
        }
    }
}

impl KernelConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let max_bulk_ids = match env::var("QUIRE_MAX_BULK_IDS") {
            Ok(value) => value
                .parse()
                .context("QUIRE_MAX_BULK_IDS must be a valid usize")?,
            Err(_) => DEFAULT_MAX_BULK_IDS,
        };

        Ok(Self { max_bulk_ids })
    }
}
