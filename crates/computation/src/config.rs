//! Configuration structures.
//!
//! Configuration is explicit: callers build a [`StoreConfig`] (usually from
//! `Default`) and hand it to [`crate::storage::Database`]. Only
//! [`StoreConfig::from_env`] looks at the process environment.

use std::env;

use tracing::warn;

use crate::limits::{MAX_ARRAY_LEN, MAX_DEPTH, MAX_DOCUMENT_SIZE, MAX_STRING_LEN};

/// Environment variable enabling compression (`1`/`true` or `0`/`false`).
pub const ENV_COMPRESS: &str = "COMPUTATION_COMPRESS";

/// Environment variable holding the zstd level.
pub const ENV_COMPRESSION_LEVEL: &str = "COMPUTATION_COMPRESSION_LEVEL";

/// Storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub compression: CompressionConfig,
    pub limits: LimitsConfig,
}

impl StoreConfig {
    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Default configuration with overrides read through `lookup`.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_COMPRESS) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => config.compression.enabled = true,
                "0" | "false" => config.compression.enabled = false,
                _ => warn!("Invalid {} value: {}", ENV_COMPRESS, raw),
            }
        }

        if let Some(raw) = lookup(ENV_COMPRESSION_LEVEL) {
            match raw.trim().parse::<i32>() {
                Ok(level) if zstd::compression_level_range().contains(&level) => {
                    config.compression.level = level;
                }
                _ => warn!("Invalid {} value: {}", ENV_COMPRESSION_LEVEL, raw),
            }
        }

        config
    }
}

/// zstd compression of stored documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: 3,
        }
    }
}

/// Decoding limits for stored documents.
///
/// Defaults are the hard caps in [`crate::limits`]; a config can only be
/// stricter in practice, since encoders always enforce the hard caps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitsConfig {
    pub max_document_size: usize,
    pub max_string_len: usize,
    pub max_array_len: usize,
    pub max_depth: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_document_size: MAX_DOCUMENT_SIZE,
            max_string_len: MAX_STRING_LEN,
            max_array_len: MAX_ARRAY_LEN,
            max_depth: MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert!(!config.compression.enabled);
        assert_eq!(config.compression.level, 3);
        assert_eq!(config.limits.max_depth, MAX_DEPTH);
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            (ENV_COMPRESS, "TRUE"),
            (ENV_COMPRESSION_LEVEL, "9"),
        ]));
        assert!(config.compression.enabled);
        assert_eq!(config.compression.level, 9);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let config = StoreConfig::from_lookup(lookup(&[
            (ENV_COMPRESS, "maybe"),
            (ENV_COMPRESSION_LEVEL, "loud"),
        ]));
        assert_eq!(config, StoreConfig::default());
    }
}
