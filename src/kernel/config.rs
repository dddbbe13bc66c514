//! Kernel configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is
//! a valid configuration. The descriptor table size is fixed and not part of
//! the configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::syscalls::fs_constants::{DEFAULT_MAX_WRITE_SIZE, MAX_TRANSFER_SIZE};
use super::syscalls::sys_constants::{
    DEFAULT_ARG_BLOCK_SIZE, DEFAULT_MAX_ARGC, DEFAULT_MAX_STRING_LEN,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelConfig {
    /// Log level, see `interface::init_logging`.
    pub verbosity: isize,
    /// Writes of this many bytes or more are rejected.
    pub max_write_size: usize,
    /// Size of the page exec copies the argument vector into.
    pub arg_block_size: usize,
    /// Exclusive upper bound on exec's argc.
    pub max_argc: usize,
    /// Longest accepted program name, argument or file name, in bytes.
    pub max_string_len: usize,
}

impl Default for KernelConfig {
    fn default() -> KernelConfig {
        KernelConfig {
            verbosity: 0,
            max_write_size: DEFAULT_MAX_WRITE_SIZE,
            arg_block_size: DEFAULT_ARG_BLOCK_SIZE,
            max_argc: DEFAULT_MAX_ARGC,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

impl KernelConfig {
    pub fn from_json_str(text: &str) -> Result<KernelConfig, ConfigError> {
        let config: KernelConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<KernelConfig, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        KernelConfig::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_write_size == 0 {
            return Err(ConfigError::Invalid("max_write_size must be positive"));
        }
        if self.max_write_size > MAX_TRANSFER_SIZE {
            return Err(ConfigError::Invalid("max_write_size does not fit a write result"));
        }
        if self.max_argc == 0 {
            return Err(ConfigError::Invalid("max_argc must be positive"));
        }
        if self.max_string_len == 0 {
            return Err(ConfigError::Invalid("max_string_len must be positive"));
        }
        Ok(())
    }
}
