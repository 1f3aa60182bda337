// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Ommatidia Configuration System
//!
//! Type-safe configuration for the compound-eye model with support for:
//! - TOML file parsing (`ommatidia.toml`)
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ommatidia_config::{load_config, validate_config};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//!
//! println!("Rings: {}", config.lattice.rings);
//! println!("Kernel concentration: {}", config.sampling.kappa);
//! ```
//!
//! Every lattice instance is built from one immutable snapshot of this
//! configuration; nothing in the model reads global defaults at runtime.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Errors from locating, reading or checking a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    FileNotFound(String),

    #[error("Cannot read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed ommatidia.toml: {0}")]
    ParseError(String),

    #[error("Configuration validation failed:\n{}", format_issues(.0))]
    ValidationError(Vec<ConfigValidationError>),
}

fn format_issues(issues: &[ConfigValidationError]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
