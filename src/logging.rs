// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging setup from the `[logging]` section

use ommatidia_config::OmmatidiaConfig;
use ommatidia_observability::{init_console_logging, parse_debug_flags, CrateDebugFlags, LoggingConfig};

/// Debug flags from the config's `debug_crates`, process arguments and `OMMATIDIA_DEBUG`
pub fn debug_flags(config: &OmmatidiaConfig) -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_names(&config.logging.debug_crates);
    flags.enabled_crates.extend(parse_debug_flags().enabled_crates);
    flags
}

fn logging_config(config: &OmmatidiaConfig) -> LoggingConfig {
    LoggingConfig {
        log_dir: config.logging.log_dir.clone(),
        ..LoggingConfig::from_section(&config.logging.level, &config.logging.format)
    }
}

/// Install the global subscriber; fails if one is already set
pub fn init_logging(config: &OmmatidiaConfig) -> anyhow::Result<()> {
    init_console_logging(&debug_flags(config), &logging_config(config))
}

/// Console output plus per-crate JSON files under `logging.log_dir`
///
/// Keep the guard alive for as long as logs should be written.
#[cfg(feature = "file-logging")]
pub fn init_file_logging(config: &OmmatidiaConfig) -> anyhow::Result<ommatidia_observability::LoggingGuard> {
    ommatidia_observability::init_logging(&debug_flags(config), &logging_config(config))
}
