// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ommatidia-observability
//!
//! Logging infrastructure shared by the ommatidia crates, with per-crate
//! debug flag support.
//!
//! ## Features
//! - `file-logging`: timestamped per-run log folders with daily rotation

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Crate names that log under their own tracing target
pub const KNOWN_CRATES: &[&str] = &[
    "ommatidia-config",
    "ommatidia-geometry",
    "ommatidia-sampling",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_known_crates_emit_tracing_events() {
        let crates_dir = Path::new(env!("CARGO_MANIFEST_DIR")).parent().unwrap();
        for crate_name in KNOWN_CRATES {
            let manifest = std::fs::read_to_string(crates_dir.join(crate_name).join("Cargo.toml")).unwrap();
            assert!(
                manifest.lines().any(|line| line.trim_start().starts_with("tracing =")),
                "{} has no tracing dependency",
                crate_name
            );
        }
    }
}
