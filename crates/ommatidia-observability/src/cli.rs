// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-ommatidia-geometry` to raise a single crate to
//! debug level, and `--debug-all` for every known crate.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Per-crate debug flags
///
/// # Example
/// ```rust
/// use ommatidia_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-ommatidia-sampling".to_string()]);
/// assert!(flags.is_enabled("ommatidia-sampling"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Collect `--debug-{crate-name}` and `--debug-all` arguments, ignoring the rest
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }

            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enabled_crates.insert(crate_name.to_string());
            }
        }

        flags
    }

    /// Build from the `debug_crates` list of the logging config section
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = CrateDebugFlags::default();
        for name in names {
            let name = name.as_ref().trim();
            if name == "all" {
                flags.enable_all();
            } else if !name.is_empty() {
                flags.enabled_crates.insert(name.to_string());
            }
        }
        flags
    }

    fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enabled_crates.insert(crate_name.to_string());
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `DEBUG` for flagged crates, `INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// `EnvFilter` directives over an `info` base
    pub fn to_filter_string(&self) -> String {
        self.to_filter_string_with_base("info")
    }

    /// `EnvFilter` directives over `base_level`
    ///
    /// `--debug-ommatidia-geometry` with base `warn` gives
    /// `ommatidia-geometry=debug,ommatidia_geometry=debug,warn`.
    pub fn to_filter_string_with_base(&self, base_level: &str) -> String {
        self.enabled_crates
            .iter()
            .map(|crate_name| debug_directive(crate_name))
            .chain(std::iter::once(base_level.to_string()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Debug directive for a crate's explicit `target: "<crate-name>"` events and
/// for events under its module path
pub fn debug_directive(crate_name: &str) -> String {
    let module_path = crate_name.replace('-', "_");
    if module_path == crate_name {
        format!("{}=debug", crate_name)
    } else {
        format!("{}=debug,{}=debug", crate_name, module_path)
    }
}

/// Parse debug flags from the process arguments and `OMMATIDIA_DEBUG`
///
/// Environment variable format: comma-separated crate names, or `all`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());

    if let Ok(env_var) = env::var("OMMATIDIA_DEBUG") {
        let from_env = CrateDebugFlags::from_names(env_var.split(','));
        flags.enabled_crates.extend(from_env.enabled_crates);
    }

    flags
}

/// Usage text for the debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  OMMATIDIA_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  OMMATIDIA_DEBUG=all                               Enable debug for all crates
"#,
        KNOWN_CRATES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-ommatidia-geometry".to_string()]);
        assert!(flags.is_enabled("ommatidia-geometry"));
        assert!(!flags.is_enabled("ommatidia-sampling"));
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_from_names() {
        let flags = CrateDebugFlags::from_names([" ommatidia-sampling ", ""]);
        assert!(flags.is_enabled("ommatidia-sampling"));
        assert_eq!(flags.enabled_crates.len(), 1);
    }

    #[test]
    fn test_filter_string() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-ommatidia-sampling".to_string()]);
        assert_eq!(
            flags.to_filter_string(),
            "ommatidia-sampling=debug,ommatidia_sampling=debug,info"
        );
        assert_eq!(CrateDebugFlags::default().to_filter_string_with_base("warn"), "warn");
    }

    #[test]
    fn test_debug_directive() {
        assert_eq!(
            debug_directive("ommatidia-geometry"),
            "ommatidia-geometry=debug,ommatidia_geometry=debug"
        );
        assert_eq!(debug_directive("ommatidia"), "ommatidia=debug");
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-ommatidia-geometry".to_string()]);
        assert_eq!(flags.log_level("ommatidia-geometry"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("ommatidia-sampling"), tracing::Level::INFO);
    }

    #[test]
    fn test_help_lists_crates() {
        let help = debug_flags_help();
        for crate_name in KNOWN_CRATES {
            assert!(help.contains(crate_name));
        }
    }
}
