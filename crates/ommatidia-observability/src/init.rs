// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console logging is always available. With the `file-logging` feature a
//! timestamped run folder receives one JSON log per known crate plus a
//! combined log, and old runs are pruned by age and count.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

#[cfg(feature = "file-logging")]
pub use file::{init_logging, LoggingGuard};

fn build_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<EnvFilter> {
    let filter = debug_flags.to_filter_string_with_base(&config.level);
    EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter))
}

/// Initialize console logging for the process
///
/// # Errors
///
/// Fails if the filter cannot be parsed or a global subscriber is already set.
pub fn init_console_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<()> {
    let env_filter = build_filter(debug_flags, config)?;

    let result = match config.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .try_init(),
    };

    result.map_err(|e| anyhow!("Failed to install global subscriber: {}", e))
}

#[cfg(feature = "file-logging")]
mod file {
    use std::path::{Path, PathBuf};

    use anyhow::{anyhow, Context, Result};
    use chrono::{DateTime, NaiveDateTime, Utc};
    use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
    use tracing_appender::rolling;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer, Registry};

    use super::build_filter;
    use crate::cli::CrateDebugFlags;
    use crate::config::LoggingConfig;

    const RUN_PREFIX: &str = "run_";
    const RUN_STAMP: &str = "%Y%m%d_%H%M%S";

    type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

    /// Keeps the non-blocking writers alive; logs are flushed on drop
    pub struct LoggingGuard {
        _writers: Vec<WorkerGuard>,
        run_dir: PathBuf,
    }

    impl LoggingGuard {
        /// Folder of the current run
        pub fn log_dir(&self) -> &Path {
            &self.run_dir
        }
    }

    /// Console output plus JSON files in a fresh run folder
    ///
    /// ```text
    /// ./logs/
    ///   └── run_20250101_120000/
    ///       ├── ommatidia-geometry.log
    ///       ├── ommatidia-sampling.log
    ///       └── ommatidia.log (combined)
    /// ```
    pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
        let base = config.log_dir.clone().unwrap_or_else(|| PathBuf::from("./logs"));
        let run_dir = base.join(format!("{}{}", RUN_PREFIX, Utc::now().format(RUN_STAMP)));
        std::fs::create_dir_all(&run_dir)
            .with_context(|| format!("Cannot create run folder {}", run_dir.display()))?;

        prune_runs(&base, config.retention_days, config.retention_runs)?;

        let filter = build_filter(debug_flags, config)?;
        let mut writers = Vec::new();
        let mut layers: Vec<BoxedLayer> = vec![tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_filter(filter.clone())
            .boxed()];

        for crate_name in crate::KNOWN_CRATES {
            let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&run_dir, format!("{}.log", crate_name)));
            writers.push(guard);
            layers.push(json_layer(writer, EnvFilter::new(format!("{},off", crate::debug_directive(crate_name)))));
        }

        let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&run_dir, "ommatidia.log"));
        writers.push(guard);
        layers.push(json_layer(writer, filter));

        Registry::default()
            .with(layers)
            .try_init()
            .map_err(|e| anyhow!("Failed to install global subscriber: {}", e))?;

        Ok(LoggingGuard {
            _writers: writers,
            run_dir,
        })
    }

    fn json_layer(writer: NonBlocking, filter: EnvFilter) -> BoxedLayer {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(filter)
            .boxed()
    }

    /// Run folders under `base`, oldest first
    fn list_runs(base: &Path) -> Result<Vec<(PathBuf, DateTime<Utc>)>> {
        let mut runs = Vec::new();
        for entry in std::fs::read_dir(base)? {
            let path = entry?.path();
            let started = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(RUN_PREFIX))
                .and_then(|stamp| NaiveDateTime::parse_from_str(stamp, RUN_STAMP).ok());
            if let (true, Some(started)) = (path.is_dir(), started) {
                runs.push((path, started.and_utc()));
            }
        }
        runs.sort_by_key(|(_, started)| *started);
        Ok(runs)
    }

    /// Drop runs older than `retention_days`, then all but the newest `retention_runs`
    pub(crate) fn prune_runs(base: &Path, retention_days: u64, retention_runs: usize) -> Result<()> {
        if !base.exists() {
            return Ok(());
        }

        let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);
        let runs = list_runs(base)?;
        let recent = runs.iter().filter(|(_, started)| *started >= cutoff).count();
        let surplus = recent.saturating_sub(retention_runs);

        let mut skipped_recent = 0;
        for (path, started) in &runs {
            let expired = *started < cutoff;
            if !expired {
                if skipped_recent >= surplus {
                    continue;
                }
                skipped_recent += 1;
            }
            // the subscriber is not installed yet
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!("Warning: could not prune log run {}: {}", path.display(), e);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_prune_keeps_most_recent_runs() {
            let dir = tempfile::tempdir().unwrap();
            let now = Utc::now();
            for hours in 1..=4 {
                let stamp = (now - chrono::Duration::hours(hours)).format(RUN_STAMP);
                std::fs::create_dir_all(dir.path().join(format!("{}{}", RUN_PREFIX, stamp))).unwrap();
            }
            let stale = (now - chrono::Duration::days(90)).format(RUN_STAMP);
            std::fs::create_dir_all(dir.path().join(format!("{}{}", RUN_PREFIX, stale))).unwrap();
            std::fs::create_dir_all(dir.path().join("unrelated")).unwrap();

            prune_runs(dir.path(), 30, 2).unwrap();

            let runs = list_runs(dir.path()).unwrap();
            assert_eq!(runs.len(), 2);
            // the two newest survive
            assert!(runs.iter().all(|(_, started)| now - *started < chrono::Duration::hours(3)));
            assert!(dir.path().join("unrelated").exists());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_reported() {
        let config = LoggingConfig {
            level: "ommatidia-geometry=verbose".to_string(),
            ..LoggingConfig::default()
        };
        assert!(init_console_logging(&CrateDebugFlags::default(), &config).is_err());
    }

    #[test]
    fn test_second_initialization_fails() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-ommatidia-geometry".to_string()]);
        let config = LoggingConfig::default();
        // The first call may race other tests in this process; the second never succeeds.
        let _ = init_console_logging(&flags, &config);
        assert!(init_console_logging(&flags, &config).is_err());
    }
}
