// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Values are layered: the TOML file, then `OMMATIDIA_*` environment
//! variables, then explicit CLI arguments. Later layers win.

use crate::{ConfigError, ConfigResult, OmmatidiaConfig, ScreenMapKind};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const CONFIG_FILE_NAME: &str = "ommatidia.toml";
const CONFIG_PATH_VAR: &str = "OMMATIDIA_CONFIG_PATH";

/// Directories above the working directory that are searched
const PARENT_SEARCH_DEPTH: usize = 5;

/// Environment variable and override key for every overridable setting
const OVERRIDE_KEYS: &[(&str, &str)] = &[
    ("OMMATIDIA_RINGS", "rings"),
    ("OMMATIDIA_EYE_RADIUS", "eye_radius"),
    ("OMMATIDIA_SCREEN_RADIUS", "screen_radius"),
    ("OMMATIDIA_SCREEN_MAP", "screen_map"),
    ("OMMATIDIA_KAPPA", "kappa"),
    ("OMMATIDIA_DT", "dt"),
    ("OMMATIDIA_STEPS", "steps"),
    ("OMMATIDIA_STILL_IMAGE", "still_image"),
    ("OMMATIDIA_LOG_LEVEL", "log_level"),
];

/// Locate `ommatidia.toml`
///
/// `OMMATIDIA_CONFIG_PATH` wins when set, and must point at an existing file.
/// Otherwise the working directory and up to five of its parents are tried.
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(explicit) = env::var(CONFIG_PATH_VAR) {
        let path = PathBuf::from(explicit);
        return if path.exists() {
            Ok(path)
        } else {
            Err(ConfigError::FileNotFound(format!(
                "{} points at a missing file: {}",
                CONFIG_PATH_VAR,
                path.display()
            )))
        };
    }

    let candidates: Vec<PathBuf> = env::current_dir()
        .map(|cwd| {
            cwd.ancestors()
                .take(PARENT_SEARCH_DEPTH + 1)
                .map(|dir| dir.join(CONFIG_FILE_NAME))
                .collect()
        })
        .unwrap_or_default();

    if let Some(found) = candidates.iter().find(|path| path.exists()) {
        return Ok(found.clone());
    }

    let searched: Vec<String> = candidates.iter().map(|p| format!("  - {}", p.display())).collect();
    Err(ConfigError::FileNotFound(format!(
        "{} not found in:\n{}\n\nSet {} to use another location.",
        CONFIG_FILE_NAME,
        searched.join("\n"),
        CONFIG_PATH_VAR
    )))
}

/// Read and parse a config file, then apply environment and CLI overrides
///
/// With `config_path` unset the file is located by [`find_config_file`].
/// Validation is a separate step (`validate_config`).
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<OmmatidiaConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    debug!(target: "ommatidia-config", "Loading {}", config_file.display());
    let mut config: OmmatidiaConfig = toml::from_str(&fs::read_to_string(&config_file)?)?;
    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }
    Ok(config)
}

/// Overlay the `OMMATIDIA_*` variables listed in `OVERRIDE_KEYS`
///
/// Values that fail to parse are ignored and the file value is kept.
pub fn apply_environment_overrides(config: &mut OmmatidiaConfig) {
    for (var, key) in OVERRIDE_KEYS {
        if let Ok(value) = env::var(var) {
            apply_override(config, key, &value);
        }
    }
}

/// Overlay explicit `key -> value` arguments, e.g. `{"rings": "4", "kappa": "50"}`
///
/// Unknown keys are ignored.
pub fn apply_cli_overrides(config: &mut OmmatidiaConfig, cli_args: &HashMap<String, String>) {
    for (key, value) in cli_args {
        apply_override(config, key, value);
    }
}

fn apply_override(config: &mut OmmatidiaConfig, key: &str, value: &str) {
    debug!(target: "ommatidia-config", "Override {} = {}", key, value);
    match key {
        "rings" => set_parsed(&mut config.lattice.rings, value),
        "eye_radius" => set_parsed(&mut config.lattice.eye_radius, value),
        "screen_radius" => set_parsed(&mut config.projection.screen_radius, value),
        "screen_map" => set_parsed::<ScreenMapKind>(&mut config.projection.screen_map, value),
        "kappa" => set_parsed(&mut config.sampling.kappa, value),
        "dt" => set_parsed(&mut config.sampling.dt, value),
        "steps" => set_parsed(&mut config.sampling.steps, value),
        "still_image" => config.sampling.still_image = parse_flag(value),
        "log_level" => config.logging.level = value.to_string(),
        _ => {}
    }
}

fn set_parsed<T: FromStr>(slot: &mut T, value: &str) {
    if let Ok(parsed) = value.trim().parse() {
        *slot = parsed;
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var("OMMATIDIA_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("OMMATIDIA_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nope.toml");

        env::set_var("OMMATIDIA_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("OMMATIDIA_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let saved_rings = env::var("OMMATIDIA_RINGS").ok();
        env::remove_var("OMMATIDIA_RINGS");
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[lattice]").unwrap();
        writeln!(file, "rings = 4").unwrap();
        writeln!(file, "[sampling]").unwrap();
        writeln!(file, "kappa = 50.0").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.lattice.rings, 4);
        assert_eq!(config.sampling.kappa, 50.0);
        assert_eq!(config.sampling.steps, 1000);

        if let Some(value) = saved_rings {
            env::set_var("OMMATIDIA_RINGS", value);
        }
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = OmmatidiaConfig::default();

        env::set_var("OMMATIDIA_RINGS", "7");
        env::set_var("OMMATIDIA_SCREEN_MAP", "equidistant");
        env::set_var("OMMATIDIA_KAPPA", "not-a-number");

        apply_environment_overrides(&mut config);

        env::remove_var("OMMATIDIA_RINGS");
        env::remove_var("OMMATIDIA_SCREEN_MAP");
        env::remove_var("OMMATIDIA_KAPPA");

        assert_eq!(config.lattice.rings, 7);
        assert_eq!(config.projection.screen_map, ScreenMapKind::Equidistant);
        assert_eq!(config.sampling.kappa, 100.0);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = OmmatidiaConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("rings".to_string(), "2".to_string());
        cli_args.insert("still_image".to_string(), "false".to_string());
        cli_args.insert("steps".to_string(), "10".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.lattice.rings, 2);
        assert!(!config.sampling.still_image);
        assert_eq!(config.sampling.steps, 10);
    }

    #[test]
    fn test_unknown_and_malformed_cli_values_are_ignored() {
        let mut config = OmmatidiaConfig::default();
        let cli_args: HashMap<String, String> = [("retina", "9"), ("dt", "fast"), ("still_image", " YES ")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.sampling.dt, OmmatidiaConfig::default().sampling.dt);
        assert!(config.sampling.still_image);
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[lattice]").unwrap();
        writeln!(file, "rings = 3").unwrap();
        writeln!(file, "eye_radius = 2.0").unwrap();

        env::set_var("OMMATIDIA_RINGS", "5");
        env::set_var("OMMATIDIA_EYE_RADIUS", "1.5");

        let mut cli_args = HashMap::new();
        cli_args.insert("rings".to_string(), "6".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("OMMATIDIA_RINGS");
        env::remove_var("OMMATIDIA_EYE_RADIUS");

        // CLI wins for rings, env wins for eye radius (no CLI override)
        assert_eq!(config.lattice.rings, 6);
        assert_eq!(config.lattice.eye_radius, 1.5);
    }
}
