// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Range and consistency checks run before a lattice or sampler is built

use tracing::debug;

use crate::{ConfigError, ConfigResult, OmmatidiaConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["text", "json"];

/// One problem found in a configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("{field} is required")]
    MissingRequired { field: String },

    #[error("{field} {reason}")]
    InvalidValue { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Check every section and report all problems at once
///
/// # Errors
///
/// `ConfigError::ValidationError` listing each offending field.
pub fn validate_config(config: &OmmatidiaConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();
    validate_geometry(config, &mut errors);
    validate_sampling(config, &mut errors);
    validate_logging(config, &mut errors);

    if errors.is_empty() {
        debug!(target: "ommatidia-config", "Configuration valid");
        Ok(())
    } else {
        debug!(target: "ommatidia-config", "Configuration rejected: {} issue(s)", errors.len());
        Err(ConfigError::ValidationError(errors))
    }
}

fn positive(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(invalid(field, "must be positive"));
    }
}

fn validate_geometry(config: &OmmatidiaConfig, errors: &mut Vec<ConfigValidationError>) {
    positive("lattice.eye_radius", config.lattice.eye_radius, errors);
    positive("projection.screen_radius", config.projection.screen_radius, errors);

    // Rays leave the eye sphere from inside the screen sphere
    if config.projection.screen_radius <= config.lattice.eye_radius {
        errors.push(invalid("projection.screen_radius", "must be larger than lattice.eye_radius"));
    }

    let p = &config.projection;
    for (field, value) in [
        ("projection.origin_latitude", p.origin_latitude),
        ("projection.standard_parallel_1", p.standard_parallel_1),
        ("projection.standard_parallel_2", p.standard_parallel_2),
    ] {
        if !(-std::f64::consts::FRAC_PI_2..=std::f64::consts::FRAC_PI_2).contains(&value) {
            errors.push(invalid(field, "must be a latitude between -pi/2 and pi/2"));
        }
    }
    if (p.standard_parallel_1.sin() + p.standard_parallel_2.sin()).abs() < 1e-12 {
        errors.push(invalid(
            "projection.standard_parallel_2",
            "must not mirror standard_parallel_1 about the equator",
        ));
    }
}

fn validate_sampling(config: &OmmatidiaConfig, errors: &mut Vec<ConfigValidationError>) {
    let s = &config.sampling;
    positive("sampling.kappa", s.kappa, errors);
    positive("sampling.dt", s.dt, errors);
    positive("sampling.exposure_reference", s.exposure_reference, errors);

    if s.grid_latitude_factor == 0 {
        errors.push(invalid("sampling.grid_latitude_factor", "must be at least 1"));
    }
    if s.grid_longitude_factor == 0 {
        errors.push(invalid("sampling.grid_longitude_factor", "must be at least 1"));
    }
    if !(s.max_jitter.is_finite() && s.max_jitter >= 0.0) {
        errors.push(invalid("sampling.max_jitter", "must be zero or positive"));
    }
    if s.image_field.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "sampling.image_field".to_string(),
        });
    }
}

fn validate_logging(config: &OmmatidiaConfig, errors: &mut Vec<ConfigValidationError>) {
    if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(invalid("logging.level", format!("must be one of {}", LOG_LEVELS.join(", "))));
    }
    if !LOG_FORMATS.contains(&config.logging.format.to_lowercase().as_str()) {
        errors.push(invalid("logging.format", format!("must be one of {}", LOG_FORMATS.join(", "))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = OmmatidiaConfig::default();
        validate_config(&config).unwrap();
    }

    #[test]
    fn test_screen_inside_eye() {
        let mut config = OmmatidiaConfig::default();
        config.lattice.eye_radius = 12.0;

        let msg = validate_config(&config).unwrap_err().to_string();
        assert!(msg.contains("projection.screen_radius must be larger than lattice.eye_radius"));
    }

    #[test]
    fn test_non_positive_kappa() {
        let mut config = OmmatidiaConfig::default();
        config.sampling.kappa = 0.0;

        match validate_config(&config) {
            Err(ConfigError::ValidationError(issues)) => {
                assert_eq!(issues, vec![invalid("sampling.kappa", "must be positive")]);
            }
            other => panic!("zero kappa should be rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_errors_are_collected() {
        let mut config = OmmatidiaConfig::default();
        config.sampling.dt = -1.0;
        config.sampling.grid_longitude_factor = 0;
        config.sampling.image_field = String::new();
        config.logging.level = "loud".to_string();

        let msg = validate_config(&config).unwrap_err().to_string();
        for field in [
            "sampling.dt",
            "sampling.grid_longitude_factor",
            "sampling.image_field is required",
            "logging.level",
        ] {
            assert!(msg.contains(field), "{} missing from:\n{}", field, msg);
        }
    }

    #[test]
    fn test_symmetric_parallels_rejected() {
        let mut config = OmmatidiaConfig::default();
        config.projection.standard_parallel_1 = 0.5;
        config.projection.standard_parallel_2 = -0.5;

        assert!(validate_config(&config).is_err());
    }
}
