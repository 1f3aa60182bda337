// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `ommatidia.toml`.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OmmatidiaConfig {
    pub lattice: LatticeConfig,
    pub projection: ProjectionConfig,
    pub sampling: SamplingConfig,
    pub logging: LoggingConfig,
}

/// Hexagonal lattice on the eye hemisphere
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LatticeConfig {
    /// Number of real rings around the center ommatidium
    pub rings: u32,
    /// Radius of the eye hemisphere
    pub eye_radius: f64,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            rings: 16,
            eye_radius: 1.0,
        }
    }
}

/// Map used for the screen sphere to plane leg of the projection chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenMapKind {
    Albers,
    Equidistant,
}

impl ScreenMapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenMapKind::Albers => "albers",
            ScreenMapKind::Equidistant => "equidistant",
        }
    }
}

impl std::str::FromStr for ScreenMapKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "albers" => Ok(ScreenMapKind::Albers),
            "equidistant" => Ok(ScreenMapKind::Equidistant),
            other => Err(format!(
                "unknown screen map '{}', expected 'albers' or 'equidistant'",
                other
            )),
        }
    }
}

/// Eye sphere -> screen sphere -> plane projection settings
///
/// Albers angles are geographic latitudes/longitudes in radians
/// (latitude pi/2 is the pole of the hemisphere).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub screen_map: ScreenMapKind,
    pub screen_radius: f64,
    pub origin_latitude: f64,
    pub origin_longitude: f64,
    pub standard_parallel_1: f64,
    pub standard_parallel_2: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            screen_map: ScreenMapKind::Albers,
            screen_radius: 10.0,
            origin_latitude: FRAC_PI_2,
            origin_longitude: 0.0,
            standard_parallel_1: FRAC_PI_4,
            standard_parallel_2: FRAC_PI_2,
        }
    }
}

/// Image to photoreceptor intensity sampling
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// von Mises-Fisher concentration of the resampling kernel
    pub kappa: f64,
    /// Simulation time step (seconds)
    pub dt: f64,
    pub steps: usize,
    pub still_image: bool,
    /// Integration time the source photon counts were recorded over (seconds)
    pub exposure_reference: f64,
    /// Name of the intensity array inside an image source
    pub image_field: String,
    pub grid_latitude_factor: usize,
    pub grid_longitude_factor: usize,
    /// Largest per-axis window displacement per step in dynamic mode
    pub max_jitter: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            kappa: 100.0,
            dt: 1e-4,
            steps: 1000,
            still_image: true,
            exposure_reference: 1e-3,
            image_field: "im".to_string(),
            grid_latitude_factor: 3,
            grid_longitude_factor: 20,
            max_jitter: 1.0,
        }
    }
}

impl SamplingConfig {
    /// Factor applied to source pixel values for one time step
    pub fn exposure_factor(&self) -> f64 {
        self.dt / self.exposure_reference
    }
}

/// Logging settings consumed by `ommatidia-observability`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub debug_crates: Vec<String>,
    /// Parent of the per-run log folders; `./logs` when unset
    pub log_dir: Option<std::path::PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            debug_crates: Vec::new(),
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: OmmatidiaConfig = toml::from_str(
            r#"
            [lattice]
            rings = 3

            [projection]
            screen_map = "equidistant"
            "#,
        )
        .unwrap();

        assert_eq!(config.lattice.rings, 3);
        assert_eq!(config.lattice.eye_radius, 1.0);
        assert_eq!(config.projection.screen_map, ScreenMapKind::Equidistant);
        assert_eq!(config.projection.screen_radius, 10.0);
        assert_eq!(config.sampling.kappa, 100.0);
        assert_eq!(config.sampling.image_field, "im");
    }

    #[test]
    fn test_exposure_factor() {
        let sampling = SamplingConfig::default();
        assert!((sampling.exposure_factor() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_screen_map_parsing() {
        assert_eq!("Albers".parse::<ScreenMapKind>().unwrap(), ScreenMapKind::Albers);
        assert!("mercator".parse::<ScreenMapKind>().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = OmmatidiaConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: OmmatidiaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
