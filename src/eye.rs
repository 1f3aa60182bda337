// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! A lattice and its sampler built from one configuration snapshot

use ndarray::Array2;
use ommatidia_config::{validate_config, ConfigError, OmmatidiaConfig, SamplingConfig};
use ommatidia_geometry::{GeometryError, HemisphereLattice, PositionQuery, Positions};
use ommatidia_sampling::{ImageSource, IntensitySampler, SamplingError, SamplingRequest};
use rand::Rng;
use tracing::info;

/// Result type for compound-eye operations
pub type EyeResult<T> = Result<T, EyeError>;

#[derive(Debug, thiserror::Error)]
pub enum EyeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),
}

/// Built lattice plus the sampler and sampling settings it was configured with
#[derive(Debug, Clone)]
pub struct CompoundEye {
    lattice: HemisphereLattice,
    sampler: IntensitySampler,
    sampling: SamplingConfig,
}

impl CompoundEye {
    /// Validate `config`, build the lattice and prepare its sampler
    pub fn from_config(config: &OmmatidiaConfig) -> EyeResult<Self> {
        validate_config(config)?;
        let lattice = HemisphereLattice::from_config(config)?;
        let sampler = IntensitySampler::from_config(&lattice, &config.sampling)?;
        info!(
            target: "ommatidia-geometry",
            "Compound eye ready: {} rings, {} photoreceptor inputs",
            lattice.rings(),
            sampler.photoreceptor_count()
        );
        Ok(CompoundEye {
            lattice,
            sampler,
            sampling: config.sampling.clone(),
        })
    }

    pub fn lattice(&self) -> &HemisphereLattice {
        &self.lattice
    }

    pub fn sampler(&self) -> &IntensitySampler {
        &self.sampler
    }

    pub fn neighbors(&self) -> &[Vec<usize>] {
        self.lattice.neighbors()
    }

    /// Positions with string-valued options, e.g. `("cartesian3D", "R1toR6", false)`
    pub fn positions(&self, coordinates: &str, subset: &str, include_border: bool) -> EyeResult<Positions> {
        let query = PositionQuery::parse(coordinates, subset, include_border)?;
        Ok(self.lattice.positions(&query))
    }

    /// Sample the configured image field with the configured steps, dt and mode
    pub fn intensities<R: Rng + ?Sized>(&self, source: &ImageSource, rng: &mut R) -> EyeResult<Array2<f64>> {
        let request = SamplingRequest::from_config(&self.sampling);
        Ok(self
            .sampler
            .intensities_from_source(source, &self.sampling.image_field, &request, rng)?)
    }
}
