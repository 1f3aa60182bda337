// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Ommatidia - compound-eye retina model
//!
//! Models a superposition compound eye as a hexagonal lattice of ommatidia on
//! a hemisphere, wires each unit to its neighbors, projects every
//! photoreceptor through an eye-sphere -> screen-sphere -> plane chain and
//! samples images into per-photoreceptor intensities.
//!
//! ## Quick Start
//!
//! ```rust
//! use ndarray::Array2;
//! use ommatidia::prelude::*;
//!
//! let mut config = OmmatidiaConfig::default();
//! config.lattice.rings = 2;
//! config.sampling.steps = 4;
//!
//! let eye = CompoundEye::from_config(&config)?;
//! assert_eq!(eye.neighbors().len(), 19);
//!
//! let source = ImageSource::single("im", Array2::from_elem((64, 64), 1.0));
//! let intensities = eye.intensities(&source, &mut rand::thread_rng())?;
//! assert_eq!(intensities.dim(), (4, 19 * 6));
//! # Ok::<(), ommatidia::EyeError>(())
//! ```
//!
//! ## Crates
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: ommatidia-config, ommatidia-observability  │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Geometry: ommatidia-geometry                           │
//! │  (ids, neighbor tables, projection chain, lattice)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Sampling: ommatidia-sampling                           │
//! │  (grid resampling, von Mises-Fisher weights)            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Feature Flags
//!
//! - **`parallel`**: per-photoreceptor sampling on rayon
//! - **`file-logging`**: rolling per-crate log files
//!
//! ## License
//!
//! Apache-2.0

pub use ommatidia_config as config;
pub use ommatidia_geometry as geometry;
pub use ommatidia_observability as observability;
pub use ommatidia_sampling as sampling;

pub mod eye;
pub mod logging;

pub use eye::{CompoundEye, EyeError, EyeResult};
pub use logging::init_logging;
#[cfg(feature = "file-logging")]
pub use logging::init_file_logging;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::eye::{CompoundEye, EyeError, EyeResult};

    pub use crate::config::{load_config, validate_config, OmmatidiaConfig, ScreenMapKind};

    pub use crate::geometry::{
        CoordinateSystem, EyeToScreenMap, HemisphereLattice, LatticeBuilder, PhotoreceptorSubset,
        PositionQuery, Positions, ProjectionChain, ScreenToPlaneMap, SphericalPoint, UnitId,
    };

    pub use crate::sampling::{ImageSource, IntensitySampler, SamplerSettings, SamplingMode, SamplingRequest};
}
