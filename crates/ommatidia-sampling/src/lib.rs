// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Ommatidia Sampling

Turns a decoded 2-D light-intensity image into per-photoreceptor input for a
[`HemisphereLattice`](ommatidia_geometry::HemisphereLattice).

## Example

```rust
use ndarray::Array2;
use ommatidia_geometry::HemisphereLattice;
use ommatidia_sampling::{IntensitySampler, SamplerSettings};

let lattice = HemisphereLattice::new(1).unwrap();
let sampler = IntensitySampler::new(&lattice, SamplerSettings::default()).unwrap();

let image = Array2::from_elem((32, 32), 2.0);
let intensities = sampler.intensities_still(&image, 5, 1e-3).unwrap();
assert_eq!(intensities.dim(), (5, 42));
```

## Features

- `parallel`: evaluate photoreceptors of a frame on the rayon pool
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod grid;
pub mod source;
pub mod kernel;
pub mod sampler;

pub use error::{SamplingError, SamplingResult};
pub use grid::{CandidateCells, PlaneWindow, SamplingGrid};
pub use source::{dynamic_to_array, gray_to_array, ImageSource};
pub use kernel::{VonMisesFisherKernel, DEFAULT_KAPPA};
pub use sampler::{IntensitySampler, SamplerSettings, SamplingMode, SamplingRequest};
