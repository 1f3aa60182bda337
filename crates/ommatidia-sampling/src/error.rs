// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for intensity sampling

use ommatidia_geometry::GeometryError;

/// Result type for sampling operations
pub type SamplingResult<T> = Result<T, SamplingError>;

/// Errors that can occur while sampling photoreceptor intensities
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplingError {
    #[error("No field '{field}' in image source, available: [{}]", .available.join(", "))]
    MissingField { field: String, available: Vec<String> },

    #[error(
        "Grid index out of bounds: array shape {shape:?}, latitude indices {lat_indices:?}, longitude indices {long_indices:?}"
    )]
    GridIndexOutOfBounds {
        shape: (usize, usize),
        lat_indices: [usize; 2],
        long_indices: [usize; 2],
    },

    #[error("Projected sampling window has zero extent along {axis}")]
    DegenerateWindow { axis: &'static str },

    #[error("Image has no pixels (shape {rows}x{cols})")]
    EmptyImage { rows: usize, cols: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
