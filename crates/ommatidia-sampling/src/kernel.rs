// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Von Mises-Fisher weighting on the sphere

use ommatidia_geometry::SphericalPoint;

use crate::error::{SamplingError, SamplingResult};

/// Concentration used when none is configured
pub const DEFAULT_KAPPA: f64 = 100.0;

/// Spherical analogue of a Gaussian centered on a reference direction
///
/// Weights are `exp(kappa * <u_ref, u_i>)` normalized to sum to 1; the
/// normalization constant of the distribution cancels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VonMisesFisherKernel {
    kappa: f64,
}

impl VonMisesFisherKernel {
    pub fn new(kappa: f64) -> SamplingResult<Self> {
        if !(kappa.is_finite() && kappa > 0.0) {
            return Err(SamplingError::InvalidParameter(format!(
                "kappa must be positive and finite, got {}",
                kappa
            )));
        }
        Ok(VonMisesFisherKernel { kappa })
    }

    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    /// Normalized weights of `points` around `reference`
    pub fn weights<const N: usize>(&self, reference: SphericalPoint, points: &[SphericalPoint; N]) -> [f64; N] {
        let exponents = points.map(|p| self.kappa * reference.dot(&p));
        let max = exponents.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let unnormalized = exponents.map(|e| (e - max).exp());
        let total: f64 = unnormalized.iter().sum();
        unnormalized.map(|w| w / total)
    }
}

impl Default for VonMisesFisherKernel {
    fn default() -> Self {
        VonMisesFisherKernel { kappa: DEFAULT_KAPPA }
    }
}
