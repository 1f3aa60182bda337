// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Per-photoreceptor light intensities from a 2-D image.

The sampler resamples the image onto a dense screen grid (projected onto the
plane), then reads each periphery photoreceptor of every real unit from the
2x2 grid cells around its screen point, weighted by a von Mises-Fisher
kernel. Output is `[steps][photoreceptors]`, photoreceptors in unit-major,
slot-minor order.

- still image: the window is fitted to the image once and the single frame is
  repeated for every step
- jittered: the window keeps its plane size and random-walks over the image,
  one frame per step
*/

use ndarray::{Array1, Array2};
use ommatidia_config::SamplingConfig;
use ommatidia_geometry::{HemisphereLattice, PhotoreceptorSubset, SphericalPoint};
use rand::Rng;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{SamplingError, SamplingResult};
use crate::grid::{PlaneWindow, SamplingGrid};
use crate::source::ImageSource;
use crate::kernel::VonMisesFisherKernel;

/// How the sampling window moves over time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    Still,
    Jittered,
}

/// One call's worth of time parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingRequest {
    pub steps: usize,
    pub dt: f64,
    pub mode: SamplingMode,
}

impl SamplingRequest {
    pub fn still(steps: usize, dt: f64) -> Self {
        SamplingRequest {
            steps,
            dt,
            mode: SamplingMode::Still,
        }
    }

    pub fn jittered(steps: usize, dt: f64) -> Self {
        SamplingRequest {
            steps,
            dt,
            mode: SamplingMode::Jittered,
        }
    }

    pub fn from_config(config: &SamplingConfig) -> Self {
        let mode = if config.still_image {
            SamplingMode::Still
        } else {
            SamplingMode::Jittered
        };
        SamplingRequest {
            steps: config.steps,
            dt: config.dt,
            mode,
        }
    }
}

/// Sampler parameters that stay fixed for a lattice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSettings {
    pub kappa: f64,
    /// Integration time the image values were recorded over, in seconds
    pub exposure_reference: f64,
    pub grid_latitude_factor: usize,
    pub grid_longitude_factor: usize,
    /// Largest per-axis window offset per jittered step, image units
    pub max_jitter: f64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self::from(&SamplingConfig::default())
    }
}

impl From<&SamplingConfig> for SamplerSettings {
    fn from(config: &SamplingConfig) -> Self {
        SamplerSettings {
            kappa: config.kappa,
            exposure_reference: config.exposure_reference,
            grid_latitude_factor: config.grid_latitude_factor,
            grid_longitude_factor: config.grid_longitude_factor,
            max_jitter: config.max_jitter,
        }
    }
}

/// Samples images for one lattice
#[derive(Debug, Clone)]
pub struct IntensitySampler {
    grid: SamplingGrid,
    window: PlaneWindow,
    kernel: VonMisesFisherKernel,
    photoreceptors: Vec<SphericalPoint>,
    exposure_reference: f64,
    max_jitter: f64,
}

impl IntensitySampler {
    pub fn new(lattice: &HemisphereLattice, settings: SamplerSettings) -> SamplingResult<Self> {
        let kernel = VonMisesFisherKernel::new(settings.kappa)?;
        if !(settings.exposure_reference.is_finite() && settings.exposure_reference > 0.0) {
            return Err(SamplingError::InvalidParameter(format!(
                "exposure_reference must be positive, got {}",
                settings.exposure_reference
            )));
        }
        if !(settings.max_jitter.is_finite() && settings.max_jitter >= 0.0) {
            return Err(SamplingError::InvalidParameter(format!(
                "max_jitter must be non-negative, got {}",
                settings.max_jitter
            )));
        }

        let grid = SamplingGrid::for_rings(
            lattice.rings(),
            settings.grid_latitude_factor,
            settings.grid_longitude_factor,
        )?;
        let window = grid.project(lattice.projection());

        let photoreceptors = lattice.spherical_points(PhotoreceptorSubset::Periphery, false);
        if let Some(index) = photoreceptors
            .iter()
            .position(|p| !(p.lat.is_finite() && p.long.is_finite()))
        {
            return Err(SamplingError::InvalidParameter(format!(
                "photoreceptor {} has a non-finite screen position",
                index
            )));
        }

        debug!(
            target: "ommatidia-sampling",
            "Sampling grid {:?} for {} photoreceptors (kappa {})",
            grid.shape(),
            photoreceptors.len(),
            kernel.kappa()
        );

        Ok(IntensitySampler {
            grid,
            window,
            kernel,
            photoreceptors,
            exposure_reference: settings.exposure_reference,
            max_jitter: settings.max_jitter,
        })
    }

    pub fn from_config(lattice: &HemisphereLattice, config: &SamplingConfig) -> SamplingResult<Self> {
        Self::new(lattice, SamplerSettings::from(config))
    }

    pub fn grid(&self) -> &SamplingGrid {
        &self.grid
    }

    pub fn kernel(&self) -> &VonMisesFisherKernel {
        &self.kernel
    }

    /// Number of output columns
    pub fn photoreceptor_count(&self) -> usize {
        self.photoreceptors.len()
    }

    /// Intensities of `image`, `[steps][photoreceptors]`
    ///
    /// `rng` drives the window random walk and is untouched in still mode.
    pub fn intensities<R: Rng + ?Sized>(
        &self,
        image: &Array2<f64>,
        request: &SamplingRequest,
        rng: &mut R,
    ) -> SamplingResult<Array2<f64>> {
        match request.mode {
            SamplingMode::Still => self.intensities_still(image, request.steps, request.dt),
            SamplingMode::Jittered => self.intensities_jittered(image, request.steps, request.dt, rng),
        }
    }

    /// Fit the window to the image once and repeat the frame for every step
    pub fn intensities_still(&self, image: &Array2<f64>, steps: usize, dt: f64) -> SamplingResult<Array2<f64>> {
        let exposed = self.expose(image, dt)?;
        let (height, width) = exposed.dim();

        let mut window = self.window.clone();
        window.shift_to_origin();
        window.scale_to(height, width)?;
        let frame = self.sample_frame(&window.resample(&exposed)?)?;

        let mut output = Array2::<f64>::zeros((steps, self.photoreceptor_count()));
        for mut row in output.rows_mut() {
            row.assign(&frame);
        }

        info!(
            target: "ommatidia-sampling",
            "📷 Still image {}x{} sampled: {} steps x {} photoreceptors",
            height,
            width,
            steps,
            self.photoreceptor_count()
        );
        Ok(output)
    }

    /// Random-walk the unscaled window over the image, one frame per step
    pub fn intensities_jittered<R: Rng + ?Sized>(
        &self,
        image: &Array2<f64>,
        steps: usize,
        dt: f64,
        rng: &mut R,
    ) -> SamplingResult<Array2<f64>> {
        let exposed = self.expose(image, dt)?;
        let (height, width) = exposed.dim();

        let mut window = self.window.clone();
        window.shift_to_origin();

        let mut output = Array2::<f64>::zeros((steps, self.photoreceptor_count()));
        for (step, mut row) in output.rows_mut().into_iter().enumerate() {
            window.jitter(rng, self.max_jitter, height, width);
            let frame = self.sample_frame(&window.resample(&exposed)?)?;
            row.assign(&frame);
            debug!(target: "ommatidia-sampling", "Step {} sampled", step);
        }

        info!(
            target: "ommatidia-sampling",
            "📷 Jittered image {}x{} sampled: {} steps x {} photoreceptors",
            height,
            width,
            steps,
            self.photoreceptor_count()
        );
        Ok(output)
    }

    /// Rescale photon counts from the reference exposure to `dt`
    fn expose(&self, image: &Array2<f64>, dt: f64) -> SamplingResult<Array2<f64>> {
        let (rows, cols) = image.dim();
        if rows == 0 || cols == 0 {
            return Err(SamplingError::EmptyImage { rows, cols });
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SamplingError::InvalidParameter(format!("dt must be positive, got {}", dt)));
        }
        Ok(image * (dt / self.exposure_reference))
    }

    /// Looks up `field` in `source` and samples it
    pub fn intensities_from_source<R: Rng + ?Sized>(
        &self,
        source: &ImageSource,
        field: &str,
        request: &SamplingRequest,
        rng: &mut R,
    ) -> SamplingResult<Array2<f64>> {
        self.intensities(source.field(field)?, request, rng)
    }

    /// One intensity per photoreceptor from an image already resampled onto the grid
    pub fn sample_frame(&self, resampled: &Array2<f64>) -> SamplingResult<Array1<f64>> {
        #[cfg(feature = "parallel")]
        let values = self
            .photoreceptors
            .par_iter()
            .map(|p| self.sample_point(resampled, *p))
            .collect::<SamplingResult<Vec<f64>>>()?;

        #[cfg(not(feature = "parallel"))]
        let values = self
            .photoreceptors
            .iter()
            .map(|p| self.sample_point(resampled, *p))
            .collect::<SamplingResult<Vec<f64>>>()?;

        Ok(Array1::from(values))
    }

    /// Kernel weights of the four candidate cells around `point`, in cell order
    pub fn weights(&self, point: SphericalPoint) -> [f64; 4] {
        let cells = self.grid.candidates(point).cells();
        let directions = cells.map(|(row, col)| {
            SphericalPoint::new(self.grid.lat()[(row, col)], self.grid.long()[(row, col)])
        });
        self.kernel.weights(point, &directions)
    }

    fn sample_point(&self, resampled: &Array2<f64>, point: SphericalPoint) -> SamplingResult<f64> {
        let candidates = self.grid.candidates(point);
        let weights = self.weights(point);

        let mut total = 0.0;
        for ((row, col), weight) in candidates.cells().into_iter().zip(weights) {
            let pixel = resampled
                .get((row, col))
                .ok_or_else(|| SamplingError::GridIndexOutOfBounds {
                    shape: resampled.dim(),
                    lat_indices: candidates.lat_indices,
                    long_indices: candidates.long_indices,
                })?;
            total += pixel * weight;
        }
        Ok(total)
    }
}
