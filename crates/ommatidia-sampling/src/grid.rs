// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Screen-sphere sampling grid and its projected plane window.

The grid is a meshgrid over the screen hemisphere with longitude along rows
and latitude along columns:

```text
           lat 0 ........ pi/2
long -pi   [0,0]  ...  [0,c-1]
  ...
long  pi   [r-1,0] ... [r-1,c-1]
```

Projecting it through the plane map gives a [`PlaneWindow`]: per grid cell,
the fractional `(row, col)` pixel position the cell reads from the image.
*/

use core::f64::consts::{FRAC_PI_2, PI};

use ndarray::{Array1, Array2, Zip};
use ommatidia_geometry::{ProjectionChain, SphericalPoint};
use rand::Rng;

use crate::error::{SamplingError, SamplingResult};

/// Uniform latitude / longitude grid on the screen sphere
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingGrid {
    lat: Array2<f64>,
    long: Array2<f64>,
}

/// The 2x2 grid cells around a photoreceptor, clamped to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateCells {
    pub lat_indices: [usize; 2],
    pub long_indices: [usize; 2],
}

impl CandidateCells {
    /// `(row, col)` of the four cells
    pub fn cells(&self) -> [(usize, usize); 4] {
        let [c0, c1] = self.lat_indices;
        let [r0, r1] = self.long_indices;
        [(r0, c0), (r0, c1), (r1, c0), (r1, c1)]
    }
}

impl SamplingGrid {
    /// `rows` longitudes over `[-pi, pi]`, `cols` latitudes over `[0, pi/2]`
    pub fn new(rows: usize, cols: usize) -> SamplingResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(SamplingError::InvalidParameter(format!(
                "sampling grid needs at least one row and column, got {}x{}",
                rows, cols
            )));
        }
        let lats = Array1::linspace(0.0, FRAC_PI_2, cols);
        let longs = Array1::linspace(-PI, PI, rows);
        let lat = Array2::from_shape_fn((rows, cols), |(_, c)| lats[c]);
        let long = Array2::from_shape_fn((rows, cols), |(r, _)| longs[r]);
        Ok(SamplingGrid { lat, long })
    }

    /// Grid sized to a lattice of `rings` rings
    pub fn for_rings(rings: u32, latitude_factor: usize, longitude_factor: usize) -> SamplingResult<Self> {
        let rings = rings as usize;
        Self::new(longitude_factor * rings, latitude_factor * rings)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.lat.dim()
    }

    pub fn lat(&self) -> &Array2<f64> {
        &self.lat
    }

    pub fn long(&self) -> &Array2<f64> {
        &self.long
    }

    pub fn point(&self, row: usize, col: usize) -> Option<SphericalPoint> {
        Some(SphericalPoint::new(*self.lat.get((row, col))?, *self.long.get((row, col))?))
    }

    /// Nearest cells to a screen point, `floor` and `ceil` per axis
    pub fn candidates(&self, screen_point: SphericalPoint) -> CandidateCells {
        let (rows, cols) = self.shape();
        let lat_f = (cols - 1) as f64 * screen_point.lat / FRAC_PI_2;
        let long_f = (rows - 1) as f64 * (screen_point.long + PI) / (2.0 * PI);
        CandidateCells {
            lat_indices: [clamp_index(lat_f.floor(), cols), clamp_index(lat_f.ceil(), cols)],
            long_indices: [clamp_index(long_f.floor(), rows), clamp_index(long_f.ceil(), rows)],
        }
    }

    pub fn project(&self, projection: &ProjectionChain) -> PlaneWindow {
        let (x, y) = projection.screen_to_plane_grid(&self.lat, &self.long);
        PlaneWindow { x, y }
    }
}

fn clamp_index(value: f64, len: usize) -> usize {
    value.max(0.0).min((len - 1) as f64) as usize
}

/// Plane position of every grid cell, `x` along image rows and `y` along columns
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneWindow {
    x: Array2<f64>,
    y: Array2<f64>,
}

impl PlaneWindow {
    pub fn new(x: Array2<f64>, y: Array2<f64>) -> Self {
        PlaneWindow { x, y }
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array2<f64> {
        &self.y
    }

    /// Translate so both axes start at 0
    pub fn shift_to_origin(&mut self) {
        let (x_min, _) = extent(&self.x);
        let (y_min, _) = extent(&self.y);
        self.x -= x_min;
        self.y -= y_min;
    }

    /// Stretch each axis so its maximum lands on `height` / `width`
    ///
    /// Expects a window already shifted to the origin.
    pub fn scale_to(&mut self, height: usize, width: usize) -> SamplingResult<()> {
        let (_, x_max) = extent(&self.x);
        let (_, y_max) = extent(&self.y);
        if !(x_max > 0.0) {
            return Err(SamplingError::DegenerateWindow { axis: "x" });
        }
        if !(y_max > 0.0) {
            return Err(SamplingError::DegenerateWindow { axis: "y" });
        }
        self.x *= height as f64 / x_max;
        self.y *= width as f64 / y_max;
        Ok(())
    }

    /// One random-walk step, reflected back into `[0, height] x [0, width]`
    pub fn jitter<R: Rng + ?Sized>(&mut self, rng: &mut R, max_jitter: f64, height: usize, width: usize) {
        let dx = random_offset(rng, max_jitter);
        let dy = random_offset(rng, max_jitter);
        self.x += dx;
        self.y += dy;
        reflect(&mut self.x, height as f64);
        reflect(&mut self.y, width as f64);
    }

    /// Bilinear sample of `image` at every window position
    pub fn resample(&self, image: &Array2<f64>) -> SamplingResult<Array2<f64>> {
        let (rows, cols) = image.dim();
        if rows == 0 || cols == 0 {
            return Err(SamplingError::EmptyImage { rows, cols });
        }
        Ok(Zip::from(&self.x)
            .and(&self.y)
            .map_collect(|&row, &col| bilinear(image, row, col)))
    }
}

fn random_offset<R: Rng + ?Sized>(rng: &mut R, max_jitter: f64) -> f64 {
    if max_jitter > 0.0 {
        rng.gen_range(-max_jitter..max_jitter)
    } else {
        0.0
    }
}

/// Overflow past `limit` first, then underflow below 0
fn reflect(axis: &mut Array2<f64>, limit: f64) {
    let (_, max) = extent(axis);
    if max > limit {
        *axis -= 2.0 * (max - limit);
    }
    let (min, _) = extent(axis);
    if min < 0.0 {
        *axis -= 2.0 * min;
    }
}

fn extent(values: &Array2<f64>) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Bilinear interpolation at a fractional pixel position, edges replicated
///
/// `image` must be non-empty.
pub(crate) fn bilinear(image: &Array2<f64>, row: f64, col: f64) -> f64 {
    let (rows, cols) = image.dim();
    let row = row.clamp(0.0, (rows - 1) as f64);
    let col = col.clamp(0.0, (cols - 1) as f64);

    let r0 = row.floor() as usize;
    let c0 = col.floor() as usize;
    let r1 = (r0 + 1).min(rows - 1);
    let c1 = (c0 + 1).min(cols - 1);
    let fr = row - r0 as f64;
    let fc = col - c0 as f64;

    let top = image[(r0, c0)] * (1.0 - fc) + image[(r0, c1)] * fc;
    let bottom = image[(r1, c0)] * (1.0 - fc) + image[(r1, c1)] * fc;
    top * (1.0 - fr) + bottom * fr
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_grid_layout() {
        let grid = SamplingGrid::for_rings(2, 3, 20).unwrap();
        assert_eq!(grid.shape(), (40, 6));
        assert_eq!(grid.lat()[(5, 0)], 0.0);
        assert_abs_diff_eq!(grid.lat()[(5, 5)], FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.long()[(0, 3)], -PI, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.long()[(39, 3)], PI, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(matches!(
            SamplingGrid::for_rings(0, 3, 20),
            Err(SamplingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_candidates_are_clamped() {
        let grid = SamplingGrid::new(20, 3).unwrap();
        let cells = grid.candidates(SphericalPoint::new(FRAC_PI_2 * 1.2, PI));
        assert_eq!(cells.lat_indices, [2, 2]);
        assert_eq!(cells.long_indices, [19, 19]);

        let cells = grid.candidates(SphericalPoint::new(FRAC_PI_2 / 4.0, 0.0));
        assert_eq!(cells.lat_indices, [0, 1]);
        assert_eq!(cells.long_indices, [9, 10]);
    }

    #[test]
    fn test_bilinear() {
        let image = Array2::from_shape_vec((2, 2), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_abs_diff_eq!(bilinear(&image, 0.5, 0.5), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(bilinear(&image, 1.0, 0.0), 2.0, epsilon = 1e-12);
        // edges replicate
        assert_abs_diff_eq!(bilinear(&image, 5.0, -3.0), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_resample_empty_image() {
        let window = PlaneWindow::new(Array2::zeros((2, 2)), Array2::zeros((2, 2)));
        assert_eq!(
            window.resample(&Array2::zeros((0, 4))),
            Err(SamplingError::EmptyImage { rows: 0, cols: 4 })
        );
        let constant = window.resample(&Array2::from_elem((3, 3), 4.0)).unwrap();
        assert!(constant.iter().all(|v| *v == 4.0));
    }

    #[test]
    fn test_scale_to_image() {
        let x = Array2::from_shape_vec((1, 3), vec![-1.0, 0.0, 1.0]).unwrap();
        let y = Array2::from_shape_vec((1, 3), vec![2.0, 3.0, 4.0]).unwrap();
        let mut window = PlaneWindow::new(x, y);
        window.shift_to_origin();
        window.scale_to(10, 20).unwrap();
        assert_eq!(window.x().as_slice().unwrap(), &[0.0, 5.0, 10.0]);
        assert_eq!(window.y().as_slice().unwrap(), &[0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_degenerate_window() {
        let mut window = PlaneWindow::new(Array2::zeros((2, 2)), Array2::ones((2, 2)));
        window.shift_to_origin();
        assert_eq!(window.scale_to(4, 4), Err(SamplingError::DegenerateWindow { axis: "x" }));
    }

    #[test]
    fn test_jitter_stays_reflected() {
        let x = Array2::from_shape_vec((1, 2), vec![0.0, 4.0]).unwrap();
        let y = Array2::from_shape_vec((1, 2), vec![0.0, 4.0]).unwrap();
        let mut window = PlaneWindow::new(x, y);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            window.jitter(&mut rng, 1.0, 5, 5);
            let (lo, hi) = extent(window.x());
            assert!(lo >= 0.0 && hi <= 5.0, "x window [{}, {}]", lo, hi);
            let (lo, hi) = extent(window.y());
            assert!(lo >= 0.0 && hi <= 5.0, "y window [{}, {}]", lo, hi);
        }
    }

    #[test]
    fn test_reflect_overflow() {
        let mut axis = Array2::from_shape_vec((1, 2), vec![1.0, 6.0]).unwrap();
        reflect(&mut axis, 5.0);
        // wider than the limit: pushed below 0 then mirrored back past it
        assert_eq!(axis.as_slice().unwrap(), &[1.0, 6.0]);

        let mut axis = Array2::from_shape_vec((1, 2), vec![-0.5, 2.0]).unwrap();
        reflect(&mut axis, 5.0);
        assert_eq!(axis.as_slice().unwrap(), &[0.5, 3.0]);
    }
}
