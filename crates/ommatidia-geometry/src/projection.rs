// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Projection chain from the eye sphere to the sampling plane.

```text
eye sphere --EyeToScreenMap--> screen sphere --ScreenToPlaneMap--> plane
```

Spherical points use `lat` as the polar angle from the +z axis and `long`
as the azimuth. Both maps are trait objects so a lattice can be built
against any pair of implementations.
*/

use core::f64::consts::FRAC_PI_2;
use core::fmt;
use std::sync::Arc;

use ndarray::Array2;
use ommatidia_config::{ProjectionConfig, ScreenMapKind};
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, GeometryResult};

/// Point on a sphere, `lat` measured from the pole
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SphericalPoint {
    pub lat: f64,
    pub long: f64,
}

impl SphericalPoint {
    pub fn new(lat: f64, long: f64) -> Self {
        SphericalPoint { lat, long }
    }

    /// Embedding on the unit sphere
    pub fn to_unit_vector(&self) -> [f64; 3] {
        let (sin_lat, cos_lat) = self.lat.sin_cos();
        let (sin_long, cos_long) = self.long.sin_cos();
        [sin_lat * cos_long, sin_lat * sin_long, cos_lat]
    }

    /// Direction of `v` on a sphere of radius `radius`
    pub fn from_vector(v: [f64; 3], radius: f64) -> Self {
        let lat = (v[2] / radius).clamp(-1.0, 1.0).acos();
        let long = v[1].atan2(v[0]);
        SphericalPoint { lat, long }
    }

    /// Cosine of the angle between two directions
    pub fn dot(&self, other: &SphericalPoint) -> f64 {
        let a = self.to_unit_vector();
        let b = other.to_unit_vector();
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }
}

/// Point on the sampling plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanePoint {
    pub x: f64,
    pub y: f64,
}

/// Maps a point on the eye sphere, viewed along `direction`, to the screen sphere
pub trait EyeToScreenMap: Send + Sync + fmt::Debug {
    fn map(&self, eye_point: SphericalPoint, direction: SphericalPoint) -> SphericalPoint;
}

/// Flattens the screen sphere onto the sampling plane
pub trait ScreenToPlaneMap: Send + Sync + fmt::Debug {
    fn map(&self, screen_point: SphericalPoint) -> PlanePoint;

    /// Element-wise map over a grid of screen coordinates, returns `(x, y)`
    fn map_grid(&self, lat: &Array2<f64>, long: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        let points = Array2::from_shape_fn(lat.dim(), |idx| {
            self.map(SphericalPoint::new(lat[idx], long[idx]))
        });
        (points.mapv(|p| p.x), points.mapv(|p| p.y))
    }
}

/// Ray cast from the eye sphere to a concentric screen sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereToSphereMap {
    eye_radius: f64,
    screen_radius: f64,
}

impl SphereToSphereMap {
    /// The eye sphere must sit strictly inside the screen sphere
    pub fn new(eye_radius: f64, screen_radius: f64) -> GeometryResult<Self> {
        if !(eye_radius.is_finite() && eye_radius > 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "eye_radius must be positive, got {}",
                eye_radius
            )));
        }
        if !(screen_radius.is_finite() && screen_radius > eye_radius) {
            return Err(GeometryError::InvalidParameter(format!(
                "screen_radius {} must be larger than eye_radius {}",
                screen_radius, eye_radius
            )));
        }
        Ok(SphereToSphereMap {
            eye_radius,
            screen_radius,
        })
    }

    pub fn eye_radius(&self) -> f64 {
        self.eye_radius
    }

    pub fn screen_radius(&self) -> f64 {
        self.screen_radius
    }
}

impl EyeToScreenMap for SphereToSphereMap {
    fn map(&self, eye_point: SphericalPoint, direction: SphericalPoint) -> SphericalPoint {
        let u = eye_point.to_unit_vector();
        let p = [u[0] * self.eye_radius, u[1] * self.eye_radius, u[2] * self.eye_radius];
        let d = direction.to_unit_vector();

        // |p + t d| = screen_radius, forward intersection; c < 0 so a root exists
        let b = p[0] * d[0] + p[1] * d[1] + p[2] * d[2];
        let c = self.eye_radius * self.eye_radius - self.screen_radius * self.screen_radius;
        let t = -b + (b * b - c).sqrt();

        let q = [p[0] + t * d[0], p[1] + t * d[1], p[2] + t * d[2]];
        SphericalPoint::from_vector(q, self.screen_radius)
    }
}

/// Albers equal-area conic projection of the screen sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbersProjection {
    radius: f64,
    origin_longitude: f64,
    n: f64,
    c: f64,
    rho0: f64,
}

impl AlbersProjection {
    /// Latitude arguments are geographic (measured from the equator)
    pub fn new(
        radius: f64,
        origin_latitude: f64,
        origin_longitude: f64,
        standard_parallel_1: f64,
        standard_parallel_2: f64,
    ) -> Self {
        let n = (standard_parallel_1.sin() + standard_parallel_2.sin()) / 2.0;
        let c = standard_parallel_1.cos().powi(2) + 2.0 * n * standard_parallel_1.sin();
        let rho0 = radius * (c - 2.0 * n * origin_latitude.sin()).max(0.0).sqrt() / n;
        AlbersProjection {
            radius,
            origin_longitude,
            n,
            c,
            rho0,
        }
    }

    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self::new(
            config.screen_radius,
            config.origin_latitude,
            config.origin_longitude,
            config.standard_parallel_1,
            config.standard_parallel_2,
        )
    }
}

impl ScreenToPlaneMap for AlbersProjection {
    fn map(&self, screen_point: SphericalPoint) -> PlanePoint {
        let phi = FRAC_PI_2 - screen_point.lat;
        let rho = self.radius * (self.c - 2.0 * self.n * phi.sin()).max(0.0).sqrt() / self.n;
        let theta = self.n * (screen_point.long - self.origin_longitude);
        PlanePoint {
            x: rho * theta.sin(),
            y: self.rho0 - rho * theta.cos(),
        }
    }
}

/// Azimuthal equidistant projection around the pole
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquidistantProjection {
    radius: f64,
}

impl EquidistantProjection {
    pub fn new(radius: f64) -> Self {
        EquidistantProjection { radius }
    }
}

impl ScreenToPlaneMap for EquidistantProjection {
    fn map(&self, screen_point: SphericalPoint) -> PlanePoint {
        let rho = self.radius * screen_point.lat;
        let (sin_long, cos_long) = screen_point.long.sin_cos();
        PlanePoint {
            x: rho * cos_long,
            y: rho * sin_long,
        }
    }
}

/// The pair of maps a lattice projects its photoreceptors through
#[derive(Debug, Clone)]
pub struct ProjectionChain {
    eye_to_screen: Arc<dyn EyeToScreenMap>,
    screen_to_plane: Arc<dyn ScreenToPlaneMap>,
}

impl ProjectionChain {
    pub fn new(
        eye_to_screen: Arc<dyn EyeToScreenMap>,
        screen_to_plane: Arc<dyn ScreenToPlaneMap>,
    ) -> Self {
        ProjectionChain {
            eye_to_screen,
            screen_to_plane,
        }
    }

    /// Sphere-to-sphere ray cast followed by the configured plane map
    ///
    /// Fails when the eye sphere does not fit inside the screen sphere.
    pub fn from_config(config: &ProjectionConfig, eye_radius: f64) -> GeometryResult<Self> {
        let eye_to_screen = Arc::new(SphereToSphereMap::new(eye_radius, config.screen_radius)?);
        let screen_to_plane: Arc<dyn ScreenToPlaneMap> = match config.screen_map {
            ScreenMapKind::Albers => Arc::new(AlbersProjection::from_config(config)),
            ScreenMapKind::Equidistant => Arc::new(EquidistantProjection::new(config.screen_radius)),
        };
        tracing::debug!(
            target: "ommatidia-geometry",
            "Projection chain: eye radius {} -> screen radius {} -> {} plane",
            eye_radius,
            config.screen_radius,
            config.screen_map.as_str()
        );
        Ok(Self::new(eye_to_screen, screen_to_plane))
    }

    pub fn eye_to_screen(&self, eye_point: SphericalPoint, direction: SphericalPoint) -> SphericalPoint {
        self.eye_to_screen.map(eye_point, direction)
    }

    pub fn screen_to_plane(&self, screen_point: SphericalPoint) -> PlanePoint {
        self.screen_to_plane.map(screen_point)
    }

    pub fn screen_to_plane_grid(&self, lat: &Array2<f64>, long: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        self.screen_to_plane.map_grid(lat, long)
    }
}

impl Default for ProjectionChain {
    /// Unit eye inside the default screen sphere, Albers plane map
    fn default() -> Self {
        let config = ProjectionConfig::default();
        let eye_to_screen = SphereToSphereMap {
            eye_radius: 1.0,
            screen_radius: config.screen_radius,
        };
        Self::new(Arc::new(eye_to_screen), Arc::new(AlbersProjection::from_config(&config)))
    }
}
