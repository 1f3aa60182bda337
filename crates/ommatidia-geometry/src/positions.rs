// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Position export in spherical, 3D and 2D cartesian coordinates

use core::f64::consts::FRAC_PI_2;
use core::fmt;
use core::str::FromStr;

use ndarray::Array1;

use crate::error::{GeometryError, GeometryResult};
use crate::lattice::{HemisphereLattice, Ommatidium, CENTER_SLOT, SLOTS_PER_OMMATIDIUM};
use crate::projection::SphericalPoint;

/// Coordinate system of exported positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateSystem {
    Spherical,
    Cartesian3D,
    Cartesian2D,
}

impl CoordinateSystem {
    pub const ALL: [CoordinateSystem; 3] = [
        CoordinateSystem::Spherical,
        CoordinateSystem::Cartesian3D,
        CoordinateSystem::Cartesian2D,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateSystem::Spherical => "spherical",
            CoordinateSystem::Cartesian3D => "cartesian3D",
            CoordinateSystem::Cartesian2D => "cartesian2D",
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateSystem {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| GeometryError::UnknownCoordinateSystem {
                given: s.to_string(),
                valid: Self::ALL.map(|c| c.as_str()).join(", "),
            })
    }
}

/// Which photoreceptors contribute a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhotoreceptorSubset {
    /// All seven slots, screen points
    All,
    /// Slots 1..=6, screen points
    Periphery,
    /// One eye point per unit
    Center,
}

impl PhotoreceptorSubset {
    pub const ALL: [PhotoreceptorSubset; 3] = [
        PhotoreceptorSubset::All,
        PhotoreceptorSubset::Periphery,
        PhotoreceptorSubset::Center,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoreceptorSubset::All => "all",
            PhotoreceptorSubset::Periphery => "R1toR6",
            PhotoreceptorSubset::Center => "center",
        }
    }

    fn slots(&self) -> core::ops::Range<usize> {
        match self {
            PhotoreceptorSubset::All => CENTER_SLOT..SLOTS_PER_OMMATIDIUM,
            PhotoreceptorSubset::Periphery => CENTER_SLOT + 1..SLOTS_PER_OMMATIDIUM,
            PhotoreceptorSubset::Center => CENTER_SLOT..CENTER_SLOT + 1,
        }
    }
}

impl fmt::Display for PhotoreceptorSubset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhotoreceptorSubset {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "periphery" => Ok(PhotoreceptorSubset::Periphery),
            _ => Self::ALL
                .into_iter()
                .find(|c| c.as_str() == s)
                .ok_or_else(|| GeometryError::UnknownSubset {
                    given: s.to_string(),
                    valid: Self::ALL.map(|c| c.as_str()).join(", "),
                }),
        }
    }
}

/// What [`HemisphereLattice::positions`] exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionQuery {
    pub coordinates: CoordinateSystem,
    pub subset: PhotoreceptorSubset,
    pub include_border: bool,
}

impl PositionQuery {
    pub fn new(coordinates: CoordinateSystem, subset: PhotoreceptorSubset, include_border: bool) -> Self {
        PositionQuery {
            coordinates,
            subset,
            include_border,
        }
    }

    /// Parse the string form used by configuration and scripts
    pub fn parse(coordinates: &str, subset: &str, include_border: bool) -> GeometryResult<Self> {
        Ok(Self::new(coordinates.parse()?, subset.parse()?, include_border))
    }
}

impl Default for PositionQuery {
    fn default() -> Self {
        Self::new(CoordinateSystem::Spherical, PhotoreceptorSubset::Center, true)
    }
}

/// Exported positions, one entry per selected unit or photoreceptor
#[derive(Debug, Clone, PartialEq)]
pub enum Positions {
    Spherical {
        lat: Array1<f64>,
        long: Array1<f64>,
    },
    Cartesian3D {
        x: Array1<f64>,
        y: Array1<f64>,
        z: Array1<f64>,
    },
    Cartesian2D {
        x: Array1<f64>,
        y: Array1<f64>,
    },
}

impl Positions {
    fn from_points(points: &[SphericalPoint], coordinates: CoordinateSystem) -> Self {
        match coordinates {
            CoordinateSystem::Spherical => Positions::Spherical {
                lat: column(points, |p| p.lat),
                long: column(points, |p| p.long),
            },
            CoordinateSystem::Cartesian3D => Positions::Cartesian3D {
                x: column(points, |p| p.to_unit_vector()[0]),
                y: column(points, |p| p.to_unit_vector()[1]),
                z: column(points, |p| p.to_unit_vector()[2]),
            },
            CoordinateSystem::Cartesian2D => Positions::Cartesian2D {
                x: column(points, |p| p.lat / FRAC_PI_2 * p.long.cos()),
                y: column(points, |p| p.lat / FRAC_PI_2 * p.long.sin()),
            },
        }
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        match self {
            Positions::Spherical { .. } => CoordinateSystem::Spherical,
            Positions::Cartesian3D { .. } => CoordinateSystem::Cartesian3D,
            Positions::Cartesian2D { .. } => CoordinateSystem::Cartesian2D,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Positions::Spherical { lat, .. } => lat.len(),
            Positions::Cartesian3D { x, .. } => x.len(),
            Positions::Cartesian2D { x, .. } => x.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn column(points: &[SphericalPoint], f: impl Fn(&SphericalPoint) -> f64) -> Array1<f64> {
    points.iter().map(f).collect()
}

impl HemisphereLattice {
    /// Spherical points of the selected subset, unit-major then slot order
    ///
    /// Empty slots and border units contribute the origin for the
    /// photoreceptor subsets so every unit yields the same count.
    pub fn spherical_points(&self, subset: PhotoreceptorSubset, include_border: bool) -> Vec<SphericalPoint> {
        let units: &[Ommatidium] = if include_border {
            self.units()
        } else {
            self.real_units()
        };

        match subset {
            PhotoreceptorSubset::Center => units.iter().map(|u| u.eye_point()).collect(),
            _ => units
                .iter()
                .flat_map(|u| subset.slots().map(move |slot| u.screen_point(slot)))
                .collect(),
        }
    }

    pub fn positions(&self, query: &PositionQuery) -> Positions {
        let points = self.spherical_points(query.subset, query.include_border);
        Positions::from_points(&points, query.coordinates)
    }
}
