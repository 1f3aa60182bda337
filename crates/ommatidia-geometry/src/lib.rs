// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Ommatidia Geometry

Hexagonal lattice of a superposition compound eye.

## Overview

- [`ids`]: ring / local addressing and dense global ids
- [`neighbors`]: per-slot neighbor rule tables
- [`projection`]: eye sphere -> screen sphere -> plane maps
- [`lattice`]: units, photoreceptors and the wiring builder
- [`positions`]: coordinate export of units and photoreceptors

## Example

```rust
use ommatidia_geometry::{HemisphereLattice, PositionQuery};

let lattice = HemisphereLattice::new(2).unwrap();
assert_eq!(lattice.real_count(), 19);

let positions = lattice.positions(&PositionQuery::parse("cartesian3D", "center", false).unwrap());
assert_eq!(positions.len(), 19);
```
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod ids;
pub mod lattice;
pub mod neighbors;
pub mod positions;
pub mod projection;

pub use error::{GeometryError, GeometryResult};
pub use ids::{global_id, ommatidia_count, ring_size, LatticePosition, UnitId};
pub use lattice::{
    HemisphereLattice, LatticeBuilder, Ommatidium, Photoreceptor, CENTER_SLOT, SLOTS_PER_OMMATIDIUM,
};
pub use neighbors::{neighbor_ids, resolve_neighbors, ResolvedNeighbors, SlotRules};
pub use positions::{CoordinateSystem, PhotoreceptorSubset, PositionQuery, Positions};
pub use projection::{
    AlbersProjection, EquidistantProjection, EyeToScreenMap, PlanePoint, ProjectionChain, ScreenToPlaneMap,
    SphereToSphereMap, SphericalPoint,
};
