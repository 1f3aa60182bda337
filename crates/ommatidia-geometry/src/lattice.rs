// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Hemispherical ommatidium lattice with superposition wiring.

Units are laid out on rings `0..=R`, covering the hemisphere from the pole
(ring 0) down to latitude `R/(R+2) * pi/2`. Two extra rings of border units
are built so every real unit on ring `R` still receives its full set of
photoreceptors.

Each unit owns seven photoreceptor slots. Slot 0 looks along the unit's own
direction; slots 1..=6 are periphery photoreceptors pointing along a
neighboring unit's direction. Wiring is resolved by visiting units in
global-id order and only connecting to neighbors already built:

- incoming slot `i` of the new unit: the neighbor gains a photoreceptor in
  slot `i + 1` facing the new unit's direction
- outgoing slot `i`: the new unit gains a photoreceptor in slot `5 - i`
  (0 maps to 6) facing the neighbor's direction
*/

use core::f64::consts::{FRAC_PI_2, PI};

use ommatidia_config::OmmatidiaConfig;
use tracing::{debug, info, trace};

use crate::error::{GeometryError, GeometryResult};
use crate::ids::{ommatidia_count, ring_size, LatticePosition, UnitId};
use crate::neighbors::resolve_neighbors;
use crate::projection::{PlanePoint, ProjectionChain, SphericalPoint};

/// Photoreceptor slots per unit
pub const SLOTS_PER_OMMATIDIUM: usize = 7;
/// Slot of the photoreceptor looking along the unit's own direction
pub const CENTER_SLOT: usize = 0;

/// A photoreceptor and where it lands after projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photoreceptor {
    direction: SphericalPoint,
    screen: SphericalPoint,
    plane: PlanePoint,
}

impl Photoreceptor {
    pub fn project(projection: &ProjectionChain, eye_point: SphericalPoint, direction: SphericalPoint) -> Self {
        let screen = projection.eye_to_screen(eye_point, direction);
        let plane = projection.screen_to_plane(screen);
        Photoreceptor {
            direction,
            screen,
            plane,
        }
    }

    pub fn direction(&self) -> SphericalPoint {
        self.direction
    }

    pub fn screen_point(&self) -> SphericalPoint {
        self.screen
    }

    pub fn plane_point(&self) -> PlanePoint {
        self.plane
    }
}

/// One lattice unit, real or border
#[derive(Debug, Clone, PartialEq)]
pub struct Ommatidium {
    id: UnitId,
    position: LatticePosition,
    eye_point: SphericalPoint,
    photoreceptors: [Option<Photoreceptor>; SLOTS_PER_OMMATIDIUM],
}

impl Ommatidium {
    fn new(id: UnitId, position: LatticePosition, eye_point: SphericalPoint) -> Self {
        Ommatidium {
            id,
            position,
            eye_point,
            photoreceptors: [None; SLOTS_PER_OMMATIDIUM],
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn position(&self) -> LatticePosition {
        self.position
    }

    /// Point on the eye sphere, also the unit's optical direction
    pub fn eye_point(&self) -> SphericalPoint {
        self.eye_point
    }

    pub fn is_border(&self) -> bool {
        self.id.is_border()
    }

    pub fn photoreceptor(&self, slot: usize) -> Option<&Photoreceptor> {
        self.photoreceptors.get(slot).and_then(|p| p.as_ref())
    }

    pub fn center(&self) -> Option<&Photoreceptor> {
        self.photoreceptor(CENTER_SLOT)
    }

    /// Filled periphery slots `1..=6` in slot order
    pub fn periphery(&self) -> impl Iterator<Item = &Photoreceptor> + '_ {
        self.photoreceptors[CENTER_SLOT + 1..].iter().flatten()
    }

    pub fn periphery_count(&self) -> usize {
        self.periphery().count()
    }

    /// Screen point of `slot`, origin for an empty slot
    pub fn screen_point(&self, slot: usize) -> SphericalPoint {
        self.photoreceptor(slot)
            .map(|p| p.screen_point())
            .unwrap_or_default()
    }

    fn attach(&mut self, projection: &ProjectionChain, direction: SphericalPoint, slot: usize) {
        if let Some(previous) = self.photoreceptors[slot] {
            trace!(
                target: "ommatidia-geometry",
                "Slot {} of {} at {} rewired: {:?} -> {:?}",
                slot,
                self.id,
                self.position,
                previous.direction(),
                direction
            );
        }
        self.photoreceptors[slot] = Some(Photoreceptor::project(projection, self.eye_point, direction));
    }
}

/// Builds a [`HemisphereLattice`]
#[derive(Debug, Clone)]
pub struct LatticeBuilder {
    rings: u32,
    eye_radius: f64,
    projection: Option<ProjectionChain>,
}

impl LatticeBuilder {
    pub fn new(rings: u32) -> Self {
        LatticeBuilder {
            rings,
            eye_radius: 1.0,
            projection: None,
        }
    }

    pub fn eye_radius(mut self, eye_radius: f64) -> Self {
        self.eye_radius = eye_radius;
        self
    }

    /// Defaults to the sphere-to-sphere / Albers chain for `eye_radius`
    pub fn projection(mut self, projection: ProjectionChain) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn build(self) -> GeometryResult<HemisphereLattice> {
        if !(self.eye_radius.is_finite() && self.eye_radius > 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "eye_radius must be positive, got {}",
                self.eye_radius
            )));
        }

        let projection = match self.projection {
            Some(projection) => projection,
            None => ProjectionChain::from_config(&Default::default(), self.eye_radius)?,
        };

        let rings = self.rings;
        let outer_ring = rings + 2;
        let real_count = ommatidia_count(rings);
        let total = ommatidia_count(outer_ring);

        let mut units: Vec<Ommatidium> = Vec::with_capacity(total);
        let mut neighbors: Vec<Vec<usize>> = Vec::with_capacity(real_count);

        let mut center = Ommatidium::new(UnitId::Real(0), LatticePosition::center(), SphericalPoint::default());
        center.attach(&projection, center.eye_point, CENTER_SLOT);
        units.push(center);
        neighbors.push(vec![0]);

        for ring in 1..=outer_ring {
            let border = ring > rings;
            let lat = ring as f64 / outer_ring as f64 * FRAC_PI_2;

            for local in 0..ring_size(ring) {
                let position = LatticePosition { ring, local };
                let index = position.global_id();
                debug_assert_eq!(index, units.len());

                let long = local as f64 / ring_size(ring) as f64 * 2.0 * PI - PI;
                let eye_point = SphericalPoint::new(lat, long);
                let resolved = resolve_neighbors(position)?;

                if border {
                    units.push(Ommatidium::new(UnitId::Border, position, eye_point));
                    for (slot, target) in resolved.incoming_ids().into_iter().enumerate() {
                        if target < real_count {
                            units[target].attach(&projection, eye_point, slot + 1);
                            neighbors[target].push(index);
                        }
                    }
                    continue;
                }

                let mut unit = Ommatidium::new(UnitId::Real(index), position, eye_point);
                unit.attach(&projection, eye_point, CENTER_SLOT);
                let mut own = vec![index];

                for (slot, target) in resolved.incoming_ids().into_iter().enumerate() {
                    if target < index {
                        units[target].attach(&projection, eye_point, slot + 1);
                        neighbors[target].push(index);
                    }
                }
                for (slot, target) in resolved.outgoing_ids().into_iter().enumerate() {
                    if target < index {
                        let direction = units[target].eye_point;
                        unit.attach(&projection, direction, outgoing_slot(slot));
                        own.push(target);
                    }
                }

                units.push(unit);
                neighbors.push(own);
            }

            debug!(
                target: "ommatidia-geometry",
                "Ring {} built ({} units{})",
                ring,
                ring_size(ring),
                if border { ", border" } else { "" }
            );
        }

        info!(
            target: "ommatidia-geometry",
            "👁️ Hemisphere lattice ready: {} rings, {} ommatidia, {} border units",
            rings,
            real_count,
            total - real_count
        );

        Ok(HemisphereLattice {
            rings,
            eye_radius: self.eye_radius,
            projection,
            units,
            neighbors,
            real_count,
        })
    }
}

/// Receiving slot on a new unit for its outgoing neighbor `slot`
fn outgoing_slot(slot: usize) -> usize {
    match 5 - slot {
        0 => 6,
        s => s,
    }
}

/// A built lattice
#[derive(Debug, Clone)]
pub struct HemisphereLattice {
    rings: u32,
    eye_radius: f64,
    projection: ProjectionChain,
    units: Vec<Ommatidium>,
    neighbors: Vec<Vec<usize>>,
    real_count: usize,
}

impl HemisphereLattice {
    pub fn builder(rings: u32) -> LatticeBuilder {
        LatticeBuilder::new(rings)
    }

    /// Lattice with a unit eye radius and the default projection chain
    pub fn new(rings: u32) -> GeometryResult<Self> {
        LatticeBuilder::new(rings).build()
    }

    pub fn from_config(config: &OmmatidiaConfig) -> GeometryResult<Self> {
        let projection = ProjectionChain::from_config(&config.projection, config.lattice.eye_radius)?;
        LatticeBuilder::new(config.lattice.rings)
            .eye_radius(config.lattice.eye_radius)
            .projection(projection)
            .build()
    }

    pub fn rings(&self) -> u32 {
        self.rings
    }

    pub fn eye_radius(&self) -> f64 {
        self.eye_radius
    }

    pub fn projection(&self) -> &ProjectionChain {
        &self.projection
    }

    /// Real units, `3R(R+1)+1`
    pub fn real_count(&self) -> usize {
        self.real_count
    }

    /// Real and border units
    pub fn total_count(&self) -> usize {
        self.units.len()
    }

    /// All units in arena order, real units first
    pub fn units(&self) -> &[Ommatidium] {
        &self.units
    }

    pub fn real_units(&self) -> &[Ommatidium] {
        &self.units[..self.real_count]
    }

    pub fn unit(&self, index: usize) -> Option<&Ommatidium> {
        self.units.get(index)
    }

    /// Per real unit: itself followed by every unit it exchanges a photoreceptor with
    pub fn neighbors(&self) -> &[Vec<usize>] {
        &self.neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outgoing_slot_avoids_center() {
        let slots: Vec<usize> = (0..6).map(outgoing_slot).collect();
        assert_eq!(slots, vec![5, 4, 3, 2, 1, 6]);
    }

    #[test]
    fn test_eye_larger_than_screen_is_rejected() {
        let err = LatticeBuilder::new(2).eye_radius(20.0).build().unwrap_err();
        assert!(matches!(err, GeometryError::InvalidParameter(ref msg) if msg.contains("screen_radius")));
    }

    #[test]
    fn test_invalid_eye_radius() {
        let err = LatticeBuilder::new(2).eye_radius(0.0).build().unwrap_err();
        assert!(matches!(err, GeometryError::InvalidParameter(_)));
    }

    #[test]
    fn test_zero_rings_has_only_center() {
        let lattice = HemisphereLattice::new(0).unwrap();
        assert_eq!(lattice.real_count(), 1);
        assert_eq!(lattice.total_count(), 19);
        assert_eq!(lattice.neighbors()[0][0], 0);
        assert!(lattice.units()[1..].iter().all(|u| u.is_border()));
    }

    #[test]
    fn test_center_photoreceptor_looks_ahead() {
        let lattice = HemisphereLattice::new(2).unwrap();
        for unit in lattice.real_units() {
            let center = unit.center().unwrap();
            assert_eq!(center.direction(), unit.eye_point());
        }
        for unit in &lattice.units()[lattice.real_count()..] {
            assert!(unit.center().is_none());
        }
    }
}
