// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Neighbor resolution for the superposition wiring.

Every unit has six incoming and six outgoing neighbor slots. Which lattice
position fills a slot depends on the unit's sextant on its ring
(`quot = local / ring`) and its offset within that sextant
(`residue = local % ring`). Each slot is a first-match table of rules; a
rule lists the `(sextant, residue)` cases it covers and the ring / local
displacement it produces.

Slot numbering around a unit (incoming / outgoing):

```text
      in                 out
    1     2           5     6
  0    *    3       4    *    1
    5     4           3     2
```

Incoming slots 0 and 1 share their tables with outgoing slots 4 and 5,
incoming slots 4 and 5 with outgoing slots 0 and 1. Slots 2 and 3 have
separate tables per direction.
*/

use crate::error::{GeometryError, GeometryResult};
use crate::ids::{ring_size, LatticePosition};

/// Constraint on the offset of a unit within its sextant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Residue {
    Any,
    Zero,
    Positive,
    One,
    AboveOne,
    BeforeLast,
    Last,
}

impl Residue {
    pub fn matches(self, residue: u32, ring: u32) -> bool {
        match self {
            Residue::Any => true,
            Residue::Zero => residue == 0,
            Residue::Positive => residue > 0,
            Residue::One => residue == 1,
            Residue::AboveOne => residue > 1,
            Residue::BeforeLast => residue + 1 < ring,
            Residue::Last => residue + 1 == ring,
        }
    }
}

/// One `(sextant, residue)` case a rule covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Case {
    pub sextant: u32,
    pub residue: Residue,
    /// Only applies on ring 1
    pub first_ring_only: bool,
}

impl Case {
    pub fn matches(&self, sextant: u32, residue: u32, ring: u32) -> bool {
        self.sextant == sextant
            && self.residue.matches(residue, ring)
            && (!self.first_ring_only || ring == 1)
    }
}

const fn any(sextant: u32) -> Case {
    on(sextant, Residue::Any)
}

const fn on(sextant: u32, residue: Residue) -> Case {
    Case {
        sextant,
        residue,
        first_ring_only: false,
    }
}

const fn first_ring(sextant: u32, residue: Residue) -> Case {
    Case {
        sextant,
        residue,
        first_ring_only: true,
    }
}

/// Displacement applied when any of `cases` matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborRule {
    pub cases: &'static [Case],
    pub ring_delta: i8,
    pub local_offset: i8,
}

const fn rule(cases: &'static [Case], ring_delta: i8, local_offset: i8) -> NeighborRule {
    NeighborRule {
        cases,
        ring_delta,
        local_offset,
    }
}

/// Ordered rule table for one neighbor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRules {
    pub name: &'static str,
    pub rules: &'static [NeighborRule],
}

use Residue::{AboveOne, BeforeLast, Last, One, Positive, Zero};

pub const IN0_OUT4: SlotRules = SlotRules {
    name: "in0/out4",
    rules: &[
        rule(&[any(0), any(1), on(2, Zero)], 1, 1),
        rule(&[on(2, Positive), on(3, Zero)], 0, -1),
        rule(&[on(3, Positive), any(4)], -1, -4),
        rule(&[any(5)], 0, 1),
    ],
};

pub const IN1_OUT5: SlotRules = SlotRules {
    name: "in1/out5",
    rules: &[
        rule(&[any(0)], 0, 1),
        rule(&[any(1), any(2), on(3, Zero)], 1, 2),
        rule(&[on(3, Positive), on(4, Zero)], 0, -1),
        rule(&[on(4, Positive), any(5)], -1, -5),
    ],
};

pub const IN2: SlotRules = SlotRules {
    name: "in2",
    rules: &[
        rule(&[on(0, BeforeLast)], -1, 1),
        rule(&[on(0, Last)], 0, 2),
        rule(&[any(1)], 1, 3),
        rule(&[any(2), on(3, Zero)], 2, 5),
        rule(&[on(3, Positive), on(4, Zero)], 1, 2),
        rule(&[on(4, One), first_ring(5, Zero)], 0, -2),
        rule(&[on(4, AboveOne), on(5, Zero)], -1, -6),
        rule(&[on(5, Positive)], -2, -11),
    ],
};

pub const OUT2: SlotRules = SlotRules {
    name: "out2",
    rules: &[
        rule(&[on(0, Zero)], 2, -1),
        rule(&[on(0, Positive), on(1, Zero)], 1, -1),
        rule(&[on(1, One), first_ring(2, Zero)], 0, -2),
        rule(&[on(1, AboveOne), on(2, Zero)], -1, -3),
        rule(&[on(2, Positive)], -2, -5),
        rule(&[on(3, BeforeLast)], -1, -2),
        rule(&[on(3, Last)], 0, 2),
        rule(&[any(4)], 1, 6),
        rule(&[any(5)], 2, 11),
    ],
};

pub const IN3: SlotRules = SlotRules {
    name: "in3",
    rules: &[
        rule(&[any(0)], -1, 0),
        rule(&[any(1)], 0, 1),
        rule(&[any(2), any(3), on(4, Zero)], 1, 3),
        rule(&[on(4, Positive), on(5, Zero)], 0, -1),
        rule(&[on(5, Positive)], -1, -6),
    ],
};

pub const OUT3: SlotRules = SlotRules {
    name: "out3",
    rules: &[
        rule(&[any(0), on(1, Zero)], 1, 0),
        rule(&[on(1, Positive), on(2, Zero)], 0, -1),
        rule(&[on(2, Positive), any(3)], -1, -3),
        rule(&[any(4)], 0, 1),
        rule(&[any(5)], 1, 6),
    ],
};

pub const IN4_OUT0: SlotRules = SlotRules {
    name: "in4/out0",
    rules: &[
        rule(&[on(0, Positive), any(1)], -1, -1),
        rule(&[any(2)], 0, 1),
        rule(&[any(3), any(4), on(5, Zero)], 1, 4),
        rule(&[on(5, Positive), on(0, Zero)], 0, -1),
    ],
};

pub const IN5_OUT1: SlotRules = SlotRules {
    name: "in5/out1",
    rules: &[
        rule(&[on(0, Zero)], 1, -1),
        rule(&[on(0, Positive), on(1, Zero)], 0, -1),
        rule(&[on(1, Positive), any(2)], -1, -2),
        rule(&[any(3)], 0, 1),
        rule(&[any(4), any(5)], 1, 5),
    ],
};

/// Incoming slot tables, indexed by slot
pub const INCOMING: [SlotRules; 6] = [IN0_OUT4, IN1_OUT5, IN2, IN3, IN4_OUT0, IN5_OUT1];

/// Outgoing slot tables, indexed by slot
pub const OUTGOING: [SlotRules; 6] = [IN4_OUT0, IN5_OUT1, OUT2, OUT3, IN0_OUT4, IN1_OUT5];

impl SlotRules {
    /// First rule covering `(sextant, residue)` on `ring`
    pub fn select(&self, sextant: u32, residue: u32, ring: u32) -> Option<&'static NeighborRule> {
        self.rules
            .iter()
            .find(|r| r.cases.iter().any(|c| c.matches(sextant, residue, ring)))
    }

    /// Lattice position filling this slot for the unit at `position`
    pub fn resolve(&self, position: LatticePosition) -> GeometryResult<LatticePosition> {
        let LatticePosition { ring, local } = check_position(position)?;
        let sextant = local / ring;
        let residue = local % ring;

        let selected = self
            .select(sextant, residue, ring)
            .ok_or(GeometryError::UncoveredSextant {
                table: self.name,
                ring,
                sextant,
                residue,
            })?;

        let target_ring = ring as i64 + selected.ring_delta as i64;
        if target_ring < 0 {
            return Err(GeometryError::RingUnderflow {
                table: self.name,
                ring,
                ring_delta: selected.ring_delta,
            });
        }

        Ok(LatticePosition::new(
            target_ring as u32,
            local as i64 + selected.local_offset as i64,
        ))
    }
}

fn check_position(position: LatticePosition) -> GeometryResult<LatticePosition> {
    if position.ring == 0 {
        return Err(GeometryError::InvalidRing { ring: 0 });
    }
    let size = ring_size(position.ring);
    if position.local >= size {
        return Err(GeometryError::LocalIdOutOfRange {
            ring: position.ring,
            local: position.local,
            size,
        });
    }
    Ok(position)
}

/// Neighbor positions of one unit, one entry per slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedNeighbors {
    pub incoming: [LatticePosition; 6],
    pub outgoing: [LatticePosition; 6],
}

impl ResolvedNeighbors {
    pub fn incoming_ids(&self) -> [usize; 6] {
        self.incoming.map(|p| p.global_id())
    }

    pub fn outgoing_ids(&self) -> [usize; 6] {
        self.outgoing.map(|p| p.global_id())
    }
}

/// Resolve all twelve neighbor slots of the unit at `position`
///
/// Only defined for `ring >= 1`; the center unit is wired through its
/// ring-1 neighbors.
pub fn resolve_neighbors(position: LatticePosition) -> GeometryResult<ResolvedNeighbors> {
    let mut incoming = [LatticePosition::center(); 6];
    let mut outgoing = [LatticePosition::center(); 6];
    for slot in 0..6 {
        incoming[slot] = INCOMING[slot].resolve(position)?;
        outgoing[slot] = OUTGOING[slot].resolve(position)?;
    }
    Ok(ResolvedNeighbors { incoming, outgoing })
}

/// Convenience wrapper returning global ids, `(incoming, outgoing)`
pub fn neighbor_ids(ring: u32, local: u32) -> GeometryResult<([usize; 6], [usize; 6])> {
    let resolved = resolve_neighbors(LatticePosition { ring, local })?;
    Ok((resolved.incoming_ids(), resolved.outgoing_ids()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residue_predicates() {
        assert!(Residue::Zero.matches(0, 3));
        assert!(!Residue::Positive.matches(0, 3));
        assert!(Residue::BeforeLast.matches(1, 3));
        assert!(!Residue::BeforeLast.matches(2, 3));
        assert!(Residue::Last.matches(2, 3));
        // ring 1 has a single residue, which is the last one
        assert!(Residue::Last.matches(0, 1));
        assert!(!Residue::BeforeLast.matches(0, 1));
    }

    #[test]
    fn test_first_ring_case() {
        let case = first_ring(5, Zero);
        assert!(case.matches(5, 0, 1));
        assert!(!case.matches(5, 0, 2));
    }

    #[test]
    fn test_first_match_wins() {
        // sextant 2 residue 0 appears in the first rule only
        let selected = IN0_OUT4.select(2, 0, 3).unwrap();
        assert_eq!((selected.ring_delta, selected.local_offset), (1, 1));
        let selected = IN0_OUT4.select(2, 1, 3).unwrap();
        assert_eq!((selected.ring_delta, selected.local_offset), (0, -1));
    }

    #[test]
    fn test_center_has_no_rules() {
        assert_eq!(
            resolve_neighbors(LatticePosition::center()),
            Err(GeometryError::InvalidRing { ring: 0 })
        );
    }

    #[test]
    fn test_out_of_range_local() {
        let err = resolve_neighbors(LatticePosition { ring: 1, local: 6 }).unwrap_err();
        assert!(matches!(err, GeometryError::LocalIdOutOfRange { size: 6, .. }));
    }

    #[test]
    fn test_first_ring_vectors() {
        assert_eq!(neighbor_ids(1, 0).unwrap(), ([8, 2, 3, 0, 6, 18], [6, 18, 36, 7, 8, 2]));
        assert_eq!(neighbor_ids(1, 1).unwrap(), ([9, 10, 11, 3, 0, 1], [0, 1, 7, 8, 9, 10]));
    }

    #[test]
    fn test_every_case_is_covered() {
        for ring in 1..=8u32 {
            for local in 0..6 * ring {
                let position = LatticePosition { ring, local };
                for table in INCOMING.iter().chain(OUTGOING.iter()) {
                    assert!(table.resolve(position).is_ok(), "{} uncovered at {}", table.name, position);
                }
            }
        }
    }
}
