// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Ring / local-index addressing of the hexagonal lattice.

Ring 0 holds the single center unit, ring `r > 0` holds `6r` units with local
ids `0..6r`. Global ids are dense and ring-major:

```text
ring 0:  0
ring 1:  1  2  3  4  5  6
ring 2:  7  8  9 ...
```
*/

use core::fmt;
use serde::{Deserialize, Serialize};

/// Number of units on a ring
pub fn ring_size(ring: u32) -> u32 {
    if ring == 0 {
        1
    } else {
        6 * ring
    }
}

/// Number of units on rings `0..=rings`, `3R(R+1)+1`
pub fn ommatidia_count(rings: u32) -> usize {
    let r = rings as usize;
    3 * r * (r + 1) + 1
}

/// Global id of `(ring, local)`
///
/// The local index is wrapped modulo the ring size, so callers may pass
/// offsets that leave `0..6r` in either direction.
pub fn global_id(ring: u32, local: i64) -> usize {
    if ring == 0 {
        return 0;
    }
    let r = ring as i64;
    (3 * (r - 1) * r + 1 + local.rem_euclid(6 * r)) as usize
}

/// Position of a unit on the lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LatticePosition {
    pub ring: u32,
    pub local: u32,
}

impl LatticePosition {
    /// Wraps `local` into the ring
    pub fn new(ring: u32, local: i64) -> Self {
        let local = local.rem_euclid(ring_size(ring) as i64) as u32;
        LatticePosition { ring, local }
    }

    pub fn center() -> Self {
        LatticePosition { ring: 0, local: 0 }
    }

    pub fn global_id(&self) -> usize {
        global_id(self.ring, self.local as i64)
    }

    /// Inverse of [`global_id`]
    pub fn from_global_id(id: usize) -> Self {
        if id == 0 {
            return Self::center();
        }
        let mut ring = 1u32;
        while ommatidia_count(ring) <= id {
            ring += 1;
        }
        let first = ommatidia_count(ring - 1);
        LatticePosition {
            ring,
            local: (id - first) as u32,
        }
    }
}

impl fmt::Display for LatticePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(ring {}, local {})", self.ring, self.local)
    }
}

/// Identity of a lattice unit
///
/// Border units complete the wiring of the outermost real ring and never
/// carry a global id of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitId {
    Real(usize),
    Border,
}

impl UnitId {
    pub fn real(&self) -> Option<usize> {
        match self {
            UnitId::Real(id) => Some(*id),
            UnitId::Border => None,
        }
    }

    pub fn is_border(&self) -> bool {
        matches!(self, UnitId::Border)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitId::Real(id) => write!(f, "Ommatidium({})", id),
            UnitId::Border => write!(f, "Border"),
        }
    }
}
