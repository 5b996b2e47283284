// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Zone sets: the space component of a [`RefSet`](super::RefSet).
//!
//! Every address falls into one of `usize::BITS` zones, `(addr >>
//! zone_shift) mod W`. A `ZoneSet` is a bit-set over those `W` zones,
//! packed into a single machine word — cheap to union, intersect and test,
//! at the cost of precision: it can only ever say "somewhere in this set of
//! coarse stripes", never "at this address".

use crate::arena::Arena;
use crate::rustux::types::Addr;

/// Number of zones, one per bit of a machine word.
pub const ZONE_BITS: u32 = usize::BITS;

/// A bit-set over the arena's zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneSet(usize);

impl ZoneSet {
    /// No zones.
    pub const EMPTY: ZoneSet = ZoneSet(0);

    /// Every zone.
    pub const UNIV: ZoneSet = ZoneSet(usize::MAX);

    /// The zone set containing just `zone`'s bit.
    pub const fn single(zone: u32) -> ZoneSet {
        ZoneSet(1usize << (zone % ZONE_BITS))
    }

    /// The raw bit pattern.
    pub const fn bits(self) -> usize {
        self.0
    }

    pub const fn from_bits(bits: usize) -> ZoneSet {
        ZoneSet(bits)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_univ(self) -> bool {
        self.0 == usize::MAX
    }

    /// `self` is a subset of `other`.
    pub const fn sub(self, other: ZoneSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// `self` is a superset of `other`.
    pub const fn super_(self, other: ZoneSet) -> bool {
        other.sub(self)
    }

    pub const fn inter(self, other: ZoneSet) -> ZoneSet {
        ZoneSet(self.0 & other.0)
    }

    pub const fn union(self, other: ZoneSet) -> ZoneSet {
        ZoneSet(self.0 | other.0)
    }

    pub fn zone_of(arena: &impl Arena, addr: Addr) -> u32 {
        ((addr >> arena.zone_shift()) % (ZONE_BITS as usize)) as u32
    }

    /// Does `zs` contain `addr`'s zone?
    pub fn has(arena: &impl Arena, zs: ZoneSet, addr: Addr) -> bool {
        zs.0 & (1usize << Self::zone_of(arena, addr)) != 0
    }

    /// `zs` with `addr`'s zone added.
    pub fn add_addr(arena: &impl Arena, zs: ZoneSet, addr: Addr) -> ZoneSet {
        ZoneSet(zs.0 | (1usize << Self::zone_of(arena, addr)))
    }

    /// The zone set of every address in `[base, limit)`.
    ///
    /// `base < limit` is required (an empty range has no zones to report
    /// and callers are expected to filter it out beforehand).
    pub fn of_range(arena: &impl Arena, base: Addr, limit: Addr) -> ZoneSet {
        debug_assert!(base < limit);
        let shift = arena.zone_shift();
        let w = ZONE_BITS as usize;

        // zlimit is the zone *after* the range's last zone, not the zone of
        // `limit` itself (limit is exclusive and may sit exactly on a zone
        // boundary).
        let zbase_abs = base >> shift;
        let zlimit_abs = ((limit - 1) >> shift) + 1;

        if zlimit_abs - zbase_abs >= w {
            return ZoneSet::UNIV;
        }

        let zbase = zbase_abs % w;
        let zlimit = zlimit_abs % w;

        if zbase < zlimit {
            // Contiguous run: 000111100
            ZoneSet((1usize << zlimit) - (1usize << zbase))
        } else {
            // Wraps around: 111000011
            ZoneSet(!((1usize << zbase) - (1usize << zlimit)))
        }
    }
}
