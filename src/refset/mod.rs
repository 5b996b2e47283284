// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Reference sets: a conservative summary of where, and when, a possibly
//! live reference can be found.
//!
//! A [`RefSet`] is a [`ZoneSet`] × [`Era`] pair. Both components are
//! over-approximations, so every operation on a `RefSet` is required to
//! stay conservative: shrinking a set may only ever happen when the
//! caller can prove the shrunk set still covers every real reference
//! (see [`RefSet::add_addr`]'s doc comment for the one place this crate
//! deliberately widens rather than narrows).

pub mod era;
pub mod rank;
pub mod search;
pub mod zone;

pub use era::{Epoch, Era, EARLIEST, LATEST};
pub use rank::{Rank, RankSet, RANK_LIMIT};
pub use zone::{ZoneSet, ZONE_BITS};

use crate::arena::Arena;
use crate::rustux::types::Addr;

/// Where and when a reference might be found, as a single conservative
/// summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefSet {
    zones: ZoneSet,
    era: Era,
}

impl RefSet {
    /// The empty reference set: summarises no reference at all.
    pub const EMPTY: RefSet = RefSet { zones: ZoneSet::EMPTY, era: Era::empty() };

    /// The universal reference set: summarises every reference, anywhere,
    /// at any time. Any operation that can't prove something tighter must
    /// fall back to this.
    pub fn univ() -> RefSet {
        RefSet { zones: ZoneSet::UNIV, era: Era::univ() }
    }

    pub fn empty() -> RefSet {
        RefSet::EMPTY
    }

    /// Build a `RefSet` directly from its components.
    pub fn new(zones: ZoneSet, era: Era) -> RefSet {
        RefSet { zones, era }
    }

    /// The set of just `zones`, with an empty era (used when only the
    /// space component is known, e.g. from [`ZoneSet::of_range`]).
    pub fn from_zones(zones: ZoneSet) -> RefSet {
        RefSet { zones, era: Era::empty() }
    }

    pub fn zones(&self) -> ZoneSet {
        self.zones
    }

    pub fn era(&self) -> Era {
        self.era
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty() || self.era.is_empty()
    }

    pub fn is_univ(&self) -> bool {
        self.zones.is_univ() && self.era.is_univ()
    }

    /// `self` is a subset of `other`: every reference `self` could summarise
    /// is also summarised by `other`.
    pub fn sub(&self, other: &RefSet) -> bool {
        self.is_empty() || (self.zones.sub(other.zones) && self.era.sub(&other.era))
    }

    /// `self` is a superset of `other`.
    pub fn super_(&self, other: &RefSet) -> bool {
        other.sub(self)
    }

    /// Componentwise intersection test: `true` iff the zone components
    /// *could* overlap. This is weaker than "the sets intersect" since the
    /// era components are not consulted; see [`RefSet::inter_zones`].
    pub fn inter_zones(&self, other: &RefSet) -> bool {
        !self.zones.inter(other.zones).is_empty()
    }

    /// `true` iff `self` and `other` could describe the same reference:
    /// both their zone and era components overlap.
    pub fn inter(&self, other: &RefSet) -> bool {
        self.inter_zones(other) && self.era.intersects(&other.era)
    }

    pub fn equal(&self, other: &RefSet) -> bool {
        (self.is_empty() && other.is_empty())
            || (self.zones == other.zones && self.era.equal(&other.era))
    }

    /// Widen `self` to also cover `other`: the componentwise union.
    pub fn union(&mut self, other: &RefSet) {
        self.zones = self.zones.union(other.zones);
        self.era.union(&other.era);
    }

    /// Widen `self` to also cover `addr`, at any epoch.
    ///
    /// Unlike [`RefSet::union`], this resets the era component to
    /// universal rather than narrowing it to what's actually known: the
    /// caller has a bare address, with no epoch attached, so the only
    /// conservative era to assign it is "could be any time". A `RefSet`
    /// that has had an address added this way needs a fresh
    /// [`Era::bound_not_future`] call from the caller if it wants the era
    /// component tightened again.
    pub fn add_addr(&mut self, arena: &impl Arena, addr: Addr) {
        self.zones = ZoneSet::add_addr(arena, self.zones, addr);
        self.era = Era::univ();
    }

    /// Narrow the era component so it never claims a reference could still
    /// exist after `epoch`.
    pub fn bound_not_future(&mut self, epoch: Epoch) {
        self.era.bound_not_future(epoch);
    }
}
