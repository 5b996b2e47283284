// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Reference ranks: how strongly a reference holds its target alive.
//!
//! Ranks and rank sets are otherwise opaque to this crate — the scanner
//! and tracer that actually interpret them live in the pool-class
//! framework this core plugs into (out of scope here). All that's checked
//! here is well-formedness.

/// How strongly a reference holds its target alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Rank {
    /// Might be a reference, might be a stray bit pattern.
    Ambig = 0,
    /// Definitely a reference, definitely at this exact address.
    Exact = 1,
    /// A reference that doesn't keep its target alive on its own.
    Weak = 2,
    /// A reference only followed once, when finalizing.
    Final = 3,
}

/// Number of distinct [`Rank`] values.
pub const RANK_LIMIT: u32 = 4;

bitflags::bitflags! {
    /// A set of [`Rank`]s, packed one bit per rank.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RankSet: u32 {
        const AMBIG = 1 << (Rank::Ambig as u32);
        const EXACT = 1 << (Rank::Exact as u32);
        const WEAK  = 1 << (Rank::Weak as u32);
        const FINAL = 1 << (Rank::Final as u32);
    }
}

impl RankSet {
    pub fn of(rank: Rank) -> RankSet {
        RankSet::from_bits_truncate(1 << (rank as u32))
    }

    /// A `RankSet` is well-formed iff it fits in `RANK_LIMIT` bits; bitflags
    /// already enforces this for any value built from named constants, so
    /// this is only useful when validating a raw bit pattern from outside
    /// the crate.
    pub fn check(bits: u32) -> bool {
        bits < (1u32 << RANK_LIMIT)
    }
}
