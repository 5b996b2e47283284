// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! The arena: the coarse-grain page provider every pool in this crate sits
//! on top of.
//!
//! The arena itself is out of scope for this crate — it's the thing that
//! owns physical memory, partitions it into grains and zones, and
//! synchronises access across cores. What's in scope is the narrow
//! interface [`pool::mfs::Mfs`](crate::pool::mfs::Mfs) and
//! [`refset`](crate::refset) need from it, captured here as the [`Arena`]
//! trait so the rest of the crate can be tested against a fake.
//!
//! A correct embedding holds the arena's own lock across any operation
//! that mutates an `Mfs`'s free list, extent ring, or counters: nothing in
//! this crate synchronises on its own behalf.

use crate::refset::era::Epoch;
use crate::rustux::errors::Result;
use crate::rustux::types::{Addr, Size};

/// A pool identity, opaque to the arena. Used only so [`Arena::has_addr`]
/// can answer "does this address belong to that pool" without the arena
/// needing to know anything else about pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolId(pub usize);

/// The arena services `pool::mfs::Mfs` and `refset` need.
pub trait Arena {
    /// Allocate one contiguous extent of `size` bytes (a multiple of the
    /// arena's grain) and attribute it to `pool`.
    fn alloc(&self, size: Size, pool: PoolId) -> Result<Addr>;

    /// Release an extent previously returned by `alloc`.
    fn free(&self, base: Addr, size: Size, pool: PoolId);

    /// Round `size` up to a multiple of the arena's grain.
    fn size_to_grains(&self, size: Size) -> Size;

    /// Is `addr` currently attributed to `pool`?
    fn has_addr(&self, pool: PoolId, addr: Addr) -> bool;

    /// `log2` of the stripe size: `addr >> zone_shift() mod W` is `addr`'s
    /// zone.
    fn zone_shift(&self) -> u32;

    /// `1 << zone_shift()`, the number of bytes in one zone's stripe.
    fn stripe_size(&self) -> Size;

    /// The current collector epoch.
    fn epoch(&self) -> Epoch;
}
