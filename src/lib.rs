// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Bootstrap allocator and reference-set algebra for a tracing collector.
//!
//! This crate provides two things a collector needs before anything else
//! can exist:
//!
//! - [`pool::mfs`]: a manual, fixed-unit-size pool that hands out
//!   identically-sized units from arena-supplied extents via a plain free
//!   list. It's deliberately the simplest pool there is, because it's the
//!   one other pools' own bookkeeping structures (ring nodes, segment
//!   descriptors, and so on) are allocated from before those pools exist
//!   themselves.
//! - [`refset`]: the `ZoneSet` × `Era` algebra a tracer uses to summarise,
//!   conservatively, where and when a possibly-live reference can be
//!   found, plus the zone-range search a collector uses to place new
//!   segments within a committed zone footprint.
//!
//! Both sit on top of an [`arena::Arena`] the caller supplies: this crate
//! owns no memory of its own and starts no threads. What a scanner does
//! with a [`refset::RankSet`], how segments are promoted between
//! generations, how a pool's free list gets compacted — none of that is
//! here. This is the substrate those things are built on, not the
//! collector itself.

#![no_std]

extern crate alloc;

pub mod arena;
pub mod pool;
pub mod refset;
pub mod ring;
pub mod rustux;

pub use arena::{Arena, PoolId};
pub use refset::RefSet;
pub use rustux::errors::{Error, Result};
pub use rustux::types::{Addr, Size, Status};
