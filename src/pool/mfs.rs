// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! The Manual Fixed-Size small-unit pool.
//!
//! MFS hands out units of one fixed size from extents it requests from the
//! arena, tracked with a plain LIFO free list threaded through the unused
//! units themselves — the pool keeps no separate bookkeeping array. The
//! free-list link and the ring node this module uses to remember which
//! extents it owns both live inside the extent's own memory: MFS has to be
//! self-sufficient this way because it's typically the first pool an
//! arena brings up, and nothing else exists yet to allocate bookkeeping
//! structures from.
//!
//! Units are handed out and taken back whole; nothing here ever splits or
//! coalesces a unit. That's what makes the free list safe to thread
//! through free units' own storage — a unit is either entirely free or
//! entirely allocated, never partially either.

use core::fmt;
use core::mem::{align_of, size_of};
use core::ptr;

use alloc::boxed::Box;

use crate::arena::{Arena, PoolId};
use crate::ring::{self, Ring};
use crate::rustux::errors::{Error, Result};
use crate::rustux::types::{Addr, Size};

/// Arguments to [`Mfs::init`]. `extend_by` and `extend_self` default to
/// sixteen units per extent and "yes, grow on demand" respectively when
/// left unset.
#[derive(Debug, Clone, Copy)]
pub struct MfsArgs {
    /// The size of one unit, before rounding.
    pub unit_size: Size,
    /// How many bytes to request from the arena each time the pool needs
    /// to grow. `None` picks sixteen units, rounded up to the arena's
    /// grain.
    pub extend_by: Option<Size>,
    /// Whether `alloc` may call the arena itself when the free list runs
    /// dry. `None` means yes.
    pub extend_self: Option<bool>,
}

impl MfsArgs {
    pub fn new(unit_size: Size) -> MfsArgs {
        MfsArgs { unit_size, extend_by: None, extend_self: None }
    }
}

fn round_unit_size(unrounded: Size) -> Size {
    let min = size_of::<*mut u8>();
    let align = align_of::<*mut u8>();
    let size = unrounded.max(min);
    (size + align - 1) & !(align - 1)
}

fn align_up(x: usize, align: usize) -> usize {
    (x + align - 1) & !(align - 1)
}

/// Bytes the extent ring node occupies at the base of each extent,
/// rounded up to pointer alignment. `extend_by` must leave room for one
/// whole unit past this header, or an extent would be unable to yield
/// even a single free unit.
fn ring_node_size() -> Size {
    align_up(size_of::<Ring>(), align_of::<usize>())
}

/// A manual fixed-size unit pool over an arena `A`.
///
/// Always lives behind a `Box`: the extent ring embedded in this struct is
/// self-referential once initialised, so the struct must not move after
/// [`Mfs::init`] returns.
pub struct Mfs<'a, A: Arena> {
    arena: &'a A,
    pool_id: PoolId,
    unrounded_unit_size: Size,
    unit_size: Size,
    extend_by: Size,
    extend_self: bool,
    free_list: *mut u8,
    total_size: Size,
    free_size: Size,
    extents: Ring,
}

impl<'a, A: Arena> Mfs<'a, A> {
    /// Create a new, empty pool. No extent is requested yet — the first
    /// `alloc` (or an explicit caller-driven extend) triggers that.
    pub fn init(arena: &'a A, pool_id: PoolId, args: MfsArgs) -> Result<Box<Mfs<'a, A>>> {
        if args.unit_size == 0 {
            #[cfg(feature = "log")]
            log::debug!("mfs init: rejecting zero unit_size");
            return Err(Error::Param);
        }
        let unit_size = round_unit_size(args.unit_size);
        let requested_extend_by = args.extend_by.unwrap_or(unit_size * 16);
        if requested_extend_by == 0 {
            #[cfg(feature = "log")]
            log::debug!("mfs init: rejecting zero extend_by");
            return Err(Error::Param);
        }
        // A too-small extend_by is raised rather than rejected, same as a
        // too-small unit_size is rounded rather than rejected: the caller
        // asked for a ballpark, not an exact extent layout, and extend()
        // must never see a region with no room for a ring node plus one
        // whole unit.
        let min_extend_by = ring_node_size() + unit_size;
        let extend_by = arena.size_to_grains(requested_extend_by.max(min_extend_by));

        let mut mfs = Box::new(Mfs {
            arena,
            pool_id,
            unrounded_unit_size: args.unit_size,
            unit_size,
            extend_by,
            extend_self: args.extend_self.unwrap_or(true),
            free_list: ptr::null_mut(),
            total_size: 0,
            free_size: 0,
            extents: Ring::dangling(),
        });

        let sentinel: *mut Ring = &mut mfs.extents;
        unsafe { Ring::init(sentinel) };
        Ok(mfs)
    }

    pub fn unit_size(&self) -> Size {
        self.unit_size
    }

    pub fn total_size(&self) -> Size {
        self.total_size
    }

    pub fn free_size(&self) -> Size {
        self.free_size
    }

    /// Take one unit from the free list, pushed in pop order (LIFO).
    unsafe fn pop_free(&mut self) -> Option<Addr> {
        if self.free_list.is_null() {
            return None;
        }
        let addr = self.free_list as Addr;
        let link = self.free_list as *mut *mut u8;
        self.free_list = *link;
        Some(addr)
    }

    /// Push one unit onto the free list.
    unsafe fn push_free(&mut self, addr: Addr) {
        let link = addr as *mut *mut u8;
        *link = self.free_list;
        self.free_list = addr as *mut u8;
    }

    /// Request one more extent from the arena and thread its units onto
    /// the free list.
    ///
    /// The extent's own ring node lives at its base, ahead of the first
    /// unit; units are threaded onto the free list in descending address
    /// order, so the free list pops back out in ascending address order.
    pub fn extend(&mut self) -> Result<()> {
        let base = self.arena.alloc(self.extend_by, self.pool_id).inspect_err(|_e| {
            #[cfg(feature = "log")]
            log::debug!("mfs extend: arena refused {} bytes", self.extend_by);
        })?;
        #[cfg(feature = "log")]
        log::debug!("mfs extend: got extent of {} bytes at {:#x}", self.extend_by, base);

        let node: *mut Ring = base as *mut Ring;
        unsafe {
            Ring::init(node);
            Ring::append(&mut self.extents as *mut Ring, node);
        }

        let units_start = align_up(base + ring_node_size(), align_of::<usize>());
        let limit = base + self.extend_by;

        let mut count = 0;
        let mut addr = units_start;
        while addr + self.unit_size <= limit {
            count += 1;
            addr += self.unit_size;
        }

        for i in (0..count).rev() {
            let unit_addr = units_start + i * self.unit_size;
            unsafe { self.push_free(unit_addr) };
        }

        // total and free both get the same post-ring-node byte count: the
        // invariant `(total - free) mod unit_size == 0` must hold right
        // after an extend (it trivially does when both counters move
        // together), and any slack the arena handed out past the last
        // whole unit is never individually allocatable, so it's counted
        // in neither.
        let size = count * self.unit_size;
        self.total_size += size;
        self.free_size += size;
        Ok(())
    }

    /// Take one unit. Self-extends from the arena if the free list is
    /// empty and `extend_self` allows it; otherwise a dry free list is a
    /// hard [`Error::Limit`].
    pub fn alloc(&mut self) -> Result<Addr> {
        if let Some(addr) = unsafe { self.pop_free() } {
            self.free_size -= self.unit_size;
            return Ok(addr);
        }
        if !self.extend_self {
            #[cfg(feature = "log")]
            log::debug!("mfs alloc: free list empty and extend_self is false");
            return Err(Error::Limit);
        }
        self.extend()?;
        let addr = unsafe { self.pop_free() }.ok_or(Error::Internal)?;
        self.free_size -= self.unit_size;
        Ok(addr)
    }

    /// Return a unit to the free list. `addr` must be a unit this pool
    /// previously handed out via `alloc` and not already free.
    pub fn free(&mut self, addr: Addr) {
        unsafe { self.push_free(addr) };
        self.free_size += self.unit_size;
    }

    /// Release every extent back to the arena via the default visitor
    /// (`arena.free`), leaving the pool with no free list and no extents.
    pub fn finish_extents(&mut self) {
        let extend_by = self.extend_by;
        let arena = self.arena;
        let pool_id = self.pool_id;
        unsafe {
            ring::drain(&mut self.extents as *mut Ring, |node| {
                arena.free(node as Addr, extend_by, pool_id);
            });
        }
        self.free_list = ptr::null_mut();
        self.total_size = 0;
        self.free_size = 0;
    }

    /// Release every extent, passing each `(base, size)` to `visit`
    /// instead of calling `arena.free` directly. Useful for tests that
    /// want to observe teardown order without actually freeing memory the
    /// arena still thinks is live.
    pub fn finish_extents_with(&mut self, mut visit: impl FnMut(Addr, Size)) {
        let extend_by = self.extend_by;
        unsafe {
            ring::drain(&mut self.extents as *mut Ring, |node| {
                visit(node as Addr, extend_by);
            });
        }
        self.free_list = ptr::null_mut();
        self.total_size = 0;
        self.free_size = 0;
    }

    /// Write a one-field-per-line textual dump of the pool's state,
    /// indented two spaces per `depth`.
    pub fn describe(&self, w: &mut dyn fmt::Write, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            w.write_str("  ")?;
        }
        writeln!(w, "MFS {{")?;
        let pad = depth + 1;
        macro_rules! field {
            ($name:expr, $val:expr) => {{
                for _ in 0..pad {
                    w.write_str("  ")?;
                }
                writeln!(w, "{}: {:?}", $name, $val)?;
            }};
        }
        field!("unrounded_unit_size", self.unrounded_unit_size);
        field!("extend_by", self.extend_by);
        field!("extend_self", self.extend_self);
        field!("unit_size", self.unit_size);
        field!("free_list", self.free_list);
        field!("total", self.total_size);
        field!("free", self.free_size);
        for _ in 0..depth {
            w.write_str("  ")?;
        }
        writeln!(w, "}}")
    }
}

impl<'a, A: Arena> Drop for Mfs<'a, A> {
    /// Not a substitute for calling `finish_extents` deliberately: this
    /// exists so a pool dropped without an explicit teardown doesn't leak
    /// the arena's extents silently.
    fn drop(&mut self) {
        if !unsafe { Ring::is_singleton(&self.extents as *const Ring) } {
            self.finish_extents();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::tests::FixedArena;
    use alloc::vec::Vec;

    fn new_pool(arena: &FixedArena, unit_size: Size) -> Box<Mfs<'_, FixedArena>> {
        Mfs::init(arena, PoolId(1), MfsArgs::new(unit_size)).expect("init should succeed")
    }

    #[test]
    fn init_rejects_zero_unit_size() {
        let arena = FixedArena::new(16, 65536);
        let err = Mfs::init(&arena, PoolId(1), MfsArgs::new(0)).unwrap_err();
        assert_eq!(err, Error::Param);
    }

    #[test]
    fn init_rejects_zero_extend_by() {
        let arena = FixedArena::new(16, 65536);
        let mut args = MfsArgs::new(24);
        args.extend_by = Some(0);
        let err = Mfs::init(&arena, PoolId(1), args).unwrap_err();
        assert_eq!(err, Error::Param);
    }

    #[test]
    fn init_raises_a_too_small_extend_by_instead_of_rejecting_it() {
        let arena = FixedArena::new(16, 65536);
        // A unit so large that a ring node plus one unit doesn't fit in
        // the requested extend_by; init must bump extend_by up rather
        // than fail, and the bumped value must still leave room for at
        // least one unit once extended.
        let mut args = MfsArgs::new(4090);
        args.extend_by = Some(4096);
        let mut pool = Mfs::init(&arena, PoolId(1), args).unwrap();
        assert!(pool.extend_by >= pool.unit_size());
        pool.extend().unwrap();
        assert!(pool.free_size() >= pool.unit_size());
        pool.finish_extents();
    }

    #[test]
    fn alloc_without_extend_self_fails_with_limit() {
        let arena = FixedArena::new(16, 65536);
        let mut args = MfsArgs::new(24);
        args.extend_self = Some(false);
        let mut pool = Mfs::init(&arena, PoolId(1), args).unwrap();
        let err = pool.alloc().unwrap_err();
        assert_eq!(err, Error::Limit);
        pool.finish_extents();
    }

    #[test]
    fn alloc_free_cycle_reuses_units_and_stays_distinct() {
        let arena = FixedArena::new(16, 65536);
        let mut args = MfsArgs::new(24);
        args.extend_by = Some(4096);
        let mut pool = new_pool_with(&arena, args);

        let mut live: Vec<Addr> = (0..100).map(|_| pool.alloc().unwrap()).collect();
        live.sort_unstable();
        live.dedup();
        assert_eq!(live.len(), 100, "every allocated unit must be distinct");
        for addr in &live {
            assert_eq!(addr % 8, 0, "units must be 8-byte aligned");
        }

        // Free every other unit, then reallocate half of what's free.
        let mut freed = Vec::new();
        for (i, addr) in live.iter().enumerate() {
            if i % 2 == 0 {
                pool.free(*addr);
                freed.push(*addr);
            }
        }
        for _ in 0..25 {
            let addr = pool.alloc().unwrap();
            assert!(freed.contains(&addr), "reallocated unit should come from the free list");
        }

        pool.finish_extents();
    }

    fn new_pool_with(arena: &FixedArena, args: MfsArgs) -> Box<Mfs<'_, FixedArena>> {
        Mfs::init(arena, PoolId(1), args).expect("init should succeed")
    }

    #[test]
    fn extend_grows_total_and_free_size() {
        let arena = FixedArena::new(16, 65536);
        let mut pool = new_pool(&arena, 24);
        assert_eq!(pool.total_size(), 0);
        pool.extend().unwrap();
        // total and free move together on a fresh extend (nothing has
        // been allocated from it yet), and both stop short of the raw
        // extend_by: the ring node header, and any slack smaller than one
        // whole unit, belong to neither counter.
        assert_eq!(pool.total_size(), pool.free_size());
        assert!(pool.total_size() > 0);
        assert!(pool.total_size() < pool.extend_by);
        assert_eq!((pool.total_size() - pool.free_size()) % pool.unit_size(), 0);
        pool.finish_extents();
    }

    #[test]
    fn finish_extents_visits_each_extent_once_with_recorded_size() {
        let arena = FixedArena::new(16, 65536);
        let mut args = MfsArgs::new(24);
        args.extend_by = Some(4096);
        let mut pool = new_pool_with(&arena, args);

        for _ in 0..200 {
            let _ = pool.alloc().unwrap();
        }
        assert!(arena.live_extent_count() > 1, "100 units of size 24 should span more than one extent");

        let mut visited = Vec::new();
        pool.finish_extents_with(|base, size| visited.push((base, size)));
        assert!(!visited.is_empty());
        for (_, size) in &visited {
            assert_eq!(*size, 4096);
        }
        let mut bases: Vec<Addr> = visited.iter().map(|&(b, _)| b).collect();
        let before = bases.len();
        bases.sort_unstable();
        bases.dedup();
        assert_eq!(bases.len(), before, "every extent must be visited exactly once");

        // The arena still thinks these extents are live since we used the
        // non-freeing visitor; free them for real so FixedArena's Drop
        // doesn't assert.
        for (base, size) in visited {
            arena.free(base, size, PoolId(1));
        }
    }

    #[test]
    fn describe_reports_one_field_per_line() {
        let arena = FixedArena::new(16, 65536);
        let mut pool = new_pool(&arena, 24);
        pool.extend().unwrap();

        let mut out = alloc::string::String::new();
        pool.describe(&mut out, 0).unwrap();
        assert!(out.contains("unit_size"));
        assert!(out.contains("free_list"));
        assert_eq!(out.lines().count(), 9);

        pool.finish_extents();
    }
}
