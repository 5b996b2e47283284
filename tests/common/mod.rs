// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! A real-backing-store `Arena` for integration tests, independent of the
//! crate's own `#[cfg(test)]`-only `FixedArena` (that one isn't visible
//! outside the crate, since integration tests link against the public API
//! only).

use std::alloc::{alloc, dealloc, Layout};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

use mfs_core::arena::{Arena, PoolId};
use mfs_core::refset::Epoch;
use mfs_core::{Addr, Error, Result, Size};

pub struct TestArena {
    zone_shift: u32,
    stripe_size: Size,
    grain: Size,
    epoch: AtomicU64,
    owned: RefCell<Vec<(Addr, Size, PoolId)>>,
}

impl TestArena {
    pub fn new(zone_shift: u32, stripe_size: Size) -> TestArena {
        TestArena {
            zone_shift,
            stripe_size,
            grain: 4096,
            epoch: AtomicU64::new(0),
            owned: RefCell::new(Vec::new()),
        }
    }

    pub fn live_extent_count(&self) -> usize {
        self.owned.borrow().len()
    }
}

impl Arena for TestArena {
    fn alloc(&self, size: Size, pool: PoolId) -> Result<Addr> {
        if size == 0 {
            return Err(Error::Param);
        }
        let layout = Layout::from_size_align(size, self.stripe_size.max(16)).map_err(|_| Error::Param)?;
        let ptr = unsafe { alloc(layout) };
        if ptr.is_null() {
            return Err(Error::Memory);
        }
        let addr = ptr as Addr;
        self.owned.borrow_mut().push((addr, size, pool));
        Ok(addr)
    }

    fn free(&self, base: Addr, size: Size, pool: PoolId) {
        let mut owned = self.owned.borrow_mut();
        let idx = owned
            .iter()
            .position(|&(a, s, p)| a == base && s == size && p == pool)
            .expect("free of untracked extent");
        owned.swap_remove(idx);
        drop(owned);
        let layout = Layout::from_size_align(size, self.stripe_size.max(16)).unwrap();
        unsafe { dealloc(base as *mut u8, layout) };
    }

    fn size_to_grains(&self, size: Size) -> Size {
        (size + self.grain - 1) & !(self.grain - 1)
    }

    fn has_addr(&self, pool: PoolId, addr: Addr) -> bool {
        self.owned
            .borrow()
            .iter()
            .any(|&(base, size, p)| p == pool && addr >= base && addr < base + size)
    }

    fn zone_shift(&self) -> u32 {
        self.zone_shift
    }

    fn stripe_size(&self) -> Size {
        self.stripe_size
    }

    fn epoch(&self) -> Epoch {
        self.epoch.load(Ordering::SeqCst)
    }
}

impl Drop for TestArena {
    fn drop(&mut self) {
        assert!(self.owned.borrow().is_empty(), "TestArena dropped with live extents");
    }
}
