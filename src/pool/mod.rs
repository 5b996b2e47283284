// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Pool classes: a record of a pool implementation's capabilities.
//!
//! This crate only ships one pool implementation ([`mfs`]), but an
//! embedding is expected to add others on top of the same arena. Rather
//! than reach for a trait object — which would force every pool to share
//! one shape of virtual call, including ones future pools don't need — a
//! pool class is just a plain struct of function pointers closed over
//! that pool's own concrete type. Adding a second pool means writing a
//! second record with its own fields, not widening a shared trait.

pub mod mfs;

use core::fmt;

use crate::arena::Arena;
use crate::rustux::errors::Result;
use crate::rustux::types::{Addr, Size};

use mfs::Mfs;

/// The capabilities of the MFS pool class, as plain function pointers
/// bound to `Mfs<'a, A>`'s own inherent methods.
pub struct MfsClass<'a, A: Arena> {
    pub name: &'static str,
    pub alloc: fn(&mut Mfs<'a, A>) -> Result<Addr>,
    pub free: fn(&mut Mfs<'a, A>, Addr),
    pub finish: fn(&mut Mfs<'a, A>),
    pub total_size: fn(&Mfs<'a, A>) -> Size,
    pub free_size: fn(&Mfs<'a, A>) -> Size,
    pub describe: fn(&Mfs<'a, A>, &mut dyn fmt::Write, usize) -> fmt::Result,
}

/// The MFS pool class record. An embedding that dispatches on pool class
/// (e.g. to decide how to tear a pool down generically) holds one of
/// these per pool implementation it supports, rather than a trait object.
pub fn mfs_class<'a, A: Arena>() -> MfsClass<'a, A> {
    MfsClass {
        name: "MFS",
        alloc: Mfs::alloc,
        free: Mfs::free,
        finish: Mfs::finish_extents,
        total_size: Mfs::total_size,
        free_size: Mfs::free_size,
        describe: Mfs::describe,
    }
}
