// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Error kinds surfaced by the pool core.
//!
//! The reference-set algebra in [`crate::refset`] never fails: it operates
//! on value types with total operations and has no `Error` of its own.

use crate::rustux::types::*;

/// Result type for pool operations.
pub type Result<T = ()> = core::result::Result<T, Error>;

/// Error kinds a pool operation can report.
///
/// `Internal` stands in for whatever an embedding's own pool-class
/// superclass initialiser might return; this core has no superclass of its
/// own, so it is only ever produced by a misused precondition that a debug
/// build didn't catch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Bad argument to `init` (zero-sized unit or extent).
    Param = -2,
    /// Arena refused the request.
    Memory = -6,
    /// Free list is empty and the pool is not allowed to self-extend.
    Limit = -15,
    /// Anything else; not produced by this core directly.
    Internal = -12,
}

impl Error {
    /// Convert the error to a raw status code.
    pub fn to_status(self) -> Status {
        self as Status
    }

    /// Convert a raw status code back to an `Error`, defaulting to
    /// `Internal` for anything this core doesn't itself produce.
    pub fn from_status(status: Status) -> Self {
        match status {
            -2 => Error::Param,
            -6 => Error::Memory,
            -15 => Error::Limit,
            _ => Error::Internal,
        }
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Self::from_status(status)
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        err.to_status()
    }
}
