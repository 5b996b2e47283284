// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Zone-range search: finding a run of address space whose every stripe
//! lands in an allowed zone.
//!
//! The collector uses this to place a new segment so that its zone
//! footprint stays inside a `ZoneSet` it has already committed to (e.g. the
//! zones of a generation, or the complement of a blacklist). The search
//! only ever looks at zones, never at what's actually free in that range —
//! callers layer their own free-space tracking underneath.

use crate::arena::Arena;
use crate::rustux::types::{Addr, Size};

use super::zone::{ZoneSet, ZONE_BITS};

/// Since the zone of a stripe repeats with period `ZONE_BITS` stripes, any
/// candidate range spanning `ZONE_BITS` or more stripes necessarily covers
/// every zone at least once. So if `zones` excludes even one zone, no
/// range that long can ever satisfy it — fail fast rather than walking the
/// whole candidate window stripe by stripe.
fn too_big_for_any_proper_subset(zones: ZoneSet, size_in_stripes: Size) -> bool {
    !zones.is_univ() && size_in_stripes >= ZONE_BITS as Size
}

fn stripes_needed(arena: &impl Arena, size: Size) -> Size {
    let stripe = arena.stripe_size();
    (size + stripe - 1) / stripe
}

fn stripe_zone(stripe_index: Size) -> u32 {
    (stripe_index % (ZONE_BITS as Size)) as u32
}

/// Find the lowest-addressed run of at least `size` bytes within `[base,
/// limit)` every one of whose stripes lies in `zones`.
///
/// Returns `None` if no such run exists; `base < limit` and `size > 0` are
/// required.
pub fn range_in_zone_set_first(
    arena: &impl Arena,
    zones: ZoneSet,
    size: Size,
    base: Addr,
    limit: Addr,
) -> Option<(Addr, Addr)> {
    debug_assert!(base < limit);
    debug_assert!(size > 0);

    let stripe = arena.stripe_size();
    let needed = stripes_needed(arena, size);
    if too_big_for_any_proper_subset(zones, needed) {
        return None;
    }

    let first_stripe = base / stripe;
    let last_stripe = (limit - 1) / stripe;

    let mut run_start: Option<Size> = None;
    let mut s = first_stripe;
    while s <= last_stripe {
        let allowed = zones.bits() & (1usize << stripe_zone(s)) != 0;
        if allowed {
            if run_start.is_none() {
                run_start = Some(s);
            }
            let start = run_start.unwrap();
            if s - start + 1 >= needed {
                let range_base = (start * stripe).max(base);
                let range_limit = ((s + 1) * stripe).min(limit);
                return Some((range_base, range_limit));
            }
        } else {
            run_start = None;
        }
        s += 1;
    }
    None
}

/// Find the highest-addressed run of at least `size` bytes within `[base,
/// limit)` every one of whose stripes lies in `zones`.
pub fn range_in_zone_set_last(
    arena: &impl Arena,
    zones: ZoneSet,
    size: Size,
    base: Addr,
    limit: Addr,
) -> Option<(Addr, Addr)> {
    debug_assert!(base < limit);
    debug_assert!(size > 0);

    let stripe = arena.stripe_size();
    let needed = stripes_needed(arena, size);
    if too_big_for_any_proper_subset(zones, needed) {
        return None;
    }

    let first_stripe = base / stripe;
    let last_stripe = (limit - 1) / stripe;

    let mut run_end: Option<Size> = None;
    let mut s = last_stripe;
    loop {
        let allowed = zones.bits() & (1usize << stripe_zone(s)) != 0;
        if allowed {
            if run_end.is_none() {
                run_end = Some(s);
            }
            let end = run_end.unwrap();
            if end - s + 1 >= needed {
                let range_base = (s * stripe).max(base);
                let range_limit = ((end + 1) * stripe).min(limit);
                return Some((range_base, range_limit));
            }
        } else {
            run_end = None;
        }
        if s == first_stripe {
            break;
        }
        s -= 1;
    }
    None
}

/// Zones that commonly hold stray bit patterns rather than real addresses:
/// zero, all-ones, and all-ones at both the machine-word and pointer-sized
/// widths. A conservative scanner can blacklist these zones to cut down on
/// false positives from, say, a freshly allocated-but-unwritten page full
/// of zero bytes.
pub fn zone_set_blacklist(arena: &impl Arena) -> ZoneSet {
    let mut bl = ZoneSet::EMPTY;
    let patterns: [usize; 3] = [0, usize::MAX, (usize::MAX) << 1];
    for &pattern in &patterns {
        bl = bl.union(ZoneSet::single(ZoneSet::zone_of(arena, pattern)));
    }
    bl
}
