//! Loop shapes shared by every vector tier.
//!
//! A scan runs in three phases: an unaligned head load that brings the cursor
//! to a `WIDTH`-aligned address, aligned main-loop loads (optionally 4x
//! unrolled and/or prefetching), and the scalar tail for whatever is left.
//! Buffers shorter than one vector never touch a vector register, so no phase
//! reads outside `[base, base + len)`.

use std::arch::x86_64::{_MM_HINT_T0, _mm_prefetch};

use super::scalar::scan_tail;

/// Distance ahead of the cursor, in bytes, for software prefetch hints.
pub const PREFETCH_DISTANCE: usize = 1024;

/// Chunks compared per iteration by the unrolled loop.
pub const UNROLL_FACTOR: usize = 4;

/// One vector register of byte lanes.
///
/// Implementations must be `#[inline(always)]` so that the intrinsics inline
/// into the `#[target_feature]` entry point that instantiates the kernel.
pub(crate) trait Vector: Copy {
    const WIDTH: usize;

    unsafe fn splat(byte: u8) -> Self;

    /// `ptr` must be `WIDTH`-aligned and valid for `WIDTH` bytes.
    unsafe fn load_aligned(ptr: *const u8) -> Self;

    /// `ptr` must be valid for `WIDTH` bytes.
    unsafe fn load_unaligned(ptr: *const u8) -> Self;

    /// Bit `i` is set when lane `i` of `self` equals lane `i` of `needle`.
    unsafe fn eq_mask(self, needle: Self) -> u64;
}

enum Prolog {
    Found(usize),
    Aligned(usize),
}

#[inline(always)]
fn lowest_lane(mask: u64) -> usize {
    mask.trailing_zeros() as usize
}

/// Runs the full prolog / main loop / tail pipeline.
///
/// # Safety
///
/// The CPU must support the instructions `V` is implemented with.
#[inline(always)]
pub(crate) unsafe fn find<V: Vector, const UNROLL: bool, const PREFETCH: bool>(
    haystack: &[u8],
    needle: u8,
) -> Option<usize> {
    let len = haystack.len();
    if len < V::WIDTH {
        return scan_tail(haystack, 0, needle);
    }

    let base = haystack.as_ptr();
    let target = unsafe { V::splat(needle) };

    let mut offset = match unsafe { prolog::<V>(base, len, target) } {
        Prolog::Found(i) => return Some(i),
        Prolog::Aligned(next) => next,
    };

    if UNROLL {
        if let Some(i) = unsafe { unrolled_loop::<V, PREFETCH>(base, len, &mut offset, target) } {
            return Some(i);
        }
    }

    if let Some(i) = unsafe { single_loop::<V, PREFETCH>(base, len, &mut offset, target) } {
        return Some(i);
    }

    scan_tail(haystack, offset, needle)
}

/// Consumes the unaligned head with one unaligned load.
///
/// Requires `len >= V::WIDTH`, so the head load stays inside the buffer; the
/// lanes it covers past the alignment boundary are re-read by the main loop,
/// which is harmless because a match there would already have been returned.
#[inline(always)]
unsafe fn prolog<V: Vector>(base: *const u8, len: usize, target: V) -> Prolog {
    debug_assert!(len >= V::WIDTH);
    let misalign = base as usize & (V::WIDTH - 1);
    if misalign == 0 {
        return Prolog::Aligned(0);
    }

    let mask = unsafe { V::load_unaligned(base).eq_mask(target) };
    if mask != 0 {
        return Prolog::Found(lowest_lane(mask));
    }
    Prolog::Aligned(V::WIDTH - misalign)
}

#[inline(always)]
unsafe fn single_loop<V: Vector, const PREFETCH: bool>(
    base: *const u8,
    len: usize,
    offset: &mut usize,
    target: V,
) -> Option<usize> {
    while len - *offset >= V::WIDTH {
        let ptr = unsafe { base.add(*offset) };
        let mask = unsafe { V::load_aligned(ptr).eq_mask(target) };
        if mask != 0 {
            return Some(*offset + lowest_lane(mask));
        }
        if PREFETCH {
            unsafe { prefetch_ahead(base, len, *offset) };
        }
        *offset += V::WIDTH;
    }
    None
}

#[inline(always)]
unsafe fn unrolled_loop<V: Vector, const PREFETCH: bool>(
    base: *const u8,
    len: usize,
    offset: &mut usize,
    target: V,
) -> Option<usize> {
    let block = V::WIDTH * UNROLL_FACTOR;
    while len - *offset >= block {
        let ptr = unsafe { base.add(*offset) };
        let (m1, m2, m3, m4) = unsafe {
            (
                V::load_aligned(ptr).eq_mask(target),
                V::load_aligned(ptr.add(V::WIDTH)).eq_mask(target),
                V::load_aligned(ptr.add(V::WIDTH * 2)).eq_mask(target),
                V::load_aligned(ptr.add(V::WIDTH * 3)).eq_mask(target),
            )
        };

        if (m1 | m2 | m3 | m4) != 0 {
            if m1 != 0 {
                return Some(*offset + lowest_lane(m1));
            } else if m2 != 0 {
                return Some(*offset + V::WIDTH + lowest_lane(m2));
            } else if m3 != 0 {
                return Some(*offset + V::WIDTH * 2 + lowest_lane(m3));
            } else {
                return Some(*offset + V::WIDTH * 3 + lowest_lane(m4));
            }
        }

        if PREFETCH {
            unsafe { prefetch_ahead(base, len, *offset) };
        }
        *offset += block;
    }
    None
}

/// Hints the line `PREFETCH_DISTANCE` bytes ahead while it is still inside
/// the buffer.
#[inline(always)]
unsafe fn prefetch_ahead(base: *const u8, len: usize, offset: usize) {
    if len - offset > PREFETCH_DISTANCE {
        unsafe {
            let ptr = base.add(offset + PREFETCH_DISTANCE);
            _mm_prefetch(ptr as *const i8, _MM_HINT_T0);
        }
    }
}
