use std::arch::x86_64::{
    __m128i, _mm_cmpeq_epi8, _mm_load_si128, _mm_loadu_si128, _mm_movemask_epi8, _mm_set1_epi8,
};

use super::kernel::{Vector, find};

impl Vector for __m128i {
    const WIDTH: usize = 16;

    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        unsafe { _mm_set1_epi8(byte as i8) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        unsafe { _mm_load_si128(ptr as *const __m128i) }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        unsafe { _mm_loadu_si128(ptr as *const __m128i) }
    }

    #[inline(always)]
    unsafe fn eq_mask(self, needle: Self) -> u64 {
        unsafe { _mm_movemask_epi8(_mm_cmpeq_epi8(self, needle)) as u32 as u64 }
    }
}

/// 128-bit compare, one chunk per iteration.
///
/// # Safety
///
/// The CPU must support SSE2.
#[target_feature(enable = "sse2")]
pub unsafe fn find_byte_sse2(haystack: &[u8], needle: u8) -> Option<usize> {
    unsafe { find::<__m128i, false, false>(haystack, needle) }
}

/// # Safety
///
/// The CPU must support SSE2.
#[target_feature(enable = "sse2")]
pub unsafe fn find_byte_sse2_prefetch(haystack: &[u8], needle: u8) -> Option<usize> {
    unsafe { find::<__m128i, false, true>(haystack, needle) }
}

/// # Safety
///
/// The CPU must support SSE2.
#[target_feature(enable = "sse2")]
pub unsafe fn find_byte_sse2_unroll(haystack: &[u8], needle: u8) -> Option<usize> {
    unsafe { find::<__m128i, true, false>(haystack, needle) }
}

/// # Safety
///
/// The CPU must support SSE2.
#[target_feature(enable = "sse2")]
pub unsafe fn find_byte_sse2_unroll_prefetch(haystack: &[u8], needle: u8) -> Option<usize> {
    unsafe { find::<__m128i, true, true>(haystack, needle) }
}
