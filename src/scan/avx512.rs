use std::arch::x86_64::{
    __m512i, _mm512_cmpeq_epi8_mask, _mm512_load_si512, _mm512_loadu_si512, _mm512_set1_epi8,
};

use super::kernel::{Vector, find};

impl Vector for __m512i {
    const WIDTH: usize = 64;

    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        unsafe { _mm512_set1_epi8(byte as i8) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        unsafe { _mm512_load_si512(ptr as *const __m512i) }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        unsafe { _mm512_loadu_si512(ptr as *const __m512i) }
    }

    #[inline(always)]
    unsafe fn eq_mask(self, needle: Self) -> u64 {
        unsafe { _mm512_cmpeq_epi8_mask(self, needle) }
    }
}

/// 512-bit compare, one chunk per iteration.
///
/// # Safety
///
/// The CPU must support AVX-512F and AVX-512BW.
#[target_feature(enable = "avx512f,avx512bw")]
pub unsafe fn find_byte_avx512(haystack: &[u8], needle: u8) -> Option<usize> {
    unsafe { find::<__m512i, false, false>(haystack, needle) }
}

/// # Safety
///
/// The CPU must support AVX-512F and AVX-512BW.
#[target_feature(enable = "avx512f,avx512bw")]
pub unsafe fn find_byte_avx512_prefetch(haystack: &[u8], needle: u8) -> Option<usize> {
    unsafe { find::<__m512i, false, true>(haystack, needle) }
}

/// # Safety
///
/// The CPU must support AVX-512F and AVX-512BW.
#[target_feature(enable = "avx512f,avx512bw")]
pub unsafe fn find_byte_avx512_unroll(haystack: &[u8], needle: u8) -> Option<usize> {
    unsafe { find::<__m512i, true, false>(haystack, needle) }
}

/// # Safety
///
/// The CPU must support AVX-512F and AVX-512BW.
#[target_feature(enable = "avx512f,avx512bw")]
pub unsafe fn find_byte_avx512_unroll_prefetch(haystack: &[u8], needle: u8) -> Option<usize> {
    unsafe { find::<__m512i, true, true>(haystack, needle) }
}
