use std::arch::x86_64::{
    __m256i, _mm256_cmpeq_epi8, _mm256_load_si256, _mm256_loadu_si256, _mm256_movemask_epi8,
    _mm256_set1_epi8,
};

use super::kernel::{Vector, find};

impl Vector for __m256i {
    const WIDTH: usize = 32;

    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        unsafe { _mm256_set1_epi8(byte as i8) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        unsafe { _mm256_load_si256(ptr as *const __m256i) }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const u8) -> Self {
        unsafe { _mm256_loadu_si256(ptr as *const __m256i) }
    }

    #[inline(always)]
    unsafe fn eq_mask(self, needle: Self) -> u64 {
        // movemask sets bit 31 for lane 31; go through u32 to avoid sign extension.
        unsafe { _mm256_movemask_epi8(_mm256_cmpeq_epi8(self, needle)) as u32 as u64 }
    }
}

/// 256-bit compare, one chunk per iteration.
///
/// # Safety
///
/// The CPU must support AVX2.
#[target_feature(enable = "avx2")]
pub unsafe fn find_byte_avx2(haystack: &[u8], needle: u8) -> Option<usize> {
    unsafe { find::<__m256i, false, false>(haystack, needle) }
}

/// # Safety
///
/// The CPU must support AVX2.
#[target_feature(enable = "avx2")]
pub unsafe fn find_byte_avx2_prefetch(haystack: &[u8], needle: u8) -> Option<usize> {
    unsafe { find::<__m256i, false, true>(haystack, needle) }
}

/// # Safety
///
/// The CPU must support AVX2.
#[target_feature(enable = "avx2")]
pub unsafe fn find_byte_avx2_unroll(haystack: &[u8], needle: u8) -> Option<usize> {
    unsafe { find::<__m256i, true, false>(haystack, needle) }
}

/// # Safety
///
/// The CPU must support AVX2.
#[target_feature(enable = "avx2")]
pub unsafe fn find_byte_avx2_unroll_prefetch(haystack: &[u8], needle: u8) -> Option<usize> {
    unsafe { find::<__m256i, true, true>(haystack, needle) }
}
