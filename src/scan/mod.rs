//! Byte-scan kernels.
//!
//! Every kernel has the same contract: return the offset of the first byte of
//! `haystack` equal to `needle`, or `None`. Vector kernels are `unsafe`
//! because they require a CPU capability; go through
//! [`Catalog`](crate::catalog::Catalog) to get a checked, safe handle.

mod scalar;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod kernel;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod avx2;
#[cfg(all(feature = "avx512", target_arch = "x86_64"))]
mod avx512;
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod sse2;

pub use scalar::{find_byte_memchr, find_byte_scalar};

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub use avx2::{
    find_byte_avx2, find_byte_avx2_prefetch, find_byte_avx2_unroll, find_byte_avx2_unroll_prefetch,
};
#[cfg(all(feature = "avx512", target_arch = "x86_64"))]
pub use avx512::{
    find_byte_avx512, find_byte_avx512_prefetch, find_byte_avx512_unroll,
    find_byte_avx512_unroll_prefetch,
};
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub use kernel::{PREFETCH_DISTANCE, UNROLL_FACTOR};
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub use sse2::{
    find_byte_sse2, find_byte_sse2_prefetch, find_byte_sse2_unroll, find_byte_sse2_unroll_prefetch,
};

#[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
pub const PREFETCH_DISTANCE: usize = 1024;
#[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
pub const UNROLL_FACTOR: usize = 4;

/// `Some(offset)` of the first match, `None` when the byte is absent.
pub type ScanResult = Option<usize>;

/// Raw kernel signature shared by every strategy.
pub type ScanFn = unsafe fn(&[u8], u8) -> ScanResult;

#[cfg(all(test, feature = "simd", target_arch = "x86_64"))]
mod tests {
    use super::*;

    fn aligned(len: usize, lead: usize) -> (Vec<u8>, usize) {
        let buf = vec![b'.'; len + lead + 128];
        let start = (64 - (buf.as_ptr() as usize & 63)) & 63;
        (buf, start + lead)
    }

    #[test]
    fn test_sse2_prolog_finds_head_match() {
        let (mut buf, start) = aligned(64, 3);
        buf[start + 2] = b'\n';
        let hay = &buf[start..start + 64];
        assert_eq!(unsafe { find_byte_sse2(hay, b'\n') }, Some(2));
    }

    #[test]
    fn test_sse2_unroll_reports_earliest_chunk() {
        let (mut buf, start) = aligned(64, 0);
        buf[start + 50] = b'\n';
        buf[start + 20] = b'\n';
        let hay = &buf[start..start + 64];
        assert_eq!(unsafe { find_byte_sse2_unroll(hay, b'\n') }, Some(20));
        assert_eq!(unsafe { find_byte_sse2_unroll_prefetch(hay, b'\n') }, Some(20));
    }

    #[test]
    fn test_sse2_short_buffer_uses_tail() {
        let data = b"abcdefghijklmno";
        assert_eq!(data.len(), 15);
        assert_eq!(unsafe { find_byte_sse2(data, b'o') }, Some(14));
        assert_eq!(unsafe { find_byte_sse2(data, b'z') }, None);
    }

    #[test]
    fn test_sse2_prefetch_over_long_buffer() {
        let (mut buf, start) = aligned(8192, 5);
        buf[start + 8000] = b'\n';
        let hay = &buf[start..start + 8192];
        assert_eq!(unsafe { find_byte_sse2_prefetch(hay, b'\n') }, Some(8000));
    }

    #[test]
    fn test_avx2_lane_31_mask_is_not_sign_extended() {
        if !std::arch::is_x86_feature_detected!("avx2") {
            return;
        }
        let (mut buf, start) = aligned(96, 0);
        buf[start + 31] = b'\n';
        let hay = &buf[start..start + 96];
        assert_eq!(unsafe { find_byte_avx2(hay, b'\n') }, Some(31));
        assert_eq!(unsafe { find_byte_avx2_unroll(hay, b'\n') }, Some(31));
    }

    #[test]
    fn test_all_compiled_kernels_agree_on_short_lengths() {
        let avx2 = std::arch::is_x86_feature_detected!("avx2");
        for len in 0..200 {
            let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            for needle in [0u8, 7, 150, 250] {
                let expected = find_byte_scalar(&data, needle);
                assert_eq!(unsafe { find_byte_sse2(&data, needle) }, expected);
                assert_eq!(unsafe { find_byte_sse2_unroll(&data, needle) }, expected);
                if avx2 {
                    assert_eq!(unsafe { find_byte_avx2(&data, needle) }, expected);
                    assert_eq!(unsafe { find_byte_avx2_unroll_prefetch(&data, needle) }, expected);
                }
            }
        }
    }
}
