/// Byte-by-byte scan; the reference every vector strategy must agree with.
#[inline]
pub fn find_byte_scalar(haystack: &[u8], needle: u8) -> Option<usize> {
    scan_tail(haystack, 0, needle)
}

/// Platform-library baseline backed by the `memchr` crate.
#[inline]
pub fn find_byte_memchr(haystack: &[u8], needle: u8) -> Option<usize> {
    memchr::memchr(needle, haystack)
}

/// Finishes a scan from `start` to the end of `haystack`, reporting the
/// offset relative to the start of `haystack`.
#[inline(always)]
pub(crate) fn scan_tail(haystack: &[u8], start: usize, needle: u8) -> Option<usize> {
    let mut i = start;
    while i < haystack.len() {
        if haystack[i] == needle {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_first_match_wins() {
        assert_eq!(find_byte_scalar(b"abcabc", b'b'), Some(1));
        assert_eq!(find_byte_scalar(b"abcabc", b'c'), Some(2));
    }

    #[test]
    fn test_scalar_empty_and_missing() {
        assert_eq!(find_byte_scalar(&[], b'a'), None);
        assert_eq!(find_byte_scalar(b"abc", b'z'), None);
    }

    #[test]
    fn test_tail_reports_absolute_offset() {
        let data = b"x..x..x";
        assert_eq!(scan_tail(data, 1, b'x'), Some(3));
        assert_eq!(scan_tail(data, 4, b'x'), Some(6));
        assert_eq!(scan_tail(data, 7, b'x'), None);
    }

    #[test]
    fn test_memchr_matches_scalar() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        for needle in [0u8, 1, 127, 200, 255] {
            assert_eq!(
                find_byte_memchr(&data, needle),
                find_byte_scalar(&data, needle)
            );
        }
    }
}
