use std::iter::FusedIterator;

use crate::catalog::Strategy;

/// Walks `haystack` separator by separator and returns the offset just past
/// the last separator found (0 when there is none).
///
/// This is the benchmark body: its cost is dominated by repeated short scans,
/// so it exercises the prolog and tail as much as the main loop.
pub fn consume_lines(haystack: &[u8], separator: u8, strategy: &Strategy) -> usize {
    let mut pos = 0;
    while pos < haystack.len() {
        match strategy.find(&haystack[pos..], separator) {
            Some(i) => pos += i + 1,
            None => break,
        }
    }
    pos
}

pub fn count_lines(haystack: &[u8], separator: u8, strategy: &Strategy) -> usize {
    Lines::new(haystack, separator, *strategy).count()
}

/// Iterator over the lines of a buffer, separators stripped.
///
/// Mirrors `str::lines` splitting rules: a trailing separator does not produce
/// an empty final line, but an unterminated final fragment is yielded.
pub struct Lines<'a> {
    haystack: &'a [u8],
    separator: u8,
    strategy: Strategy,
    pos: usize,
}

impl<'a> Lines<'a> {
    pub fn new(haystack: &'a [u8], separator: u8, strategy: Strategy) -> Self {
        Self {
            haystack,
            separator,
            strategy,
            pos: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.haystack.len() {
            return None;
        }
        let rest = &self.haystack[self.pos..];
        match self.strategy.find(rest, self.separator) {
            Some(i) => {
                self.pos += i + 1;
                Some(&rest[..i])
            }
            None => {
                self.pos = self.haystack.len();
                Some(rest)
            }
        }
    }
}

impl FusedIterator for Lines<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_consume_stops_after_last_separator() {
        let s = Strategy::scalar();
        assert_eq!(consume_lines(b"ab\ncd\nef", b'\n', &s), 6);
        assert_eq!(consume_lines(b"ab\ncd\n", b'\n', &s), 6);
        assert_eq!(consume_lines(b"abcdef", b'\n', &s), 0);
        assert_eq!(consume_lines(b"", b'\n', &s), 0);
    }

    #[test]
    fn test_lines_match_str_lines() {
        let s = Strategy::scalar();
        for text in ["", "a", "a\n", "a\nb", "\n\n", "one\ntwo\n\nthree"] {
            let ours: Vec<&[u8]> = Lines::new(text.as_bytes(), b'\n', s).collect();
            let std: Vec<&[u8]> = text.lines().map(str::as_bytes).collect();
            assert_eq!(ours, std, "text {:?}", text);
        }
    }

    #[test]
    fn test_every_supported_strategy_splits_identically() {
        let text: Vec<u8> = (0..5000)
            .map(|i| if i % 37 == 0 { b'\n' } else { b'a' + (i % 26) as u8 })
            .collect();
        let expected = count_lines(&text, b'\n', &Strategy::scalar());
        for strategy in Catalog::global().supported() {
            assert_eq!(count_lines(&text, b'\n', &strategy), expected, "{}", strategy.name());
            assert_eq!(
                consume_lines(&text, b'\n', &strategy),
                consume_lines(&text, b'\n', &Strategy::scalar())
            );
        }
    }
}
