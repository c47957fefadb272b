
use bytescan::{Lines, Strategy, count_lines};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn every_strategy_matches_scalar(
        hay in proptest::collection::vec(any::<u8>(), 0..1024),
        needle in any::<u8>(),
        skip in 0usize..64,
    ) {
        let hay = &hay[skip.min(hay.len())..];
        let expected = Strategy::scalar().find(hay, needle);
        for s in fixtures::supported() {
            prop_assert_eq!(s.find(hay, needle), expected, "{}", s.name());
        }
    }

    #[test]
    fn found_offset_is_first_occurrence(
        hay in proptest::collection::vec(0u8..4, 1..600),
        needle in 0u8..4,
    ) {
        for s in fixtures::supported() {
            match s.find(&hay, needle) {
                Some(i) => {
                    prop_assert_eq!(hay[i], needle);
                    prop_assert!(!hay[..i].contains(&needle));
                }
                None => prop_assert!(!hay.contains(&needle)),
            }
        }
    }

    #[test]
    fn lines_rejoin_to_input(text in "[a-c\n]{0,400}") {
        let bytes = text.as_bytes();
        for s in fixtures::supported() {
            let lines: Vec<&[u8]> = Lines::new(bytes, b'\n', s).collect();
            let mut joined = lines.join(&b'\n');
            if bytes.last() == Some(&b'\n') {
                joined.push(b'\n');
            }
            prop_assert_eq!(&joined[..], bytes);
            prop_assert_eq!(count_lines(bytes, b'\n', &s), text.lines().count());
        }
    }
}
