#![no_main]

use bytescan::{Catalog, Lines, Strategy, consume_lines};
use libfuzzer_sys::fuzz_target;

const MAX_SKIP: usize = 64;

fuzz_target!(|data: &[u8]| {
    let Some((&needle, rest)) = data.split_first() else {
        return;
    };
    let Some((&skip, hay)) = rest.split_first() else {
        return;
    };
    let hay = &hay[(skip as usize % MAX_SKIP).min(hay.len())..];

    let scalar = Strategy::scalar();
    let expected = scalar.find(hay, needle);
    let expected_consumed = consume_lines(hay, needle, &scalar);

    for strategy in Catalog::global().supported() {
        let got = strategy.find(hay, needle);
        if got != expected {
            panic!("{}: {:?} != scalar {:?}", strategy.name(), got, expected);
        }
        if let Some(i) = got
            && (hay[i] != needle || hay[..i].contains(&needle))
        {
            panic!("{}: offset {} is not the first match", strategy.name(), i);
        }
        if consume_lines(hay, needle, &strategy) != expected_consumed {
            panic!("{}: consume_lines disagrees with scalar", strategy.name());
        }
        let total: usize = Lines::new(hay, needle, strategy).map(|l| l.len() + 1).sum();
        if total < hay.len() {
            panic!("{}: lines lost bytes", strategy.name());
        }
    }
});
