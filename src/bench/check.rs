use crate::catalog::{Catalog, Strategy, StrategyId};
use crate::lines::consume_lines;

/// Offsets swept from the buffer start so every alignment class of the
/// widest register is exercised.
const MISALIGN_SWEEP: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub strategy: StrategyId,
    pub consumed: usize,
    /// Start offsets whose first-match result differed from scalar.
    pub mismatches: Vec<usize>,
}

impl CheckOutcome {
    pub fn passed(&self, expected_consumed: usize) -> bool {
        self.mismatches.is_empty() && self.consumed == expected_consumed
    }
}

pub struct CheckReport {
    pub expected_consumed: usize,
    pub outcomes: Vec<CheckOutcome>,
}

impl CheckReport {
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed(self.expected_consumed))
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !o.passed(self.expected_consumed))
    }
}

/// Runs every supported strategy against the scalar scan over `data`:
/// the full line walk, plus single searches for `separator` and for an
/// absent byte from each start offset in the sweep.
pub fn cross_validate(catalog: &Catalog, data: &[u8], separator: u8) -> CheckReport {
    let scalar = Strategy::scalar();
    let expected_consumed = consume_lines(data, separator, &scalar);
    let absent = absent_byte(data);

    let outcomes = catalog
        .supported()
        .map(|strategy| {
            let mismatches = (0..MISALIGN_SWEEP.min(data.len() + 1))
                .filter(|&off| {
                    let tail = &data[off..];
                    strategy.find(tail, separator) != scalar.find(tail, separator)
                        || absent.is_some_and(|b| strategy.find(tail, b).is_some())
                })
                .collect();
            CheckOutcome {
                strategy: strategy.id(),
                consumed: consume_lines(data, separator, &strategy),
                mismatches,
            }
        })
        .collect();

    CheckReport {
        expected_consumed,
        outcomes,
    }
}

fn absent_byte(data: &[u8]) -> Option<u8> {
    let mut seen = [false; 256];
    for &b in data {
        seen[b as usize] = true;
    }
    seen.iter().position(|s| !s).map(|b| b as u8)
}
