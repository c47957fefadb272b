use std::ops::RangeInclusive;

use rand::distributions::Uniform;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::BenchConfig;

pub const PRINTABLE: RangeInclusive<u8> = 32..=126;
pub const DEFAULT_SEPARATOR: u8 = b'\n';

/// Deterministic synthetic text: printable ASCII with a separator every
/// `stride` bytes, starting at offset 0.
#[derive(Debug, Clone)]
pub struct Workload {
    pristine: Vec<u8>,
    bytes: Vec<u8>,
    stride: usize,
    clip: usize,
    separator: u8,
    seed: u64,
}

impl Workload {
    pub fn generate(total_size: usize, stride: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let dist = Uniform::new_inclusive(*PRINTABLE.start(), *PRINTABLE.end());
        let pristine: Vec<u8> = (&mut rng).sample_iter(dist).take(total_size).collect();

        let mut workload = Self {
            bytes: Vec::with_capacity(total_size),
            pristine,
            stride,
            clip: 0,
            separator: DEFAULT_SEPARATOR,
            seed,
        };
        workload.rebuild();
        workload
    }

    pub fn from_config(config: &BenchConfig, total_size: usize) -> Self {
        let mut workload = Self::generate(total_size, config.line_size, config.seed)
            .with_separator(config.separator);
        workload.clip(config.clip_size);
        workload
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        if separator != self.separator {
            self.separator = separator;
            self.rebuild();
        }
        self
    }

    /// Drops `clip` bytes from the end; saturates at an empty buffer.
    pub fn clip(&mut self, clip: usize) {
        if clip != self.clip {
            self.clip = clip;
            self.rebuild();
        }
    }

    /// Re-places separators from the untouched random text.
    pub fn set_stride(&mut self, stride: usize) {
        if stride != self.stride {
            self.stride = stride;
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        let keep = self.pristine.len().saturating_sub(self.clip);
        self.bytes.clear();
        self.bytes.extend_from_slice(&self.pristine[..keep]);
        if self.stride > 0 {
            for i in (0..keep).step_by(self.stride) {
                self.bytes[i] = self.separator;
            }
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn separator(&self) -> u8 {
        self.separator
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of separators written; random text never contains `'\n'`, but
    /// a printable separator may also occur naturally.
    pub fn separator_count(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.len().div_ceil(self.stride)
        }
    }
}
