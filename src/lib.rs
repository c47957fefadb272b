pub mod catalog;
pub mod config;
pub mod error;
pub mod lines;
pub mod mmap;
pub mod scan;
pub mod simd;
pub mod workload;

pub use catalog::{Catalog, Strategy, StrategyDescriptor, StrategyId, find_byte};
pub use config::{BenchConfig, ThreadRange, TimeUnit, ValueRange};
pub use error::{Result, ScanError};
pub use lines::{Lines, consume_lines, count_lines};
pub use mmap::MappedBuffer;
pub use scan::{PREFETCH_DISTANCE, ScanFn, ScanResult, UNROLL_FACTOR};
pub use simd::{
    SimdInfo, SimdLevel, best_simd_level, is_avx2_available, is_avx512_available,
    is_simd_available, simd_info,
};
pub use workload::Workload;

pub mod bench;
