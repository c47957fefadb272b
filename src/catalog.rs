//! Strategy catalog and feature dispatcher.
//!
//! Every (tier x unroll x prefetch) combination is a [`StrategyId`]. The
//! process-wide [`Catalog`] binds each one to its kernel once, after runtime
//! capability detection, and hands out [`Strategy`] handles only for tiers the
//! host supports. Requesting anything else fails with
//! [`ScanError::UnsupportedIsa`]; there is no silent substitution.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::error::{Result, ScanError};
use crate::scan::{self, PREFETCH_DISTANCE, ScanFn, ScanResult, UNROLL_FACTOR};
use crate::simd::{SimdInfo, SimdLevel, simd_info};

static GLOBAL_CATALOG: OnceLock<Catalog> = OnceLock::new();

const NAME_PREFIX: &str = "find_byte_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyId {
    Scalar,
    Memchr,
    Sse2,
    Sse2Prefetch,
    Sse2Unroll,
    Sse2UnrollPrefetch,
    Avx2,
    Avx2Prefetch,
    Avx2Unroll,
    Avx2UnrollPrefetch,
    Avx512,
    Avx512Prefetch,
    Avx512Unroll,
    Avx512UnrollPrefetch,
}

/// Static description of a strategy: what it needs and how its loop is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyDescriptor {
    pub name: &'static str,
    pub level: SimdLevel,
    /// Bytes per compare; always a power of two.
    pub width: usize,
    /// Chunks per loop iteration, 1 or 4.
    pub unroll: usize,
    pub prefetch: Option<usize>,
}

impl StrategyId {
    /// Baselines first, then each tier from narrowest to widest as plain,
    /// prefetch, unroll, unroll + prefetch.
    pub const ALL: [StrategyId; 14] = [
        StrategyId::Scalar,
        StrategyId::Memchr,
        StrategyId::Sse2,
        StrategyId::Sse2Prefetch,
        StrategyId::Sse2Unroll,
        StrategyId::Sse2UnrollPrefetch,
        StrategyId::Avx2,
        StrategyId::Avx2Prefetch,
        StrategyId::Avx2Unroll,
        StrategyId::Avx2UnrollPrefetch,
        StrategyId::Avx512,
        StrategyId::Avx512Prefetch,
        StrategyId::Avx512Unroll,
        StrategyId::Avx512UnrollPrefetch,
    ];

    pub const fn descriptor(self) -> StrategyDescriptor {
        use StrategyId::*;
        let (name, level, unroll, prefetch) = match self {
            Scalar => ("find_byte_scalar", SimdLevel::Scalar, false, false),
            Memchr => ("find_byte_memchr", SimdLevel::Scalar, false, false),
            Sse2 => ("find_byte_sse2", SimdLevel::Sse2, false, false),
            Sse2Prefetch => ("find_byte_sse2_prefetch", SimdLevel::Sse2, false, true),
            Sse2Unroll => ("find_byte_sse2_unroll", SimdLevel::Sse2, true, false),
            Sse2UnrollPrefetch => ("find_byte_sse2_unroll_prefetch", SimdLevel::Sse2, true, true),
            Avx2 => ("find_byte_avx2", SimdLevel::Avx2, false, false),
            Avx2Prefetch => ("find_byte_avx2_prefetch", SimdLevel::Avx2, false, true),
            Avx2Unroll => ("find_byte_avx2_unroll", SimdLevel::Avx2, true, false),
            Avx2UnrollPrefetch => ("find_byte_avx2_unroll_prefetch", SimdLevel::Avx2, true, true),
            Avx512 => ("find_byte_avx512", SimdLevel::Avx512, false, false),
            Avx512Prefetch => ("find_byte_avx512_prefetch", SimdLevel::Avx512, false, true),
            Avx512Unroll => ("find_byte_avx512_unroll", SimdLevel::Avx512, true, false),
            Avx512UnrollPrefetch => (
                "find_byte_avx512_unroll_prefetch",
                SimdLevel::Avx512,
                true,
                true,
            ),
        };
        StrategyDescriptor {
            name,
            level,
            width: level.width(),
            unroll: if unroll { UNROLL_FACTOR } else { 1 },
            prefetch: if prefetch {
                Some(PREFETCH_DISTANCE)
            } else {
                None
            },
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        self.descriptor().name
    }

    #[inline]
    pub const fn level(self) -> SimdLevel {
        self.descriptor().level
    }

    /// The kernel compiled into this build, if any.
    fn kernel(self) -> Option<ScanFn> {
        use StrategyId::*;
        match self {
            Scalar => Some(scan::find_byte_scalar as ScanFn),
            Memchr => Some(scan::find_byte_memchr as ScanFn),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Sse2 => Some(scan::find_byte_sse2 as ScanFn),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Sse2Prefetch => Some(scan::find_byte_sse2_prefetch as ScanFn),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Sse2Unroll => Some(scan::find_byte_sse2_unroll as ScanFn),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Sse2UnrollPrefetch => Some(scan::find_byte_sse2_unroll_prefetch as ScanFn),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Avx2 => Some(scan::find_byte_avx2 as ScanFn),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Avx2Prefetch => Some(scan::find_byte_avx2_prefetch as ScanFn),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Avx2Unroll => Some(scan::find_byte_avx2_unroll as ScanFn),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Avx2UnrollPrefetch => Some(scan::find_byte_avx2_unroll_prefetch as ScanFn),
            #[cfg(all(feature = "avx512", target_arch = "x86_64"))]
            Avx512 => Some(scan::find_byte_avx512 as ScanFn),
            #[cfg(all(feature = "avx512", target_arch = "x86_64"))]
            Avx512Prefetch => Some(scan::find_byte_avx512_prefetch as ScanFn),
            #[cfg(all(feature = "avx512", target_arch = "x86_64"))]
            Avx512Unroll => Some(scan::find_byte_avx512_unroll as ScanFn),
            #[cfg(all(feature = "avx512", target_arch = "x86_64"))]
            Avx512UnrollPrefetch => Some(scan::find_byte_avx512_unroll_prefetch as ScanFn),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyId {
    type Err = ScanError;

    /// Accepts the full name (`find_byte_avx2_unroll`) or the tag without the
    /// prefix (`avx2_unroll`), case-insensitively. `sse` is read as `sse2`.
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        let tag = lowered.strip_prefix(NAME_PREFIX).unwrap_or(&lowered);
        let tag = match tag.strip_prefix("sse") {
            Some(rest) if rest.is_empty() || rest.starts_with('_') => format!("sse2{}", rest),
            _ => tag.to_string(),
        };
        StrategyId::ALL
            .into_iter()
            .find(|id| id.name()[NAME_PREFIX.len()..] == tag)
            .ok_or_else(|| ScanError::UnknownStrategy(s.to_string()))
    }
}

/// A strategy verified to run on this host.
#[derive(Clone, Copy)]
pub struct Strategy {
    id: StrategyId,
    kernel: ScanFn,
}

impl Strategy {
    /// The scalar baseline, available everywhere.
    pub fn scalar() -> Self {
        Self {
            id: StrategyId::Scalar,
            kernel: scan::find_byte_scalar,
        }
    }

    #[inline]
    pub fn id(&self) -> StrategyId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    #[inline]
    pub fn descriptor(&self) -> StrategyDescriptor {
        self.id.descriptor()
    }

    /// Offset of the first `needle` in `haystack`, or `None`.
    #[inline]
    pub fn find(&self, haystack: &[u8], needle: u8) -> ScanResult {
        // SAFETY: a Strategy is only built by the Catalog after confirming the
        // host supports the kernel's tier.
        unsafe { (self.kernel)(haystack, needle) }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("id", &self.id).finish()
    }
}

impl PartialEq for Strategy {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Strategy {}

#[derive(Clone, Copy)]
struct Entry {
    id: StrategyId,
    kernel: Option<ScanFn>,
}

/// Ordered, read-only table of every strategy.
pub struct Catalog {
    entries: Vec<Entry>,
    info: SimdInfo,
    best: Strategy,
}

impl Catalog {
    /// The process-wide catalog, built on first use.
    pub fn global() -> &'static Catalog {
        GLOBAL_CATALOG.get_or_init(|| Catalog::with_capabilities(simd_info()))
    }

    /// Builds a catalog limited to `info`.
    ///
    /// `info` is intersected with the detected host capabilities, so claiming
    /// a tier the host lacks cannot unlock its kernels.
    pub fn with_capabilities(info: SimdInfo) -> Self {
        let host = simd_info();
        let info = SimdInfo {
            available: info.available && host.available,
            sse2: info.sse2 && host.sse2,
            avx2: info.avx2 && host.avx2,
            avx512: info.avx512 && host.avx512,
        };

        let entries: Vec<Entry> = StrategyId::ALL
            .into_iter()
            .map(|id| Entry {
                id,
                kernel: id.kernel(),
            })
            .collect();

        let best = entries
            .iter()
            .filter(|e| e.id != StrategyId::Memchr)
            .filter(|e| e.id.descriptor().prefetch.is_none())
            .filter_map(|e| Self::checked(&info, e))
            .max_by_key(|s| (s.descriptor().level, s.descriptor().unroll))
            .unwrap_or_else(Strategy::scalar);

        debug!(
            strategies = entries.len(),
            best_level = %info.best_available(),
            best = best.name(),
            "built strategy catalog"
        );

        Self {
            entries,
            info,
            best,
        }
    }

    fn checked(info: &SimdInfo, entry: &Entry) -> Option<Strategy> {
        if !info.supports(entry.id.level()) {
            return None;
        }
        entry.kernel.map(|kernel| Strategy {
            id: entry.id,
            kernel,
        })
    }

    #[inline]
    pub fn capabilities(&self) -> SimdInfo {
        self.info
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = StrategyId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = StrategyDescriptor> + '_ {
        self.entries.iter().map(|e| e.id.descriptor())
    }

    pub fn is_supported(&self, id: StrategyId) -> bool {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| Self::checked(&self.info, e))
            .is_some()
    }

    /// Resolves `id` to a runnable strategy.
    pub fn resolve(&self, id: StrategyId) -> Result<Strategy> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| ScanError::UnknownStrategy(id.name().to_string()))?;

        Self::checked(&self.info, entry).ok_or_else(|| {
            warn!(strategy = id.name(), required = %id.level(), "strategy unsupported on this host");
            ScanError::UnsupportedIsa {
                strategy: id.name(),
                required: id.level(),
                available: self.info.best_available(),
            }
        })
    }

    pub fn resolve_name(&self, name: &str) -> Result<Strategy> {
        self.resolve(name.parse()?)
    }

    /// Every strategy runnable here, in catalog order.
    pub fn supported(&self) -> impl Iterator<Item = Strategy> + '_ {
        self.entries
            .iter()
            .filter_map(|e| Self::checked(&self.info, e))
    }

    /// Widest supported tier, unrolled, without prefetch.
    #[inline]
    pub fn best(&self) -> Strategy {
        self.best
    }
}

/// Finds `needle` with the best strategy this host supports.
#[inline]
pub fn find_byte(haystack: &[u8], needle: u8) -> ScanResult {
    Catalog::global().best().find(haystack, needle)
}
