use std::sync::OnceLock;

static SIMD_INFO_CACHE: OnceLock<SimdInfo> = OnceLock::new();

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
#[inline]
fn detect_sse2() -> bool {
    is_x86_feature_detected!("sse2")
}

#[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
#[inline]
fn detect_sse2() -> bool {
    false
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
#[inline]
fn detect_avx2() -> bool {
    is_x86_feature_detected!("avx2")
}

#[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
#[inline]
fn detect_avx2() -> bool {
    false
}

#[cfg(all(feature = "avx512", target_arch = "x86_64"))]
#[inline]
fn detect_avx512() -> bool {
    is_x86_feature_detected!("avx512f") && is_x86_feature_detected!("avx512bw")
}

#[cfg(not(all(feature = "avx512", target_arch = "x86_64")))]
#[inline]
fn detect_avx512() -> bool {
    false
}

fn detect() -> SimdInfo {
    let sse2 = detect_sse2();
    SimdInfo {
        available: sse2,
        sse2,
        avx2: detect_avx2(),
        avx512: detect_avx512(),
    }
}

/// Capabilities of the host, as far as this build can use them.
///
/// A tier whose cargo feature is disabled reports `false` even when the CPU
/// has it, because no kernel was compiled for it.
#[inline]
pub fn simd_info() -> SimdInfo {
    *SIMD_INFO_CACHE.get_or_init(detect)
}

#[inline]
pub fn is_simd_available() -> bool {
    simd_info().available
}

#[inline]
pub fn is_avx2_available() -> bool {
    simd_info().avx2
}

#[inline]
pub fn is_avx512_available() -> bool {
    simd_info().avx512
}

#[inline]
pub fn best_simd_level() -> SimdLevel {
    simd_info().best_available()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimdInfo {
    pub available: bool,
    pub sse2: bool,
    pub avx2: bool,
    pub avx512: bool,
}

impl SimdInfo {
    pub const fn scalar_only() -> Self {
        Self {
            available: false,
            sse2: false,
            avx2: false,
            avx512: false,
        }
    }

    pub fn best_available(&self) -> SimdLevel {
        if self.avx512 {
            SimdLevel::Avx512
        } else if self.avx2 {
            SimdLevel::Avx2
        } else if self.sse2 {
            SimdLevel::Sse2
        } else {
            SimdLevel::Scalar
        }
    }

    pub fn supports(&self, level: SimdLevel) -> bool {
        match level {
            SimdLevel::Scalar => true,
            SimdLevel::Sse2 => self.sse2,
            SimdLevel::Avx2 => self.avx2,
            SimdLevel::Avx512 => self.avx512,
        }
    }

    pub fn register_width(&self) -> usize {
        self.best_available().width()
    }

    pub fn supported_levels(&self) -> impl Iterator<Item = SimdLevel> + '_ {
        SimdLevel::ALL.into_iter().filter(|l| self.supports(*l))
    }
}

/// Instruction-set tier gating which strategies may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SimdLevel {
    Scalar,
    Sse2,
    Avx2,
    Avx512,
}

impl SimdLevel {
    pub const ALL: [SimdLevel; 4] = [
        SimdLevel::Scalar,
        SimdLevel::Sse2,
        SimdLevel::Avx2,
        SimdLevel::Avx512,
    ];

    /// Bytes compared per vector instruction; 1 for the scalar tier.
    pub const fn width(self) -> usize {
        match self {
            SimdLevel::Scalar => 1,
            SimdLevel::Sse2 => 16,
            SimdLevel::Avx2 => 32,
            SimdLevel::Avx512 => 64,
        }
    }
}

impl std::fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimdLevel::Scalar => write!(f, "Scalar"),
            SimdLevel::Sse2 => write!(f, "SSE2"),
            SimdLevel::Avx2 => write!(f, "AVX2"),
            SimdLevel::Avx512 => write!(f, "AVX-512"),
        }
    }
}
