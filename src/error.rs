use std::path::PathBuf;

use thiserror::Error;

use crate::simd::SimdLevel;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Strategy '{strategy}' requires {required}, host supports up to {available}")]
    UnsupportedIsa {
        strategy: &'static str,
        required: SimdLevel,
        available: SimdLevel,
    },

    #[error("Unknown strategy: '{0}'")]
    UnknownStrategy(String),

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Config file does not exist: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(err: serde_json::Error) -> Self {
        ScanError::Json(err.to_string())
    }
}

impl ScanError {
    #[inline]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ScanError::UnsupportedIsa { .. })
    }

    #[inline]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidConfig { .. } | ScanError::ConfigNotFound(_) | ScanError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_isa_message() {
        let err = ScanError::UnsupportedIsa {
            strategy: "find_byte_avx512",
            required: SimdLevel::Avx512,
            available: SimdLevel::Avx2,
        };
        assert!(err.is_unsupported());
        assert!(!err.is_config());
        assert_eq!(
            err.to_string(),
            "Strategy 'find_byte_avx512' requires AVX-512, host supports up to AVX2"
        );
    }

    #[test]
    fn test_io_conversion() {
        let err: ScanError = std::io::Error::other("disk gone").into();
        assert_eq!(err, ScanError::Io("disk gone".to_string()));
    }

    #[test]
    fn test_json_conversion_is_config_error() {
        let err: ScanError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.is_config());
    }
}
