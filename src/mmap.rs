use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::{info, warn};

use crate::catalog::Strategy;
use crate::error::{Result, ScanError};
use crate::lines::{self, Lines};

/// A read-only file mapped into memory, used as a real-text workload.
pub struct MappedBuffer {
    mmap: Mmap,
    path: PathBuf,
}

/// Largest input accepted for `--input`.
const MAX_INPUT_BYTES: u64 = 16 << 30;

impl MappedBuffer {
    /// Maps `path` read-only. Empty files and files over 16 GiB are rejected.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let bytes = file.metadata()?.len();

        let rejected = match bytes {
            0 => Some("input file is empty".to_string()),
            n if n > MAX_INPUT_BYTES => Some(format!(
                "input file is {n} bytes, over the {MAX_INPUT_BYTES} byte limit"
            )),
            _ => None,
        };
        if let Some(reason) = rejected {
            warn!(path = %path.display(), bytes, "rejected input file");
            return Err(ScanError::Io(format!("{}: {reason}", path.display())));
        }

        // SAFETY: the mapping is read-only; the file must not be truncated
        // by another process while mapped.
        let mmap = unsafe { Mmap::map(&file)? };
        info!(path = %path.display(), bytes, "mapped input file");
        Ok(Self {
            mmap,
            path: path.to_path_buf(),
        })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self, separator: u8, strategy: Strategy) -> Lines<'_> {
        Lines::new(&self.mmap, separator, strategy)
    }

    pub fn count_lines(&self, separator: u8, strategy: &Strategy) -> usize {
        lines::count_lines(&self.mmap, separator, strategy)
    }
}
