use crate::core::hash::DEFAULT_HASH_SIZE;
use crate::core::quality::QualityStrategy;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest accepted tolerance: 0 is "very similar", 5 "somewhat similar".
pub const MAX_TOLERANCE: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid tolerance {value}; valid range is 0..={max}")]
    InvalidTolerance { value: i64, max: u32 },

    #[error("Unknown quality strategy {name:?}; expected `resolution` or `file-size`")]
    UnknownStrategy { name: String },

    #[error("Input directory {} does not exist or is not a directory", .path.display())]
    InvalidInputDir { path: PathBuf },

    #[error("Output directory {} does not exist or is not a directory", .path.display())]
    InvalidOutputDir { path: PathBuf },

    #[error("Output directory {} is the directory being scanned", .path.display())]
    OutputIsInput { path: PathBuf },

    #[error("Invalid hash size {size}")]
    InvalidHashSize { size: u32 },

    #[error("Worker count must be at least 1")]
    InvalidJobs,
}

/// Maximum Hamming distance at which two fingerprints count as duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tolerance(u32);

impl Tolerance {
    pub fn new(value: i64) -> Result<Self, ConfigError> {
        if (0..=i64::from(MAX_TOLERANCE)).contains(&value) {
            Ok(Self(value as u32))
        } else {
            Err(ConfigError::InvalidTolerance {
                value,
                max: MAX_TOLERANCE,
            })
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Tolerance {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Tolerance::new(value)
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Where kept images are copied. Must already exist.
    pub output_dir: PathBuf,
    pub tolerance: Tolerance,
    pub strategy: QualityStrategy,
    /// Report decisions without touching the filesystem.
    pub dry_run: bool,
    pub hash_size: u32,
    /// Worker threads used for decoding and hashing; 1 keeps everything on
    /// the calling thread.
    pub jobs: usize,
}

impl ScanConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            tolerance: Tolerance::default(),
            strategy: QualityStrategy::default(),
            dry_run: false,
            hash_size: DEFAULT_HASH_SIZE,
            jobs: 1,
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_strategy(mut self, strategy: QualityStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Checks that do not depend on the directory being scanned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.output_dir.is_dir() {
            return Err(ConfigError::InvalidOutputDir {
                path: self.output_dir.clone(),
            });
        }

        let bits = self.hash_size.saturating_mul(self.hash_size);
        if bits == 0 || self.tolerance.get() > bits {
            return Err(ConfigError::InvalidHashSize {
                size: self.hash_size,
            });
        }

        if self.jobs == 0 {
            return Err(ConfigError::InvalidJobs);
        }

        Ok(())
    }

    pub fn validate_input(&self, input_dir: &Path) -> Result<(), ConfigError> {
        if !input_dir.is_dir() {
            return Err(ConfigError::InvalidInputDir {
                path: input_dir.to_path_buf(),
            });
        }

        self.validate()?;

        let same = match (
            fs::canonicalize(input_dir),
            fs::canonicalize(&self.output_dir),
        ) {
            (Ok(input), Ok(output)) => input == output,
            _ => false,
        };
        if same {
            return Err(ConfigError::OutputIsInput {
                path: self.output_dir.clone(),
            });
        }

        Ok(())
    }
}
