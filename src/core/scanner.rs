use crate::core::config::{ConfigError, ScanConfig};
use crate::core::discovery::discover_files;
use crate::core::duplicate::{Decision, DuplicateDetector, Representative};
use crate::core::hash::{encode, HashError};
use crate::core::image::{ImageLoadError, ImageRecord};
use crate::core::output::{OutputDir, OutputError};
use crate::core::quality::{evaluate, QualityStrategy};
use crate::core::similarity::LengthMismatchError;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Failures that abort a scan. Per-file problems become skip decisions instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Fingerprint comparison failed: {0}")]
    LengthMismatch(#[from] LengthMismatchError),

    #[error("Hash computation error: {0}")]
    Hash(#[from] HashError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Scan already finished")]
    AlreadyDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanState {
    Scanning,
    Done,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanProgress {
    pub current_file: PathBuf,
    pub processed: usize,
    pub total: usize,
}

pub type ProgressCallback = Box<dyn Fn(&ScanProgress) + Send + Sync>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// One image per cluster, in cluster creation order.
    pub retained: Vec<ImageRecord>,
    /// One decision per input file, in traversal order.
    pub decisions: Vec<Decision>,
}

impl ScanReport {
    pub fn duplicates(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_duplicate()).count()
    }

    pub fn skipped(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_skipped()).count()
    }
}

enum Analysis {
    Ready(Representative),
    Skipped(Decision),
}

/// Decode, hash and score one file.
fn analyze(path: &Path, hash_size: u32, strategy: QualityStrategy) -> Result<Analysis, HashError> {
    let (record, image) = match ImageRecord::open(path) {
        Ok(opened) => opened,
        Err(err) => {
            let message = err.to_string();
            let decision = match err {
                ImageLoadError::Decode { path, .. } => {
                    Decision::SkippedDecodeError { path, message }
                }
                ImageLoadError::Io { path, .. } => Decision::SkippedIoError { path, message },
            };
            return Ok(Analysis::Skipped(decision));
        }
    };

    let fingerprint = encode(&image, hash_size)?;
    drop(image);

    let score = evaluate(&record, strategy);
    Ok(Analysis::Ready(Representative {
        record,
        fingerprint,
        score,
    }))
}

pub struct Scanner {
    config: ScanConfig,
    state: ScanState,
    detector: DuplicateDetector,
    output: Option<OutputDir>,
    decisions: Vec<Decision>,
    progress: Option<ProgressCallback>,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let output = if config.dry_run {
            None
        } else {
            Some(OutputDir::new(&config.output_dir))
        };

        Ok(Self {
            detector: DuplicateDetector::new(config.tolerance),
            config,
            state: ScanState::Scanning,
            output,
            decisions: Vec::new(),
            progress: None,
        })
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Process `paths` in order and return the retained images and decisions.
    pub fn run(&mut self, paths: &[PathBuf]) -> Result<ScanReport, ScanError> {
        if self.state == ScanState::Done {
            return Err(ScanError::AlreadyDone);
        }

        info!(
            "Scanning {} files (tolerance {}, quality {}, jobs {}{})",
            paths.len(),
            self.config.tolerance.get(),
            self.config.strategy,
            self.config.jobs,
            if self.config.dry_run { ", dry run" } else { "" }
        );

        if self.config.jobs > 1 {
            self.run_parallel(paths)?;
        } else {
            self.run_sequential(paths)?;
        }

        self.state = ScanState::Done;

        let report = ScanReport {
            retained: self.detector.retained(),
            decisions: std::mem::take(&mut self.decisions),
        };
        info!(
            "Scan complete: {} kept, {} duplicates, {} skipped",
            report.retained.len(),
            report.duplicates(),
            report.skipped()
        );
        Ok(report)
    }

    fn run_sequential(&mut self, paths: &[PathBuf]) -> Result<(), ScanError> {
        let total = paths.len();
        for (index, path) in paths.iter().enumerate() {
            let analysis = analyze(path, self.config.hash_size, self.config.strategy)?;
            self.report_progress(path, index + 1, total);
            self.merge(analysis)?;
        }
        Ok(())
    }

    /// Decode and hash on a worker pool, then merge serially in input order.
    fn run_parallel(&mut self, paths: &[PathBuf]) -> Result<(), ScanError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .build()?;

        let total = paths.len();
        let processed = AtomicUsize::new(0);
        let hash_size = self.config.hash_size;
        let strategy = self.config.strategy;
        let progress = self.progress.as_ref();

        let analyses: Vec<Result<Analysis, HashError>> = pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let analysis = analyze(path, hash_size, strategy);
                    let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(callback) = progress {
                        callback(&ScanProgress {
                            current_file: path.clone(),
                            processed: count,
                            total,
                        });
                    }
                    analysis
                })
                .collect()
        });

        for analysis in analyses {
            self.merge(analysis?)?;
        }
        Ok(())
    }

    fn merge(&mut self, analysis: Analysis) -> Result<(), ScanError> {
        let decision = match analysis {
            Analysis::Skipped(decision) => decision,
            Analysis::Ready(candidate) => self.detector.observe(candidate)?,
        };

        if let Some(output) = self.output.as_mut() {
            output.apply(&decision)?;
        }

        match &decision {
            Decision::SkippedDecodeError { message, .. }
            | Decision::SkippedIoError { message, .. } => warn!("Skipping: {}", message),
            Decision::Kept { image } => debug!("Kept {}", image.path.display()),
            Decision::Replaced { old, new, distance } => debug!(
                "Replaced {} with {} (distance {})",
                old.path.display(),
                new.path.display(),
                distance
            ),
            Decision::Dropped {
                image,
                kept_as,
                distance,
            } => debug!(
                "Dropped {}, duplicate of {} (distance {})",
                image.path.display(),
                kept_as.path.display(),
                distance
            ),
        }

        self.decisions.push(decision);
        Ok(())
    }

    fn report_progress(&self, path: &Path, processed: usize, total: usize) {
        if let Some(callback) = &self.progress {
            callback(&ScanProgress {
                current_file: path.to_path_buf(),
                processed,
                total,
            });
        }
    }
}

/// Validate `config` against `input_dir`, list its files and scan them.
pub fn dedupe_directory(input_dir: &Path, config: ScanConfig) -> Result<ScanReport, ScanError> {
    config.validate_input(input_dir)?;
    let mut scanner = Scanner::new(config)?;
    let paths = discover_files(input_dir);
    scanner.run(&paths)
}
