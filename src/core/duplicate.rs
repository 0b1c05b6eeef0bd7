// Near-duplicate clustering.
//
// Each cluster is represented by the best copy seen so far. A new image joins
// the first cluster (in creation order) whose representative is within
// tolerance, which makes membership order dependent when tolerance > 0.

use crate::core::config::Tolerance;
use crate::core::hash::Fingerprint;
use crate::core::image::ImageRecord;
use crate::core::quality::{is_better, QualityScore};
use crate::core::similarity::{are_duplicates, hamming_distance, LengthMismatchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outcome of processing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// First image of a new cluster.
    Kept { image: ImageRecord },
    /// `new` scored higher than the cluster's previous representative `old`.
    Replaced {
        old: ImageRecord,
        new: ImageRecord,
        distance: u32,
    },
    /// `image` matched `kept_as` but did not score higher.
    Dropped {
        image: ImageRecord,
        kept_as: ImageRecord,
        distance: u32,
    },
    SkippedDecodeError { path: PathBuf, message: String },
    SkippedIoError { path: PathBuf, message: String },
}

impl Decision {
    /// Path of the file this decision was made for.
    pub fn path(&self) -> &Path {
        match self {
            Decision::Kept { image } | Decision::Dropped { image, .. } => &image.path,
            Decision::Replaced { new, .. } => &new.path,
            Decision::SkippedDecodeError { path, .. } | Decision::SkippedIoError { path, .. } => {
                path
            }
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Decision::Replaced { .. } | Decision::Dropped { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Decision::SkippedDecodeError { .. } | Decision::SkippedIoError { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representative {
    pub record: ImageRecord,
    pub fingerprint: Fingerprint,
    pub score: QualityScore,
}

pub struct DuplicateDetector {
    tolerance: Tolerance,
    representatives: Vec<Representative>,
}

impl DuplicateDetector {
    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            representatives: Vec::new(),
        }
    }

    /// Index of the first representative within tolerance of `fingerprint`.
    pub fn find_first_match(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<usize>, LengthMismatchError> {
        for (index, representative) in self.representatives.iter().enumerate() {
            if are_duplicates(&representative.fingerprint, fingerprint, self.tolerance.get())? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Fold `candidate` into the cluster set and report what happened to it.
    pub fn observe(&mut self, candidate: Representative) -> Result<Decision, LengthMismatchError> {
        let Some(index) = self.find_first_match(&candidate.fingerprint)? else {
            let decision = Decision::Kept {
                image: candidate.record.clone(),
            };
            self.representatives.push(candidate);
            return Ok(decision);
        };

        let incumbent = &mut self.representatives[index];
        let distance = hamming_distance(&incumbent.fingerprint, &candidate.fingerprint)?;

        if is_better(candidate.score, incumbent.score) {
            let old = std::mem::replace(incumbent, candidate);
            Ok(Decision::Replaced {
                old: old.record,
                new: incumbent.record.clone(),
                distance,
            })
        } else {
            Ok(Decision::Dropped {
                image: candidate.record,
                kept_as: incumbent.record.clone(),
                distance,
            })
        }
    }

    pub fn representatives(&self) -> &[Representative] {
        &self.representatives
    }

    pub fn retained(&self) -> Vec<ImageRecord> {
        self.representatives
            .iter()
            .map(|representative| representative.record.clone())
            .collect()
    }
}
