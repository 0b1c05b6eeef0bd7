use crate::core::config::ConfigError;
use crate::core::image::ImageRecord;
use std::fmt;
use std::str::FromStr;

/// How two copies of the same picture are ranked against each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QualityStrategy {
    /// Pixel area, `width * height`.
    #[default]
    Resolution,
    /// Bytes on disk.
    FileSize,
}

impl QualityStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            QualityStrategy::Resolution => "resolution",
            QualityStrategy::FileSize => "file-size",
        }
    }
}

impl fmt::Display for QualityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QualityStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "resolution" => Ok(QualityStrategy::Resolution),
            "file-size" | "filesize" | "size" => Ok(QualityStrategy::FileSize),
            _ => Err(ConfigError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualityScore(pub u64);

pub fn evaluate(record: &ImageRecord, strategy: QualityStrategy) -> QualityScore {
    match strategy {
        QualityStrategy::Resolution => {
            QualityScore(u64::from(record.width) * u64::from(record.height))
        }
        QualityStrategy::FileSize => QualityScore(record.size_bytes),
    }
}

/// A candidate only displaces the kept copy when it scores strictly higher.
pub fn is_better(candidate: QualityScore, incumbent: QualityScore) -> bool {
    candidate > incumbent
}
