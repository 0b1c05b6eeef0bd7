use crate::core::duplicate::Decision;
use crate::core::image::ImageRecord;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to {action} {}: {source}", .path.display())]
pub struct OutputError {
    pub action: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Directory receiving one copy per cluster.
///
/// Remembers which copies it made during this run so that a replaced
/// representative's copy can be taken back out.
#[derive(Debug)]
pub struct OutputDir {
    root: PathBuf,
    placed: HashMap<PathBuf, PathBuf>,
}

impl OutputDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            placed: HashMap::new(),
        }
    }

    /// Copy `record` into the directory under its base file name.
    pub fn place(&mut self, record: &ImageRecord) -> Result<PathBuf, OutputError> {
        let file_name = record.file_name().ok_or_else(|| OutputError {
            action: "copy",
            path: record.path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
        let dest = self.root.join(file_name);

        fs::copy(&record.path, &dest).map_err(|source| OutputError {
            action: "copy",
            path: record.path.clone(),
            source,
        })?;

        self.placed.insert(record.path.clone(), dest.clone());
        Ok(dest)
    }

    /// Remove the copy made for `record`, if this run made one.
    pub fn withdraw(&mut self, record: &ImageRecord) -> Result<Option<PathBuf>, OutputError> {
        let Some(dest) = self.placed.remove(&record.path) else {
            return Ok(None);
        };

        match fs::remove_file(&dest) {
            Ok(()) => Ok(Some(dest)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(OutputError {
                action: "remove",
                path: dest,
                source,
            }),
        }
    }

    pub fn apply(&mut self, decision: &Decision) -> Result<(), OutputError> {
        match decision {
            Decision::Kept { image } => {
                self.place(image)?;
            }
            Decision::Replaced { old, new, .. } => {
                self.withdraw(old)?;
                self.place(new)?;
            }
            Decision::Dropped { .. }
            | Decision::SkippedDecodeError { .. }
            | Decision::SkippedIoError { .. } => {}
        }
        Ok(())
    }
}
