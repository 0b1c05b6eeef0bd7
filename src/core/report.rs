use crate::core::duplicate::Decision;
use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One line of a decision report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub timestamp: String,
    #[serde(flatten)]
    pub decision: Decision,
}

/// Appends decisions to a JSON Lines file.
pub struct ReportWriter {
    out: BufWriter<File>,
}

impl ReportWriter {
    pub fn open(path: &Path) -> Result<Self, ReportError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    pub fn write(&mut self, decision: &Decision) -> Result<(), ReportError> {
        let entry = ReportEntry {
            timestamp: Utc::now().to_rfc3339(),
            decision: decision.clone(),
        };
        writeln!(self.out, "{}", serde_json::to_string(&entry)?)?;
        Ok(())
    }

    pub fn write_all<'a, I>(&mut self, decisions: I) -> Result<(), ReportError>
    where
        I: IntoIterator<Item = &'a Decision>,
    {
        for decision in decisions {
            self.write(decision)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Read every well-formed entry of a report; malformed lines are logged and skipped.
pub fn read_report(path: &Path) -> Result<Vec<ReportEntry>, ReportError> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ReportEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!("Skipping malformed report line {}: {}", i + 1, err),
        }
    }

    Ok(entries)
}
