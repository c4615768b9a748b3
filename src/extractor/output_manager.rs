use crate::error::{BookingCleanError, Result};
use crate::extractor::{ExtractionProgress, FileOutcome};
use crate::scanner::BookingFile;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub generated_at: DateTime<Utc>,
    pub data_dir: PathBuf,
    pub clean_dir: PathBuf,
    pub backend: String,
    pub columns: Vec<String>,
    pub summary: CleanSummary,
    pub files: Vec<FileOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanSummary {
    pub files_processed: usize,
    pub bytes_read: u64,
    pub rows_written: u64,
    pub files_with_missing_columns: usize,
    pub duration_ms: u64,
}

impl CleanReport {
    pub fn has_missing_columns(&self) -> bool {
        self.summary.files_with_missing_columns > 0
    }
}

/// Owns the clean directory: checks it, names output files, writes the run report.
pub struct OutputManager {
    clean_dir: PathBuf,
    create_if_missing: bool,
}

impl OutputManager {
    pub fn new(clean_dir: PathBuf) -> Self {
        Self {
            clean_dir,
            create_if_missing: false,
        }
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn initialize(&self) -> Result<()> {
        if self.clean_dir.is_dir() {
            return Ok(());
        }

        if !self.create_if_missing {
            return Err(BookingCleanError::CleanDirectoryMissing {
                path: self.clean_dir.clone(),
            });
        }

        fs::create_dir_all(&self.clean_dir).map_err(|source| {
            BookingCleanError::OutputNotWritable {
                path: self.clean_dir.clone(),
                source,
            }
        })?;
        info!(dir = %self.clean_dir.display(), "created clean directory");

        Ok(())
    }

    /// Refuses a clean directory that is the data directory itself, since
    /// creating an output would truncate the input it is read from.
    pub fn ensure_distinct_from(&self, data_dir: &Path) -> Result<()> {
        let clean = fs::canonicalize(&self.clean_dir)?;
        let data = fs::canonicalize(data_dir)?;

        if clean == data {
            return Err(BookingCleanError::Config {
                message: format!(
                    "Clean directory {} is the data directory",
                    self.clean_dir.display()
                ),
            });
        }

        Ok(())
    }

    pub fn output_path_for(&self, booking: &BookingFile) -> PathBuf {
        booking.output_path(&self.clean_dir)
    }

    /// Creates or truncates an output file.
    pub fn create_output_file(&self, path: &Path) -> Result<File> {
        File::create(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => BookingCleanError::CleanDirectoryMissing {
                path: self.clean_dir.clone(),
            },
            _ => BookingCleanError::OutputNotWritable {
                path: path.to_path_buf(),
                source,
            },
        })
    }

    pub fn create_report(
        &self,
        data_dir: &Path,
        backend: &str,
        columns: &[String],
        progress: &ExtractionProgress,
    ) -> CleanReport {
        let files_with_missing_columns = progress
            .outcomes
            .iter()
            .filter(|o| !o.missing_columns.is_empty())
            .count();

        CleanReport {
            generated_at: Utc::now(),
            data_dir: data_dir.to_path_buf(),
            clean_dir: self.clean_dir.clone(),
            backend: backend.to_string(),
            columns: columns.to_vec(),
            summary: CleanSummary {
                files_processed: progress.files_processed,
                bytes_read: progress.bytes_processed,
                rows_written: progress.rows_written(),
                files_with_missing_columns,
                duration_ms: progress.elapsed().as_millis() as u64,
            },
            files: progress.outcomes.clone(),
        }
    }

    pub fn save_report_json(&self, report: &CleanReport, path: &Path) -> Result<()> {
        let json_content =
            serde_json::to_string_pretty(report).map_err(|e| BookingCleanError::Config {
                message: format!("Failed to serialize report to JSON: {}", e),
            })?;

        fs::write(path, json_content).map_err(|source| BookingCleanError::OutputNotWritable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }
}
