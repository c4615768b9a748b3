use crate::config::ProjectionConfig;
use crate::error::Result;
use crate::extractor::output_manager::OutputManager;
use crate::extractor::projector::{projector_for, Projector};
use crate::scanner::BookingFile;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub filename: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub bytes_read: u64,
    pub rows_written: Option<u64>,
    pub columns_written: Vec<String>,
    pub missing_columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub bytes_processed: u64,
    pub total_bytes: u64,
    pub current_file: Option<String>,
    pub start_time: Instant,
    pub outcomes: Vec<FileOutcome>,
}

impl ExtractionProgress {
    pub fn new(total_files: usize, total_bytes: u64) -> Self {
        Self {
            files_processed: 0,
            total_files,
            bytes_processed: 0,
            total_bytes,
            current_file: None,
            start_time: Instant::now(),
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: FileOutcome) {
        self.files_processed += 1;
        self.bytes_processed += outcome.bytes_read;
        self.current_file = Some(outcome.filename.clone());
        self.outcomes.push(outcome);
    }

    pub fn rows_written(&self) -> u64 {
        self.outcomes.iter().filter_map(|o| o.rows_written).sum()
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_processed as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn estimated_remaining(&self) -> Duration {
        if self.files_processed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.elapsed();
        let rate = self.files_processed as f64 / elapsed.as_secs_f64();
        let remaining_files = self.total_files.saturating_sub(self.files_processed);

        if rate > 0.0 && rate.is_finite() {
            Duration::from_secs_f64(remaining_files as f64 / rate)
        } else {
            Duration::from_secs(0)
        }
    }
}

/// Runs the configured projector over booking files, one at a time.
pub struct ColumnExtractor {
    projector: Box<dyn Projector>,
    columns: Vec<String>,
}

impl ColumnExtractor {
    pub fn new(projector: Box<dyn Projector>, columns: Vec<String>) -> Self {
        Self { projector, columns }
    }

    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self::new(projector_for(config), config.columns.clone())
    }

    pub fn backend_name(&self) -> &str {
        self.projector.name()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Projects every file in order. The first failure aborts the run;
    /// outputs already written are left in place.
    pub fn extract_files(
        &self,
        bookings: &[BookingFile],
        output_manager: &OutputManager,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<ExtractionProgress> {
        let total_bytes = bookings.iter().map(|b| b.size).sum();
        let mut progress = ExtractionProgress::new(bookings.len(), total_bytes);

        for booking in bookings {
            if let Some(callback) = progress_callback {
                callback(&progress);
            }

            let outcome = self.extract_file(booking, output_manager)?;
            progress.record(outcome);
        }

        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        Ok(progress)
    }

    pub fn extract_file(
        &self,
        booking: &BookingFile,
        output_manager: &OutputManager,
    ) -> Result<FileOutcome> {
        let output_path = output_manager.output_path_for(booking);
        let output = output_manager.create_output_file(&output_path)?;

        let stats = self
            .projector
            .project(&booking.source_path, output, &self.columns)?;

        info!(
            file = %booking.filename,
            output = %output_path.display(),
            rows = ?stats.rows_written,
            missing = stats.missing_columns.len(),
            "projected booking file"
        );

        Ok(FileOutcome {
            filename: booking.filename.clone(),
            input_path: booking.source_path.clone(),
            output_path,
            bytes_read: booking.size,
            rows_written: stats.rows_written,
            columns_written: stats.columns_written,
            missing_columns: stats.missing_columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MissingColumnPolicy, ProjectionBackend};
    use crate::error::BookingCleanError;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn create_booking(dir: &Path, name: &str, content: &str) -> BookingFile {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        BookingFile::new(path, content.len() as u64)
    }

    fn setup() -> (TempDir, OutputManager) {
        let temp_dir = TempDir::new().unwrap();
        let clean_dir = temp_dir.path().join("clean");
        fs::create_dir(&clean_dir).unwrap();
        let manager = OutputManager::new(clean_dir);
        (temp_dir, manager)
    }

    #[test]
    fn test_file_extraction() {
        let (temp_dir, manager) = setup();
        let first = create_booking(
            temp_dir.path(),
            "booking_jan.csv",
            "IMN,NAME,SEX\n1,A,M\n",
        );
        let second = create_booking(temp_dir.path(), "Booking2023.csv", "SEX,IMN\nF,2\n");

        let extractor = ColumnExtractor::from_config(&ProjectionConfig::default());
        let progress = extractor
            .extract_files(&[first, second], &manager, None)
            .unwrap();

        assert_eq!(progress.files_processed, 2);
        assert_eq!(progress.rows_written(), 2);

        let clean = temp_dir.path().join("clean");
        assert_eq!(
            fs::read_to_string(clean.join("booking_jan.csv")).unwrap(),
            "IMN,SEX\n1,M\n"
        );
        assert_eq!(
            fs::read_to_string(clean.join("Booking2023.csv")).unwrap(),
            "IMN,SEX\n2,F\n"
        );
    }

    #[test]
    fn test_existing_output_is_overwritten() {
        let (temp_dir, manager) = setup();
        let booking = create_booking(temp_dir.path(), "booking.csv", "IMN\n1\n");
        let stale = temp_dir.path().join("clean").join("booking.csv");
        fs::write(&stale, "stale contents that are longer than the new output\n").unwrap();

        let extractor = ColumnExtractor::from_config(&ProjectionConfig::default());
        extractor.extract_file(&booking, &manager).unwrap();

        assert_eq!(fs::read_to_string(stale).unwrap(), "IMN\n1\n");
    }

    #[test]
    fn test_first_failure_aborts_run() {
        let (temp_dir, manager) = setup();
        let first = create_booking(temp_dir.path(), "a_booking.csv", "IMN\n1\n");
        let second = create_booking(temp_dir.path(), "b_booking.csv", "IMN\n2\n");

        let config = ProjectionConfig {
            backend: ProjectionBackend::Csvcut,
            tool_program: "booking-clean-no-such-tool".to_string(),
            ..ProjectionConfig::default()
        };
        let extractor = ColumnExtractor::from_config(&config);
        let result = extractor.extract_files(&[first, second], &manager, None);

        assert!(matches!(result, Err(BookingCleanError::ToolNotFound { .. })));
        assert!(!temp_dir.path().join("clean").join("b_booking.csv").exists());
    }

    #[test]
    fn test_strict_columns_abort() {
        let (temp_dir, manager) = setup();
        let booking = create_booking(temp_dir.path(), "booking.csv", "IMN\n1\n");

        let config = ProjectionConfig {
            missing_columns: MissingColumnPolicy::Error,
            ..ProjectionConfig::default()
        };
        let extractor = ColumnExtractor::from_config(&config);
        let result = extractor.extract_file(&booking, &manager);

        assert!(matches!(result, Err(BookingCleanError::MissingColumns { .. })));
    }

    #[test]
    fn test_progress_callback_invoked() {
        let (temp_dir, manager) = setup();
        let booking = create_booking(temp_dir.path(), "booking.csv", "IMN\n1\n");
        let calls = std::cell::Cell::new(0);
        let callback = |_: &ExtractionProgress| calls.set(calls.get() + 1);

        let extractor = ColumnExtractor::from_config(&ProjectionConfig::default());
        extractor
            .extract_files(&[booking], &manager, Some(&callback))
            .unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_progress_tracking() {
        let mut progress = ExtractionProgress::new(4, 1000);
        assert_eq!(progress.percentage(), 0.0);

        progress.record(FileOutcome {
            filename: "booking.csv".to_string(),
            input_path: PathBuf::from("data/booking.csv"),
            output_path: PathBuf::from("data/clean/booking.csv"),
            bytes_read: 250,
            rows_written: Some(9),
            columns_written: vec!["IMN".to_string()],
            missing_columns: Vec::new(),
        });

        assert_eq!(progress.percentage(), 25.0);
        assert_eq!(progress.bytes_processed, 250);
        assert_eq!(progress.rows_written(), 9);
        assert_eq!(progress.current_file.as_deref(), Some("booking.csv"));
    }
}
