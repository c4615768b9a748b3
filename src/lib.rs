pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{
    CliOverrides, Config, DiscoveryConfig, MissingColumnPolicy, OutputConfig, ProjectionBackend,
    ProjectionConfig, DEFAULT_COLUMNS,
};
pub use error::{BookingCleanError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    CleanReport, ColumnExtractor, CsvcutProjector, ExtractionProgress, FileOutcome,
    NativeProjector, OutputManager, Projector,
};
pub use scanner::{BookingFile, BookingFilter, BookingScanner};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use tracing::info;

/// Discovers booking exports and writes their column projections.
pub struct BookingClean {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl BookingClean {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Runs the whole batch: discover, check the clean directory, project each file.
    ///
    /// Any error stops the run. Outputs written before the failure stay on disk.
    pub fn run(&self) -> Result<CleanReport> {
        let data_dir = &self.config.discovery.data_dir;
        let bookings = self.discover()?;

        let output_manager = OutputManager::new(self.config.resolved_clean_dir())
            .with_create_if_missing(self.config.output.create_clean_dir);
        let extractor = ColumnExtractor::from_config(&self.config.projection);

        // With nothing to write, a missing clean directory is not an error.
        let progress = if bookings.is_empty() {
            self.output_formatter.warning(&format!(
                "No booking files found in {}",
                data_dir.display()
            ));
            ExtractionProgress::new(0, 0)
        } else {
            output_manager.initialize()?;
            output_manager.ensure_distinct_from(data_dir)?;
            self.extract(&extractor, &bookings, &output_manager)?
        };

        let report = output_manager.create_report(
            data_dir,
            extractor.backend_name(),
            extractor.columns(),
            &progress,
        );

        if let Some(ref report_path) = self.config.output.report_path {
            output_manager.save_report_json(&report, report_path)?;
            self.output_formatter
                .success(&format!("Report written to {}", report_path.display()));
        }

        info!(
            files = report.summary.files_processed,
            rows = report.summary.rows_written,
            "run complete"
        );

        Ok(report)
    }

    /// Lists the booking files a run would touch.
    pub fn plan(&self) -> Result<Vec<BookingFile>> {
        self.discover()
    }

    fn discover(&self) -> Result<Vec<BookingFile>> {
        let data_dir = &self.config.discovery.data_dir;
        self.output_formatter.start_operation(&format!(
            "Scanning {} for booking files",
            data_dir.display()
        ));

        let scanner = BookingScanner::new(&self.config.discovery);
        let bookings = scanner.scan_directory(data_dir)?;

        let stats = scanner.get_statistics(&bookings);
        self.output_formatter.debug(&stats.display_summary());

        Ok(bookings)
    }

    fn extract(
        &self,
        extractor: &ColumnExtractor,
        bookings: &[BookingFile],
        output_manager: &OutputManager,
    ) -> Result<ExtractionProgress> {
        self.output_formatter.start_operation(&format!(
            "Projecting {} columns with the {} backend",
            extractor.columns().len(),
            extractor.backend_name()
        ));

        let file_progress = self
            .progress_manager
            .create_file_progress(bookings.len() as u64);
        let progress_callback = {
            let pb = file_progress.clone();
            move |progress: &ExtractionProgress| {
                ui::progress::update_file_progress(&pb, progress);
            }
        };

        let result = extractor.extract_files(bookings, output_manager, Some(&progress_callback));

        match result {
            Ok(progress) => {
                ui::progress::finish_progress_with_summary(
                    &file_progress,
                    &format!("Cleaned {} files", progress.files_processed),
                    progress.elapsed(),
                );
                Ok(progress)
            }
            Err(e) => {
                file_progress.abandon();
                Err(e)
            }
        }
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn handle_error(&self, error: &BookingCleanError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Cleans `data_dir` with the default column set and settings.
pub fn clean_bookings(data_dir: &Path) -> Result<CleanReport> {
    let mut config = Config::default();
    config.discovery.data_dir = data_dir.to_path_buf();

    BookingClean::new(config, OutputMode::Plain, 0, true).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "IMN,NAME,SEX,RACE,BOOKING_DATE_TIME,DAYS_CONFINED,OFFENSE_TYPE,ARREST_AGENCY,BOND_CODE,BOND_AMOUNT,CHARGE_DESCRIPTION,COURT_NAME,DISPOSITION";

    fn create_workspace() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        fs::create_dir_all(data.join("clean")).unwrap();

        let row = "1001,DOE JOHN,M,W,2019-01-02 03:04,3,F,SHERIFF,C,500,\"THEFT, PETTY\",CIRCUIT,OPEN";
        fs::write(data.join("booking_jan.csv"), format!("{}\n{}\n", HEADER, row)).unwrap();
        fs::write(data.join("Booking2023.csv"), format!("{}\n{}\n{}\n", HEADER, row, row)).unwrap();
        fs::write(data.join("arrests.csv"), format!("{}\n{}\n", HEADER, row)).unwrap();
        fs::write(data.join("notes.txt"), "booking notes").unwrap();

        temp_dir
    }

    fn quiet_runner(data_dir: &Path) -> BookingClean {
        let mut config = Config::default();
        config.discovery.data_dir = data_dir.to_path_buf();
        BookingClean::new(config, OutputMode::Plain, 0, true)
    }

    #[test]
    fn test_run_cleans_only_booking_files() {
        let temp_dir = create_workspace();
        let data = temp_dir.path().join("data");

        let report = quiet_runner(&data).run().unwrap();

        assert_eq!(report.summary.files_processed, 2);
        assert_eq!(report.summary.rows_written, 3);
        assert!(data.join("clean").join("booking_jan.csv").exists());
        assert!(data.join("clean").join("Booking2023.csv").exists());
        assert!(!data.join("clean").join("arrests.csv").exists());
        assert!(!data.join("clean").join("notes.txt").exists());

        let cleaned = fs::read_to_string(data.join("clean").join("booking_jan.csv")).unwrap();
        let mut lines = cleaned.lines();
        assert_eq!(lines.next().unwrap(), DEFAULT_COLUMNS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "1001,M,W,2019-01-02 03:04,3,F,SHERIFF,C,500,\"THEFT, PETTY\",CIRCUIT,OPEN"
        );
        assert!(!cleaned.contains("DOE JOHN"));
    }

    #[test]
    fn test_missing_data_directory_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let result = quiet_runner(&temp_dir.path().join("data")).run();

        assert!(matches!(
            result,
            Err(BookingCleanError::SourceDirectoryMissing { .. })
        ));
    }

    #[test]
    fn test_missing_clean_directory_aborts_before_writing() {
        let temp_dir = create_workspace();
        let data = temp_dir.path().join("data");
        fs::remove_dir(data.join("clean")).unwrap();

        let result = quiet_runner(&data).run();
        assert!(matches!(
            result,
            Err(BookingCleanError::CleanDirectoryMissing { .. })
        ));
        assert!(!data.join("clean").exists());
    }

    #[test]
    fn test_no_bookings_needs_no_clean_directory() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("arrests.csv"), "IMN\n1\n").unwrap();

        let report = quiet_runner(&data).run().unwrap();
        assert_eq!(report.summary.files_processed, 0);
    }

    #[test]
    fn test_report_is_saved() {
        let temp_dir = create_workspace();
        let data = temp_dir.path().join("data");
        let report_path = temp_dir.path().join("report.json");

        let mut config = Config::default();
        config.discovery.data_dir = data.clone();
        config.output.report_path = Some(report_path.clone());
        BookingClean::new(config, OutputMode::Plain, 0, true)
            .run()
            .unwrap();

        let content = fs::read_to_string(report_path).unwrap();
        assert!(content.contains("booking_jan.csv"));
    }

    #[test]
    fn test_plan_does_not_write() {
        let temp_dir = create_workspace();
        let data = temp_dir.path().join("data");

        let plan = quiet_runner(&data).plan().unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(fs::read_dir(data.join("clean")).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_bookings_helper() {
        let temp_dir = create_workspace();
        let report = clean_bookings(&temp_dir.path().join("data")).unwrap();
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.backend, "native");
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        BookingClean::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[discovery]"));
        assert!(Config::load_from_file(&config_path).is_ok());
    }
}
