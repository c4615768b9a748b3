use crate::config::{CliOverrides, Config, ProjectionBackend};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "booking-clean")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Keep only the reporting columns of jail booking CSV exports")]
#[command(
    long_about = "booking-clean finds every CSV in the data directory whose name contains \
                  'booking' or 'Booking' and writes a copy holding only the configured columns \
                  to the clean directory under the same file name."
)]
#[command(after_help = "EXAMPLES:\n  \
    booking-clean\n  \
    booking-clean --data-dir exports --create-clean-dir\n  \
    booking-clean --columns IMN,SEX,RACE --strict-columns\n  \
    booking-clean --backend csvcut --output-format json")]
pub struct Cli {
    /// Directory holding the booking exports
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Destination directory (relative paths resolve inside the data directory)
    #[arg(long, value_name = "DIR")]
    pub clean_dir: Option<PathBuf>,

    /// Comma-separated column names to keep, in output order
    #[arg(long, value_name = "COLUMNS")]
    pub columns: Option<String>,

    /// Projection backend
    #[arg(long, value_enum)]
    pub backend: Option<ProjectionBackend>,

    /// Fail when a requested column is absent instead of skipping it
    #[arg(long)]
    pub strict_columns: bool,

    /// Create the clean directory when it does not exist
    #[arg(long)]
    pub create_clean_dir: bool,

    /// Also write the run report as JSON to this path
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show which files would be cleaned without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a sample configuration file
    #[arg(long)]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    /// Flags only override the configuration when given on the command line.
    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_data_dir(self.data_dir.clone())
            .with_clean_dir(self.clean_dir.clone())
            .with_columns(self.columns.clone())
            .with_backend(self.backend)
            .with_strict_columns(self.strict_columns.then_some(true))
            .with_create_clean_dir(self.create_clean_dir.then_some(true))
            .with_report_path(self.report.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingColumnPolicy;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_keeps_defaults() {
        let cli = Cli::try_parse_from(["booking-clean"]).unwrap();
        let overrides = cli.create_cli_overrides();

        let mut config = Config::default();
        config.merge_with_cli_args(&overrides);

        assert_eq!(config.discovery.data_dir, PathBuf::from("data"));
        assert_eq!(config.projection.columns.len(), 12);
        assert_eq!(config.projection.missing_columns, MissingColumnPolicy::Skip);
        assert!(!config.output.create_clean_dir);
    }

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "booking-clean",
            "--data-dir",
            "exports",
            "--columns",
            "IMN,SEX",
            "--backend",
            "csvcut",
            "--strict-columns",
            "--create-clean-dir",
        ])
        .unwrap();

        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.data_dir, Some(PathBuf::from("exports")));
        assert_eq!(overrides.columns.as_deref(), Some("IMN,SEX"));
        assert_eq!(overrides.backend, Some(ProjectionBackend::Csvcut));
        assert_eq!(overrides.strict_columns, Some(true));
        assert_eq!(overrides.create_clean_dir, Some(true));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["booking-clean", "-q", "-v"]).is_err());

        let cli = Cli::try_parse_from(["booking-clean", "-vv"]).unwrap();
        assert_eq!(cli.verbosity_level(), 2);
    }
}
