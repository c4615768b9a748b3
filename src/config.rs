use crate::error::{BookingCleanError, Result};
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Columns kept from every booking export, in output order.
pub const DEFAULT_COLUMNS: [&str; 12] = [
    "IMN",
    "SEX",
    "RACE",
    "BOOKING_DATE_TIME",
    "DAYS_CONFINED",
    "OFFENSE_TYPE",
    "ARREST_AGENCY",
    "BOND_CODE",
    "BOND_AMOUNT",
    "CHARGE_DESCRIPTION",
    "COURT_NAME",
    "DISPOSITION",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub projection: ProjectionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub data_dir: PathBuf,
    pub extension: String,
    pub name_markers: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub columns: Vec<String>,
    pub backend: ProjectionBackend,
    pub missing_columns: MissingColumnPolicy,
    pub tool_program: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Relative paths are resolved against the data directory.
    pub clean_dir: PathBuf,
    pub create_clean_dir: bool,
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionBackend {
    /// Built-in CSV reader and writer
    Native,
    /// External `csvcut` from csvkit
    Csvcut,
}

impl std::fmt::Display for ProjectionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionBackend::Native => write!(f, "native"),
            ProjectionBackend::Csvcut => write!(f, "csvcut"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingColumnPolicy {
    Skip,
    Error,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discovery: DiscoveryConfig::default(),
            projection: ProjectionConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            extension: "csv".to_string(),
            name_markers: vec!["booking".to_string(), "Booking".to_string()],
            exclude_patterns: Vec::new(),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            backend: ProjectionBackend::Native,
            missing_columns: MissingColumnPolicy::Skip,
            tool_program: "csvcut".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            clean_dir: PathBuf::from("clean"),
            create_clean_dir: false,
            report_path: None,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BookingCleanError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BookingCleanError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| BookingCleanError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["booking-clean.toml", ".booking-clean.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref data_dir) = cli_args.data_dir {
            self.discovery.data_dir = data_dir.clone();
        }

        if let Some(ref clean_dir) = cli_args.clean_dir {
            self.output.clean_dir = clean_dir.clone();
        }

        if let Some(ref columns) = cli_args.columns {
            self.projection.columns = parse_column_list(columns);
        }

        if let Some(backend) = cli_args.backend {
            self.projection.backend = backend;
        }

        if let Some(strict) = cli_args.strict_columns {
            self.projection.missing_columns = if strict {
                MissingColumnPolicy::Error
            } else {
                MissingColumnPolicy::Skip
            };
        }

        if let Some(create) = cli_args.create_clean_dir {
            self.output.create_clean_dir = create;
        }

        if let Some(ref report_path) = cli_args.report_path {
            self.output.report_path = Some(report_path.clone());
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| BookingCleanError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| BookingCleanError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.projection.columns.is_empty() {
            return Err(BookingCleanError::Config {
                message: "At least one column must be specified".to_string(),
            });
        }

        if self.projection.columns.iter().any(|c| c.trim().is_empty()) {
            return Err(BookingCleanError::Config {
                message: "Column names cannot be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for column in &self.projection.columns {
            if !seen.insert(column.as_str()) {
                return Err(BookingCleanError::Config {
                    message: format!("Column listed more than once: {}", column),
                });
            }
        }

        if self.discovery.name_markers.is_empty()
            || self.discovery.name_markers.iter().any(|m| m.is_empty())
        {
            return Err(BookingCleanError::Config {
                message: "At least one non-empty file name marker must be specified".to_string(),
            });
        }

        if self.discovery.extension.is_empty() {
            return Err(BookingCleanError::Config {
                message: "File extension cannot be empty".to_string(),
            });
        }

        for pattern in &self.discovery.exclude_patterns {
            Regex::new(pattern).map_err(|e| BookingCleanError::Config {
                message: format!("Invalid exclude pattern '{}': {}", pattern, e),
            })?;
        }

        if self.projection.tool_program.trim().is_empty() {
            return Err(BookingCleanError::Config {
                message: "Tool program cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Relative clean directories live under the data directory.
    pub fn resolved_clean_dir(&self) -> PathBuf {
        if self.output.clean_dir.is_absolute() {
            self.output.clean_dir.clone()
        } else {
            self.discovery.data_dir.join(&self.output.clean_dir)
        }
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

pub fn parse_column_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub clean_dir: Option<PathBuf>,
    pub columns: Option<String>,
    pub backend: Option<ProjectionBackend>,
    pub strict_columns: Option<bool>,
    pub create_clean_dir: Option<bool>,
    pub report_path: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        self.data_dir = data_dir;
        self
    }

    pub fn with_clean_dir(mut self, clean_dir: Option<PathBuf>) -> Self {
        self.clean_dir = clean_dir;
        self
    }

    pub fn with_columns(mut self, columns: Option<String>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_backend(mut self, backend: Option<ProjectionBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_strict_columns(mut self, strict: Option<bool>) -> Self {
        self.strict_columns = strict;
        self
    }

    pub fn with_create_clean_dir(mut self, create: Option<bool>) -> Self {
        self.create_clean_dir = create;
        self
    }

    pub fn with_report_path(mut self, report_path: Option<PathBuf>) -> Self {
        self.report_path = report_path;
        self
    }
}
