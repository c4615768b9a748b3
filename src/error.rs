use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingCleanError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source directory not found: {}", path.display())]
    SourceDirectoryMissing { path: PathBuf },

    #[error("Clean directory not found: {}", path.display())]
    CleanDirectoryMissing { path: PathBuf },

    #[error("Cannot write output file {}", path.display())]
    OutputNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Column selection tool not found: {program}")]
    ToolNotFound { program: String },

    #[error("{program} failed on {file} ({status})")]
    ToolExecution {
        program: String,
        file: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to process CSV file {file}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("Columns missing from {file}: {}", columns.join(", "))]
    MissingColumns { file: String, columns: Vec<String> },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl BookingCleanError {
    pub fn csv<S: Into<String>>(file: S, source: csv::Error) -> Self {
        BookingCleanError::Csv {
            file: file.into(),
            source,
        }
    }

    /// Process exit code reported by the binary for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BookingCleanError::SourceDirectoryMissing { .. } => 3,
            BookingCleanError::CleanDirectoryMissing { .. } => 4,
            BookingCleanError::OutputNotWritable { .. } => 4,
            BookingCleanError::ToolNotFound { .. } => 5,
            BookingCleanError::ToolExecution { .. } => 6,
            BookingCleanError::Csv { .. } => 7,
            BookingCleanError::MissingColumns { .. } => 8,
            _ => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for BookingCleanError {
    fn user_message(&self) -> String {
        match self {
            BookingCleanError::SourceDirectoryMissing { path } => {
                format!("Data directory does not exist: {}", path.display())
            }
            BookingCleanError::CleanDirectoryMissing { path } => {
                format!("Clean directory does not exist: {}", path.display())
            }
            BookingCleanError::OutputNotWritable { path, source } => {
                format!("Cannot write {}: {}", path.display(), source)
            }
            BookingCleanError::ToolNotFound { program } => {
                format!("'{}' is not installed or not on PATH", program)
            }
            BookingCleanError::ToolExecution {
                program,
                file,
                status,
                stderr,
            } => {
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    format!("{} failed on {} ({})", program, file, status)
                } else {
                    format!("{} failed on {} ({}): {}", program, file, status, stderr)
                }
            }
            BookingCleanError::Csv { file, source } => {
                format!("Cannot read CSV from {}: {}", file, source)
            }
            BookingCleanError::MissingColumns { file, columns } => {
                format!(
                    "{} is missing requested columns: {}",
                    file,
                    columns.join(", ")
                )
            }
            BookingCleanError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            BookingCleanError::SourceDirectoryMissing { .. } => Some(
                "Run from the directory that contains 'data/', or point --data-dir at the CSV exports.".to_string()
            ),
            BookingCleanError::CleanDirectoryMissing { .. } => Some(
                "Create the clean directory first, or pass --create-clean-dir.".to_string()
            ),
            BookingCleanError::OutputNotWritable { .. } => Some(
                "Ensure you have write permission for the clean directory.".to_string()
            ),
            BookingCleanError::ToolNotFound { .. } => Some(
                "Install csvkit (pip install csvkit) or use the built-in projector with --backend native.".to_string()
            ),
            BookingCleanError::MissingColumns { .. } => Some(
                "Drop --strict-columns to skip columns that are not present in the export.".to_string()
            ),
            BookingCleanError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BookingCleanError>;
