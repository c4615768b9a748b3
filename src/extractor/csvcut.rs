use crate::error::{BookingCleanError, Result};
use crate::extractor::projector::{ProjectionStats, Projector};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Delegates projection to csvkit's `csvcut -c <columns> <file>`.
pub struct CsvcutProjector {
    program: String,
}

impl CsvcutProjector {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn build_command(&self, input: &Path, columns: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command.arg("-c").arg(columns.join(",")).arg(input);
        command
    }
}

impl Projector for CsvcutProjector {
    fn name(&self) -> &str {
        "csvcut"
    }

    fn project(&self, input: &Path, output: File, columns: &[String]) -> Result<ProjectionStats> {
        let mut command = self.build_command(input, columns);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::from(output))
            .stderr(Stdio::piped());

        debug!(program = %self.program, file = %input.display(), "spawning column tool");

        let result = command.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => BookingCleanError::ToolNotFound {
                program: self.program.clone(),
            },
            _ => BookingCleanError::Io(e),
        })?;

        if !result.status.success() {
            return Err(BookingCleanError::ToolExecution {
                program: self.program.clone(),
                file: input.display().to_string(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }

        Ok(ProjectionStats {
            rows_written: None,
            columns_written: columns.to_vec(),
            missing_columns: Vec::new(),
        })
    }
}
