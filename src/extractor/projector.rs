use crate::config::{MissingColumnPolicy, ProjectionBackend, ProjectionConfig};
use crate::error::{BookingCleanError, Result};
use crate::extractor::csvcut::CsvcutProjector;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// What a single projection produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectionStats {
    /// Data rows written, excluding the header. Unknown for external tools.
    pub rows_written: Option<u64>,
    pub columns_written: Vec<String>,
    pub missing_columns: Vec<String>,
}

/// Writes the requested columns of one CSV file into `output`.
pub trait Projector {
    fn name(&self) -> &str;

    fn project(&self, input: &Path, output: File, columns: &[String]) -> Result<ProjectionStats>;
}

pub fn projector_for(config: &ProjectionConfig) -> Box<dyn Projector> {
    match config.backend {
        ProjectionBackend::Native => Box::new(NativeProjector::new(config.missing_columns)),
        ProjectionBackend::Csvcut => Box::new(CsvcutProjector::new(&config.tool_program)),
    }
}

pub struct NativeProjector {
    missing_columns: MissingColumnPolicy,
    buffer_size: usize,
}

impl NativeProjector {
    pub fn new(missing_columns: MissingColumnPolicy) -> Self {
        Self {
            missing_columns,
            buffer_size: 64 * 1024,
        }
    }

    /// Streams `reader` into `writer`, keeping only `columns` in the order given.
    ///
    /// Columns are matched against the first header cell with the same name.
    /// Short records are padded with empty fields.
    pub fn project_stream<R: Read, W: Write>(
        &self,
        reader: R,
        writer: W,
        columns: &[String],
        file_label: &str,
    ) -> Result<ProjectionStats> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut csv_writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        let mut record = csv::ByteRecord::new();
        let has_header = csv_reader
            .read_byte_record(&mut record)
            .map_err(|e| BookingCleanError::csv(file_label, e))?;

        let header: Vec<&[u8]> = if has_header {
            record
                .iter()
                .enumerate()
                .map(|(i, field)| if i == 0 { strip_bom(field) } else { field })
                .collect()
        } else {
            debug!(file = file_label, "empty input, no header");
            Vec::new()
        };

        let mut indices = Vec::with_capacity(columns.len());
        let mut columns_written = Vec::with_capacity(columns.len());
        let mut missing_columns = Vec::new();

        for column in columns {
            match header.iter().position(|h| *h == column.as_bytes()) {
                Some(index) => {
                    indices.push(index);
                    columns_written.push(column.clone());
                }
                None => missing_columns.push(column.clone()),
            }
        }

        if !missing_columns.is_empty() && self.missing_columns == MissingColumnPolicy::Error {
            return Err(BookingCleanError::MissingColumns {
                file: file_label.to_string(),
                columns: missing_columns,
            });
        }

        if indices.is_empty() {
            debug!(file = file_label, "no requested columns present");
            return Ok(ProjectionStats {
                rows_written: Some(0),
                columns_written,
                missing_columns,
            });
        }

        csv_writer
            .write_record(columns_written.iter().map(|c| c.as_bytes()))
            .map_err(|e| BookingCleanError::csv(file_label, e))?;

        let mut projected = csv::ByteRecord::with_capacity(0, indices.len());
        let mut rows_written = 0u64;

        while csv_reader
            .read_byte_record(&mut record)
            .map_err(|e| BookingCleanError::csv(file_label, e))?
        {
            projected.clear();
            for &index in &indices {
                projected.push_field(record.get(index).unwrap_or(b""));
            }

            csv_writer
                .write_byte_record(&projected)
                .map_err(|e| BookingCleanError::csv(file_label, e))?;
            rows_written += 1;
        }

        csv_writer.flush()?;

        Ok(ProjectionStats {
            rows_written: Some(rows_written),
            columns_written,
            missing_columns,
        })
    }
}

impl Projector for NativeProjector {
    fn name(&self) -> &str {
        "native"
    }

    fn project(&self, input: &Path, output: File, columns: &[String]) -> Result<ProjectionStats> {
        let file_label = input.display().to_string();
        let source = File::open(input)
            .map_err(|e| BookingCleanError::csv(&file_label, csv::Error::from(e)))?;
        let writer = BufWriter::with_capacity(self.buffer_size, output);

        self.project_stream(source, writer, columns, &file_label)
    }
}

fn strip_bom(field: &[u8]) -> &[u8] {
    field.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(field)
}
