use crate::error::{BookingCleanError, UserFriendlyError};
use crate::extractor::CleanReport;
use crate::scanner::BookingFile;
use console::{style, Emoji, Term};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "v ");
static CROSS: Emoji = Emoji("❌ ", "x ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ARROW: Emoji = Emoji("➜ ", "> ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Json => self.print_json_message("success", message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            }
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ARROW, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &BookingCleanError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => self.print_json_message("suggestion", &suggestion),
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// Lists what a run would do without writing anything.
    pub fn print_plan(&self, bookings: &[BookingFile], clean_dir: &Path, columns: &[String]) {
        match self.mode {
            OutputMode::Json => {
                let files: Vec<_> = bookings
                    .iter()
                    .map(|b| {
                        serde_json::json!({
                            "input": b.source_path,
                            "output": b.output_path(clean_dir),
                            "size": b.size,
                        })
                    })
                    .collect();
                self.print_json_object(&serde_json::json!({
                    "type": "plan",
                    "columns": columns,
                    "files": files,
                }));
            }
            _ => {
                println!("Columns: {}", columns.join(","));
                if bookings.is_empty() {
                    println!("No booking files found");
                }
                for booking in bookings {
                    println!(
                        "  {} -> {} ({})",
                        booking.source_path.display(),
                        booking.output_path(clean_dir).display(),
                        booking.format_size()
                    );
                }
            }
        }
    }

    pub fn print_clean_report(&self, report: &CleanReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_report(report);
                }
            }
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => {
                if !self.quiet {
                    self.print_plain_report(report);
                }
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        let (emoji, styled) = match msg_type {
            MessageType::Success => (&CHECKMARK, style(message).green().bold()),
            MessageType::Error => (&CROSS, style(message).red().bold()),
            MessageType::Warning => (&WARNING, style(message).yellow().bold()),
            MessageType::Info => (&INFO, style(message).cyan()),
        };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, styled),
                _ => println!("{}{}", emoji, styled),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "v",
                MessageType::Error => "x",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    // Status lines go to stderr so stdout stays a clean JSON document.
    fn print_json_message(&self, level: &str, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({
                "type": "message",
                "level": level,
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            })
        );
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_report(&self, report: &CleanReport) {
        self.print_separator();

        let files = report.summary.files_processed.to_string();
        let rows = report.summary.rows_written.to_string();
        let bytes = format_bytes(report.summary.bytes_read);
        let took = format_duration(Duration::from_millis(report.summary.duration_ms));

        if self.use_colors {
            println!("{} {}", style("Booking files cleaned").green().bold(), CHECKMARK);
            println!("  Files processed: {}", style(files).cyan().bold());
            println!("  Rows written:    {}", style(rows).cyan().bold());
            println!("  Bytes read:      {}", style(bytes).cyan().bold());
            println!("  Time taken:      {}", style(took).cyan().bold());
        } else {
            println!("Booking files cleaned");
            println!("  Files processed: {}", files);
            println!("  Rows written:    {}", rows);
            println!("  Bytes read:      {}", bytes);
            println!("  Time taken:      {}", took);
        }
        println!("  Output:          {}", report.clean_dir.display());

        for outcome in report.files.iter().filter(|o| !o.missing_columns.is_empty()) {
            self.warning(&format!(
                "{}: columns not present: {}",
                outcome.filename,
                outcome.missing_columns.join(", ")
            ));
        }

        self.print_separator();
    }

    fn print_plain_report(&self, report: &CleanReport) {
        println!("COMPLETED: booking clean");
        println!("Files: {}", report.summary.files_processed);
        println!("Rows: {}", report.summary.rows_written);
        println!("Bytes: {}", report.summary.bytes_read);
        println!("Duration: {}ms", report.summary.duration_ms);
        for outcome in &report.files {
            println!("{} -> {}", outcome.input_path.display(), outcome.output_path.display());
            if !outcome.missing_columns.is_empty() {
                println!("MISSING: {} {}", outcome.filename, outcome.missing_columns.join(","));
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
