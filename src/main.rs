use booking_clean::{
    BookingClean, BookingCleanError, Cli, OutputFormatter, OutputMode, UserFriendlyError,
};
use clap::Parser;
use std::process;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(cli.verbosity_level());

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let booking_clean = match BookingClean::from_cli(&cli) {
        Ok(booking_clean) => booking_clean,
        Err(e) => {
            print_startup_error(&e);
            return e.exit_code();
        }
    };

    if cli.dry_run {
        return handle_dry_run(&booking_clean);
    }

    match booking_clean.run() {
        Ok(report) => {
            booking_clean.output_formatter().print_clean_report(&report);
            0
        }
        Err(e) => {
            booking_clean.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "booking-clean.toml".to_string());

    match BookingClean::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  booking-clean --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(booking_clean: &BookingClean) -> i32 {
    let formatter = booking_clean.output_formatter();
    let config = booking_clean.config();

    formatter.info("DRY RUN MODE - No files will be written");
    formatter.info(&format!("Backend: {}", config.projection.backend));

    match booking_clean.plan() {
        Ok(bookings) => {
            formatter.print_plan(
                &bookings,
                &config.resolved_clean_dir(),
                &config.projection.columns,
            );
            0
        }
        Err(e) => {
            booking_clean.handle_error(&e);
            e.exit_code()
        }
    }
}

fn print_startup_error(error: &BookingCleanError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "booking_clean=warn",
        1 => "booking_clean=info",
        _ => "booking_clean=debug",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
