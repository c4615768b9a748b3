pub mod booking_scanner;
pub mod file_filter;

pub use booking_scanner::{BookingFile, BookingScanner, ScanStatistics};
pub use file_filter::BookingFilter;
