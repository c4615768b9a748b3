use crate::config::DiscoveryConfig;
use crate::error::{BookingCleanError, Result};
use crate::scanner::file_filter::BookingFilter;
use crate::ui::output::format_bytes;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize)]
pub struct BookingFile {
    pub source_path: PathBuf,
    pub filename: String,
    pub size: u64,
}

impl BookingFile {
    pub fn new(source_path: PathBuf, size: u64) -> Self {
        let filename = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            source_path,
            filename,
            size,
        }
    }

    /// Where the projected copy of this file lands.
    pub fn output_path(&self, clean_dir: &Path) -> PathBuf {
        match self.source_path.file_name() {
            Some(name) => clean_dir.join(name),
            None => clean_dir.join(&self.filename),
        }
    }

    pub fn format_size(&self) -> String {
        format_bytes(self.size)
    }
}

pub struct BookingScanner {
    filter: BookingFilter,
}

impl BookingScanner {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            filter: BookingFilter::new(config),
        }
    }

    /// Lists booking files directly inside `root`, sorted by file name.
    ///
    /// Only the top level is inspected, so a `clean/` directory nested in the
    /// data directory never feeds its own outputs back in.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<BookingFile>> {
        let root_path = root.as_ref();

        if !root_path.is_dir() {
            return Err(BookingCleanError::SourceDirectoryMissing {
                path: root_path.to_path_buf(),
            });
        }

        let mut bookings = Vec::new();

        let walker = WalkDir::new(root_path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // Broken links and unreadable entries only matter if they are bookings.
                Err(e) if e.path().is_some_and(|p| !self.filter.is_booking_file(p)) => {
                    debug!(error = %e, "skipping unreadable non-booking entry");
                    continue;
                }
                Err(e) => return Err(BookingCleanError::Io(e.into())),
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.filter.is_booking_file(path) {
                debug!(file = %path.display(), "skipping non-booking file");
                continue;
            }

            let metadata = entry
                .metadata()
                .map_err(|e| BookingCleanError::Io(e.into()))?;

            bookings.push(BookingFile::new(path.to_path_buf(), metadata.len()));
        }

        bookings.sort_by(|a, b| a.filename.cmp(&b.filename));

        debug!(
            dir = %root_path.display(),
            count = bookings.len(),
            "booking files discovered"
        );

        Ok(bookings)
    }

    pub fn get_statistics(&self, bookings: &[BookingFile]) -> ScanStatistics {
        let total_files = bookings.len();
        let total_size = bookings.iter().map(|b| b.size).sum();

        let (largest_file_size, largest_file) = bookings
            .iter()
            .max_by_key(|b| b.size)
            .map(|b| (b.size, b.filename.clone()))
            .unwrap_or((0, String::new()));

        ScanStatistics {
            total_files,
            total_size,
            largest_file_size,
            largest_file,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub largest_file_size: u64,
    pub largest_file: String,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Booking files: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_size)
        );

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest file: {} ({})\n",
                self.largest_file,
                format_bytes(self.largest_file_size)
            ));
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_data_dir() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("booking_jan.csv"), "IMN,SEX\n1,M\n").unwrap();
        fs::write(root.join("Booking2023.csv"), "IMN\n2\n").unwrap();
        fs::write(root.join("arrests.csv"), "IMN\n3\n").unwrap();
        fs::write(root.join("notes.txt"), "booking notes").unwrap();
        fs::create_dir(root.join("clean")).unwrap();
        fs::write(root.join("clean").join("booking_old.csv"), "IMN\n").unwrap();

        temp_dir
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_ignored() {
        let temp_dir = create_data_dir();
        std::os::unix::fs::symlink(
            temp_dir.path().join("gone.txt"),
            temp_dir.path().join("old_link.txt"),
        )
        .unwrap();

        let scanner = BookingScanner::new(&DiscoveryConfig::default());
        let bookings = scanner.scan_directory(temp_dir.path()).unwrap();

        assert_eq!(bookings.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_booking_symlink_fails() {
        let temp_dir = create_data_dir();
        std::os::unix::fs::symlink(
            temp_dir.path().join("gone.csv"),
            temp_dir.path().join("booking_gone.csv"),
        )
        .unwrap();

        let scanner = BookingScanner::new(&DiscoveryConfig::default());
        assert!(matches!(
            scanner.scan_directory(temp_dir.path()),
            Err(BookingCleanError::Io(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_keeps_raw_output_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"booking_\xff.csv");
        let booking = BookingFile::new(Path::new("data").join(name), 10);

        assert_eq!(booking.filename, "booking_\u{fffd}.csv");
        assert_eq!(
            booking.output_path(Path::new("data/clean")),
            Path::new("data/clean").join(name)
        );
    }

    #[test]
    fn test_scan_selects_booking_csvs_only() {
        let temp_dir = create_data_dir();
        let scanner = BookingScanner::new(&DiscoveryConfig::default());

        let bookings = scanner.scan_directory(temp_dir.path()).unwrap();
        let names: Vec<&str> = bookings.iter().map(|b| b.filename.as_str()).collect();

        assert_eq!(names, vec!["Booking2023.csv", "booking_jan.csv"]);
    }

    #[test]
    fn test_scan_ignores_directories_named_like_bookings() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("booking.csv")).unwrap();

        let scanner = BookingScanner::new(&DiscoveryConfig::default());
        let bookings = scanner.scan_directory(temp_dir.path()).unwrap();

        assert!(bookings.is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = BookingScanner::new(&DiscoveryConfig::default());

        let result = scanner.scan_directory(temp_dir.path().join("data"));
        assert!(matches!(
            result,
            Err(BookingCleanError::SourceDirectoryMissing { .. })
        ));
    }

    #[test]
    fn test_output_path() {
        let booking = BookingFile::new(PathBuf::from("data/booking_jan.csv"), 10);
        assert_eq!(booking.filename, "booking_jan.csv");
        assert_eq!(
            booking.output_path(Path::new("data/clean")),
            PathBuf::from("data/clean/booking_jan.csv")
        );
    }

    #[test]
    fn test_statistics() {
        let temp_dir = create_data_dir();
        let scanner = BookingScanner::new(&DiscoveryConfig::default());
        let bookings = scanner.scan_directory(temp_dir.path()).unwrap();

        let stats = scanner.get_statistics(&bookings);
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.largest_file, "booking_jan.csv");
        assert!(stats.display_summary().contains("Booking files: 2"));
    }
}
