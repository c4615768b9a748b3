use crate::config::DiscoveryConfig;
use regex::Regex;
use std::path::Path;

/// Decides which file names in the data directory are booking exports.
///
/// A name is selected when it matches `*.<extension>` with shell glob rules
/// (case-sensitive extension, no leading dot) and contains at least one of
/// the configured markers verbatim.
pub struct BookingFilter {
    extension: String,
    name_markers: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl BookingFilter {
    pub fn new(config: &DiscoveryConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            extension: config.extension.clone(),
            name_markers: config.name_markers.clone(),
            exclude_patterns,
        }
    }

    pub fn is_booking_file(&self, path: &Path) -> bool {
        // Markers and extension are matched against the lossy name, so
        // invalid UTF-8 elsewhere in the name does not hide a booking file.
        let Some(filename) = path.file_name().map(|s| s.to_string_lossy()) else {
            return false;
        };

        self.matches_extension(&filename)
            && self.has_marker(&filename)
            && !self.matches_any_pattern(&filename)
    }

    fn matches_extension(&self, filename: &str) -> bool {
        // Globs never match hidden files with a leading `*`.
        if filename.starts_with('.') {
            return false;
        }

        match filename.rsplit_once('.') {
            Some((stem, ext)) => !stem.is_empty() && ext == self.extension,
            None => false,
        }
    }

    pub fn has_marker(&self, filename: &str) -> bool {
        self.name_markers
            .iter()
            .any(|marker| filename.contains(marker.as_str()))
    }

    pub fn matches_any_pattern(&self, text: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }

    pub fn get_extension(&self) -> &str {
        &self.extension
    }
}

impl Default for BookingFilter {
    fn default() -> Self {
        let config = DiscoveryConfig::default();
        Self::new(&config)
    }
}
