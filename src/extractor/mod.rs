pub mod csvcut;
pub mod file_extractor;
pub mod output_manager;
pub mod projector;

pub use csvcut::CsvcutProjector;
pub use file_extractor::{ColumnExtractor, ExtractionProgress, FileOutcome};
pub use output_manager::{CleanReport, CleanSummary, OutputManager};
pub use projector::{NativeProjector, ProjectionStats, Projector};
