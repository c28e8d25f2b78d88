pub mod archive_extractor;
pub mod formats;
pub mod output_manager;

pub use archive_extractor::{ArchiveExtractor, ExtractionEvent, ExtractionSummary};
pub use formats::ArchiveOutcome;
pub use output_manager::OutputManager;
