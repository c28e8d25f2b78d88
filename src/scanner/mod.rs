pub mod archive_filter;
pub mod archive_scanner;

pub use archive_filter::{ArchiveFilter, ArchiveKind};
pub use archive_scanner::{validate_root, ArchiveFile, ArchiveScanner, ScanStatistics};
