pub mod document_scanner;
pub mod file_filter;

pub use document_scanner::{CfdiFile, DocumentScanner, ScanStatistics};
pub use file_filter::FileFilter;
