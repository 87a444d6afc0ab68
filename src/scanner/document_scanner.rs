use crate::config::ScanConfig;
use crate::error::{CfdiError, Result};
use crate::scanner::file_filter::FileFilter;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A candidate CFDI file found under the data root.
#[derive(Debug, Clone)]
pub struct CfdiFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub size: u64,
}

impl CfdiFile {
    pub fn new(source_path: PathBuf, relative_path: PathBuf, size: u64) -> Self {
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        Self {
            source_path,
            relative_path,
            filename,
            size,
        }
    }

    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }
}

pub struct DocumentScanner {
    filter: FileFilter,
    max_depth: usize,
}

impl DocumentScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
        }
    }

    /// Enumerates candidate files under `root`.
    ///
    /// A missing or unreadable root yields an empty list rather than an error,
    /// and per-entry failures are logged and skipped. Results are sorted by
    /// relative path.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Vec<CfdiFile> {
        let root_path = root.as_ref();

        if !root_path.is_dir() {
            warn!(root = %root_path.display(), "data directory does not exist or is not a directory");
            return Vec::new();
        }

        let mut documents = Vec::new();

        let walker = WalkDir::new(root_path)
            .max_depth(self.max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match self.process_file(&entry, root_path) {
                Ok(Some(doc_file)) => documents.push(doc_file),
                Ok(None) => {}
                Err(err) => {
                    warn!(path = %entry.path().display(), error = %err, "skipping file");
                }
            }
        }

        documents.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        debug!("{}", self.get_statistics(&documents).display_summary());

        documents
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || entry.file_type().is_file() {
            return true;
        }

        if entry.file_type().is_dir() && !self.filter.should_traverse_directory(entry.path()) {
            debug!(path = %entry.path().display(), "excluded directory, not descending");
            return false;
        }

        true
    }

    fn process_file(&self, entry: &DirEntry, root_path: &Path) -> Result<Option<CfdiFile>> {
        let path = entry.path();

        if !self.filter.is_candidate_file(path) {
            return Ok(None);
        }

        let metadata = entry.metadata().map_err(|e| CfdiError::Io(e.into()))?;

        if !self.filter.is_size_allowed(metadata.len()) {
            warn!(
                path = %path.display(),
                size = metadata.len(),
                max_size = self.filter.get_max_file_size(),
                "file exceeds size limit, skipping"
            );
            return Ok(None);
        }

        let relative_path = calculate_relative_path(path, root_path)?;

        Ok(Some(CfdiFile::new(
            path.to_path_buf(),
            relative_path,
            metadata.len(),
        )))
    }

    pub fn get_statistics(&self, documents: &[CfdiFile]) -> ScanStatistics {
        ScanStatistics {
            total_files: documents.len(),
            total_size: documents.iter().map(|d| d.size).sum(),
        }
    }
}

fn calculate_relative_path(file_path: &Path, root_path: &Path) -> Result<PathBuf> {
    let relative = file_path
        .strip_prefix(root_path)
        .map_err(|_| CfdiError::InvalidPath {
            path: format!(
                "Cannot calculate relative path for {} from root {}",
                file_path.display(),
                root_path.display()
            ),
        })?;

    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(CfdiError::InvalidPath {
            path: format!(
                "Path contains parent directory references: {}",
                relative.display()
            ),
        });
    }

    Ok(relative.to_path_buf())
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        format!(
            "Scan results: {} candidate files, {}",
            self.total_files,
            format_bytes(self.total_size)
        )
    }
}

fn format_bytes(bytes: u64) -> String {
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
