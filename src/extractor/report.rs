use crate::config::ScanConfig;
use crate::extractor::batch::{BatchProgress, FileFailure};
use crate::extractor::totals::{AggregateSummary, NominaTotals};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub data_root: PathBuf,
    pub files_found: usize,
    pub records_parsed: usize,
    pub documents_skipped: usize,
    pub failures: Vec<FileFailure>,
    pub summary: Option<AggregateSummary>,
    pub generated_at: DateTime<Utc>,
    pub duration: Duration,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub extensions: Vec<String>,
    pub max_file_size: u64,
    pub max_depth: usize,
    pub exclude_dirs: Vec<String>,
}

impl From<&ScanConfig> for ConfigSnapshot {
    fn from(config: &ScanConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            max_file_size: config.max_file_size,
            max_depth: config.max_depth,
            exclude_dirs: config.exclude_dirs.clone(),
        }
    }
}

impl RunReport {
    pub fn new(
        data_root: &Path,
        totals: NominaTotals,
        progress: BatchProgress,
        config_used: ConfigSnapshot,
    ) -> Self {
        Self {
            data_root: data_root.to_path_buf(),
            files_found: progress.total_files,
            records_parsed: progress.records_parsed,
            documents_skipped: progress.documents_skipped,
            duration: progress.elapsed(),
            failures: progress.failures,
            summary: totals.finish(),
            generated_at: Utc::now(),
            config_used,
        }
    }

    pub fn has_data(&self) -> bool {
        self.summary.is_some()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
