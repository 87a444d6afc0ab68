use crate::error::{ExtractError, Result};
use crate::extractor::nomina;
use crate::extractor::record::CfdiRecord;
use crate::extractor::totals::NominaTotals;
use crate::scanner::CfdiFile;
use crate::ui::GracefulShutdown;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// A document that could not be turned into a payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub records_parsed: usize,
    pub documents_skipped: usize,
    pub current_file: Option<String>,
    pub start_time: Instant,
    pub failures: Vec<FileFailure>,
}

impl BatchProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_processed: 0,
            total_files,
            records_parsed: 0,
            documents_skipped: 0,
            current_file: None,
            start_time: Instant::now(),
            failures: Vec::new(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_processed as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Runs the extractor over a list of files and folds the results.
///
/// Every per-document failure is logged and recorded in the progress; none of
/// them stops the batch. Only a shutdown request does.
pub struct BatchExtractor {
    jobs: usize,
}

impl BatchExtractor {
    pub fn new() -> Self {
        Self { jobs: 1 }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn extract_files(
        &self,
        documents: &[CfdiFile],
        shutdown: &GracefulShutdown,
        progress_callback: Option<&dyn Fn(&BatchProgress)>,
    ) -> Result<(NominaTotals, BatchProgress)> {
        let mut totals = NominaTotals::new();
        let mut progress = BatchProgress::new(documents.len());

        for (document, outcome) in self.parse_all(documents, shutdown)? {
            if let Some(callback) = progress_callback {
                callback(&progress);
            }
            record_outcome(&mut totals, &mut progress, document, outcome);
        }

        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        info!(
            parsed = progress.records_parsed,
            skipped = progress.documents_skipped,
            failed = progress.failures.len(),
            "finished parsing CFDIs"
        );

        Ok((totals, progress))
    }

    #[cfg(not(feature = "parallel"))]
    fn parse_all<'d>(
        &self,
        documents: &'d [CfdiFile],
        shutdown: &GracefulShutdown,
    ) -> Result<Vec<(&'d CfdiFile, Outcome)>> {
        if self.jobs > 1 {
            debug!(jobs = self.jobs, "built without the parallel feature, parsing sequentially");
        }

        let mut outcomes = Vec::with_capacity(documents.len());
        for document in documents {
            shutdown.check_shutdown()?;
            info!(path = %document.source_path.display(), "parsing CFDI");
            outcomes.push((document, nomina::parse_file(&document.source_path)));
        }
        Ok(outcomes)
    }

    #[cfg(feature = "parallel")]
    fn parse_all<'d>(
        &self,
        documents: &'d [CfdiFile],
        shutdown: &GracefulShutdown,
    ) -> Result<Vec<(&'d CfdiFile, Outcome)>> {
        use crate::error::CfdiError;
        use rayon::prelude::*;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| CfdiError::Config {
                message: format!("Failed to build worker pool: {}", e),
            })?;

        debug!(jobs = self.jobs, "parsing CFDIs in parallel");

        let outcomes: Vec<_> = pool.install(|| {
            documents
                .par_iter()
                .map(|document| {
                    if !shutdown.is_running() {
                        return None;
                    }
                    info!(path = %document.source_path.display(), "parsing CFDI");
                    Some((document, nomina::parse_file(&document.source_path)))
                })
                .collect()
        });

        shutdown.check_shutdown()?;
        Ok(outcomes.into_iter().flatten().collect())
    }
}

impl Default for BatchExtractor {
    fn default() -> Self {
        Self::new()
    }
}

type Outcome = std::result::Result<Option<CfdiRecord>, ExtractError>;

fn record_outcome(
    totals: &mut NominaTotals,
    progress: &mut BatchProgress,
    document: &CfdiFile,
    outcome: Outcome,
) {
    progress.files_processed += 1;
    progress.current_file = Some(document.filename.clone());

    match outcome {
        Ok(Some(record)) => {
            debug!(
                path = %document.source_path.display(),
                fecha_pago = %record.fecha_pago,
                total_percepciones = %record.total_percepciones,
                "payroll receipt parsed"
            );
            totals.add(&record);
            progress.records_parsed += 1;
        }
        Ok(None) => {
            debug!(path = %document.source_path.display(), "no Nomina complement, skipping");
            progress.documents_skipped += 1;
        }
        Err(e) => {
            error!(path = %document.source_path.display(), error = %e, "error parsing CFDI");
            progress.failures.push(FileFailure {
                path: document.display_path(),
                reason: e.to_string(),
            });
        }
    }
}
