pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ReportConfig, ScanConfig};
pub use error::{CfdiError, ExtractError, Result, UserFriendlyError};
pub use logging::LogConfig;

// Core functionality re-exports
pub use extractor::{
    aggregate, parse_document, parse_file, AggregateSummary, BatchExtractor, BatchProgress,
    CfdiRecord, ConfigSnapshot, FileFailure, NominaTotals, RunReport,
};
pub use scanner::{CfdiFile, DocumentScanner, FileFilter};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use tracing::info;

/// Main library interface: scan a data directory and total its payroll CFDIs.
pub struct CfdiNomina {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
    jobs: usize,
}

impl CfdiNomina {
    /// Creates an instance and installs the Ctrl+C handler.
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        Ok(Self::with_shutdown(
            config,
            output_mode,
            verbose,
            quiet,
            GracefulShutdown::new()?,
        ))
    }

    /// Creates an instance without touching process signal handling.
    pub fn detached(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self::with_shutdown(
            config,
            output_mode,
            verbose,
            quiet,
            GracefulShutdown::detached(),
        )
    }

    fn with_shutdown(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
            jobs: 1,
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)?
            .with_jobs(cli_args.effective_jobs()))
    }

    /// Scans `data_root`, parses every candidate file and totals the payroll
    /// receipts.
    ///
    /// Missing directories and bad documents are reported, never fatal. The
    /// only error is cancellation.
    pub fn summarize(&self, data_root: &Path) -> Result<RunReport> {
        self.shutdown.check_shutdown()?;

        self.output_formatter
            .start_operation(&format!("Scanning {} for CFDIs", data_root.display()));

        let documents = self.scan_documents(data_root);
        info!("FOUND {} CFDIs", documents.len());

        if documents.is_empty() {
            self.output_formatter.warning(&format!(
                "No {} files found under {}",
                self.config.scan.extensions.join("/"),
                data_root.display()
            ));
        }

        let file_progress = self
            .progress_manager
            .create_file_progress(documents.len() as u64);
        let progress_callback = {
            let pb = file_progress.clone();
            move |progress: &BatchProgress| ui::progress::update_file_progress(&pb, progress)
        };

        let (totals, progress) = BatchExtractor::new()
            .with_jobs(self.jobs)
            .extract_files(&documents, &self.shutdown, Some(&progress_callback))?;

        ui::progress::finish_progress_with_summary(
            &file_progress,
            &format!("Parsed {} CFDIs", progress.files_processed),
            progress.elapsed(),
        );

        if !progress.failures.is_empty() {
            self.output_formatter.warning(&format!(
                "{} documents could not be parsed",
                progress.failures.len()
            ));
        }

        Ok(RunReport::new(
            data_root,
            totals,
            progress,
            ConfigSnapshot::from(&self.config.scan),
        ))
    }

    /// Candidate files under `data_root`, without parsing them.
    pub fn scan_documents(&self, data_root: &Path) -> Vec<CfdiFile> {
        DocumentScanner::new(&self.config.scan).scan_directory(data_root)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        std::fs::write(output_path.as_ref(), Config::create_sample_config())?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn handle_error(&self, error: &CfdiError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Summarizes a directory with `config`, no terminal output and no signal
/// handler.
pub fn summarize_directory(config: Config, data_root: &Path) -> Result<RunReport> {
    CfdiNomina::detached(config, OutputMode::Plain, 0, true).summarize(data_root)
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
