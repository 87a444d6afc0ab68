use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::logging::LogConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cfdi-nomina")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Summarize payroll tax totals from CFDI Nomina XML receipts")]
#[command(
    long_about = "cfdi-nomina scans a directory for CFDI XML files, reads the totals of every \
                  Nomina 1.2 payroll complement it finds, and prints the summed Percepciones, \
                  Sueldos, Exento, Gravado and Impuestos Retenidos."
)]
#[command(after_help = "EXAMPLES:\n  \
    cfdi-nomina\n  \
    cfdi-nomina ~/Documents/cfdi/2024 --output-format plain\n  \
    cfdi-nomina data --exclude cancelados,respaldo -v\n  \
    cfdi-nomina data --output-format json > resumen.json")]
pub struct Cli {
    /// Directory containing CFDI XML files (searched recursively)
    #[arg(default_value = "data")]
    pub data_dir: PathBuf,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Directories to skip while scanning
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Maximum file size in MB
    #[arg(long, help = "Maximum XML file size to parse (in MB)")]
    pub max_size: Option<u64>,

    /// Maximum directory depth
    #[arg(long, help = "Maximum directory depth to scan")]
    pub max_depth: Option<usize>,

    /// Output format for the report
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Worker threads for parsing (only with the `parallel` feature)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (print only the report)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// List the files that would be parsed without parsing them
    #[arg(long)]
    pub dry_run: bool,

    /// Write a sample configuration file and exit
    #[arg(long)]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON report
    Json,
    /// Plain `Label: value` lines
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        config.merge_with_cli_args(&self.create_cli_overrides());
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let max_file_size = self.max_size.map(|size| size.saturating_mul(1024 * 1024));

        CliOverrides::new()
            .with_exclude(self.exclude.clone())
            .with_max_file_size(max_file_size)
            .with_max_depth(self.max_depth)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig::new(self.verbose, self.quiet)
    }

    pub fn effective_jobs(&self) -> usize {
        self.jobs.filter(|&j| j > 0).unwrap_or_else(num_cpus::get)
    }
}
