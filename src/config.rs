use crate::error::{CfdiError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub extensions: Vec<String>,
    pub max_file_size: u64,
    pub max_depth: usize,
    pub exclude_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub currency_symbol: String,
    pub show_period: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["xml".to_string()],
            max_file_size: 16 * 1024 * 1024, // 16MB
            max_depth: 32,
            exclude_dirs: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            show_period: true,
        }
    }
}

const DEFAULT_CONFIG_PATHS: [&str; 2] = ["cfdi-nomina.toml", ".cfdi-nomina.toml"];

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CfdiError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CfdiError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| CfdiError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                for default_path in &DEFAULT_CONFIG_PATHS {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref exclude) = cli_args.exclude {
            for dir in exclude {
                if !self.scan.exclude_dirs.contains(dir) {
                    self.scan.exclude_dirs.push(dir.clone());
                }
            }
        }

        if let Some(max_size) = cli_args.max_file_size {
            self.scan.max_file_size = max_size;
        }

        if let Some(max_depth) = cli_args.max_depth {
            self.scan.max_depth = max_depth;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| CfdiError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| CfdiError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.extensions.is_empty() {
            return Err(CfdiError::Config {
                message: "At least one file extension must be specified".to_string(),
            });
        }

        if self.scan.max_file_size == 0 {
            return Err(CfdiError::Config {
                message: "Maximum file size must be greater than 0".to_string(),
            });
        }

        if self.scan.max_depth == 0 {
            return Err(CfdiError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        if let Some(bad) = self
            .scan
            .exclude_patterns
            .iter()
            .find(|p| regex::Regex::new(p).is_err())
        {
            return Err(CfdiError::Config {
                message: format!("Invalid exclude pattern: {}", bad),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub exclude: Option<Vec<String>>,
    pub max_file_size: Option<u64>,
    pub max_depth: Option<usize>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_max_file_size(mut self, max_size: Option<u64>) -> Self {
        self.max_file_size = max_size;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}
