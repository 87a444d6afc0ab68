use thiserror::Error;

#[derive(Error, Debug)]
pub enum CfdiError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Operation was cancelled by user")]
    Cancelled,

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },
}

/// Why a single document could not be turned into a payroll record.
///
/// These never abort a batch; the driver logs them and moves on.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("malformed XML: {0}")]
    MalformedXml(#[from] roxmltree::Error),

    #[error("missing required node {node}")]
    MissingNode { node: &'static str },

    #[error("expected exactly one {node} node, found {count}")]
    DuplicateNode { node: &'static str, count: usize },

    #[error("node {node} is missing attribute {attribute}")]
    MissingAttribute {
        node: &'static str,
        attribute: &'static str,
    },

    #[error("attribute {attribute} is not a decimal number: {value:?}")]
    InvalidDecimal {
        attribute: &'static str,
        value: String,
    },

    #[error("FechaPago is not a YYYY-MM-DD date: {value:?}")]
    InvalidDate { value: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for CfdiError {
    fn user_message(&self) -> String {
        match self {
            CfdiError::Io(e) => format!("File system error: {}", e),
            CfdiError::Config { message } => format!("Configuration error: {}", message),
            CfdiError::InvalidPath { path } => format!("Invalid path: {}", path),
            CfdiError::Cancelled => "Operation was cancelled by user".to_string(),
            CfdiError::Logging { message } => format!("Logging setup failed: {}", message),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CfdiError::Config { .. } => Some(
                "Check your configuration file syntax, or run with --generate-config to start from a known-good file.".to_string()
            ),
            CfdiError::InvalidPath { .. } => Some(
                "Pass the directory holding your CFDI XML files as the first argument (e.g., cfdi-nomina ./data).".to_string()
            ),
            CfdiError::Io(_) => Some(
                "Ensure you have read permissions for the data directory and its files.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for CfdiError {
    fn from(error: toml::de::Error) -> Self {
        CfdiError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CfdiError>;
