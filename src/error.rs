//! Error types for capy-icons

use std::path::PathBuf;

/// Icon lookup errors
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("icon \"{name}\" not found")]
    NotFound { name: String },

    #[error("icons \"{}\" not found", names.join(","))]
    NoneFound { names: Vec<String> },

    #[error("theme \"{0}\" not found")]
    ThemeNotFound(String),

    #[error("invalid theme descriptor {}: {reason}", path.display())]
    Descriptor {
        path: PathBuf,
        reason: DescriptorError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Why an `index.theme` file was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("missing section [{0}]")]
    MissingSection(String),

    #[error("missing key {key} in [{section}]")]
    MissingKey { section: String, key: String },

    #[error("invalid value {value:?} for {key} in [{section}]")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

impl From<serde_json::Error> for IconError {
    fn from(err: serde_json::Error) -> Self {
        IconError::Config(err.to_string())
    }
}
