use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetarankError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse json '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse yaml '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown cup '{0}'")]
    UnknownCup(String),

    #[error("unknown move '{0}'")]
    UnknownMove(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MetarankError {
    /// Errors caused by bad input rather than a failing environment: an
    /// unknown cup or an invalid or malformed run configuration.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCup(_) | Self::InvalidConfig(_) | Self::Yaml { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MetarankError>;
