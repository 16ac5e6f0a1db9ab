use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating the mission catalog.
///
/// These are fatal at startup: the service must not come up with a missing
/// or structurally broken catalog. At lookup time, absence of a key is an
/// ordinary `None`, never one of these.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read mission catalog from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mission catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid mission catalog: {0}")]
    Invalid(String),
}
