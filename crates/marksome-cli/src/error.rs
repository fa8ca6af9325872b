use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid reference table '{}': {source}", path.display())]
    InvalidReferences {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid reference '{0}', expected KEY=URL")]
    InvalidReference(String),

    #[error("nesting depth {depth} exceeds the JSON output limit of {limit}")]
    TooDeep { depth: usize, limit: usize },

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}
