use std::path::PathBuf;
use thiserror::Error;

/// errors surfaced by the engine before or during a display run
///
/// per-line conditions (unrecognized timestamp, malformed columns) are not
/// errors; they degrade locally and never appear here
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown log name: {0}")]
    UnknownLog(String),

    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid filter pattern: {0}")]
    BadFilter(#[from] regex::Error),

    #[error("line count must be greater than zero")]
    BadRequest,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
