use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by embedding extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("facevec: cannot decode image: {0}")]
    Decode(String),

    #[error("facevec: no usable face region: {0}")]
    NoFace(String),

    #[error("facevec: read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("facevec: invalid config: {0}")]
    Config(String),
}
