use std::path::PathBuf;

use elephid_facevec::ExtractionError;
use elephid_identity::IdentityError;
use thiserror::Error;

/// Errors returned while resolving images to identities.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("resolve: read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("resolve: threshold {0} outside [0, 1]")]
    InvalidThreshold(f32),

    #[error("resolve: database was built with model {db:?}, resolver uses {model:?}")]
    ModelMismatch { db: String, model: String },
}

impl ResolveError {
    /// Whether the failure concerns only the current image.
    ///
    /// Batch processing records such failures and moves on; anything else
    /// means the database can no longer be trusted and aborts the run.
    pub fn is_per_image(&self) -> bool {
        matches!(
            self,
            Self::Extraction(_) | Self::Identity(IdentityError::UnknownIdentity(_))
        )
    }
}
