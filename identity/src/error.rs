use thiserror::Error;

/// Errors returned by identity database operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity: unknown identity {0:?}")]
    UnknownIdentity(String),

    #[error("identity: dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("identity: empty embedding")]
    EmptyEmbedding,

    #[error("identity: embedding contains a non-finite value at index {0}")]
    NonFinite(usize),

    #[error("identity: key space exhausted")]
    KeySpaceExhausted,

    #[error("identity: persistence: {0}")]
    Persistence(String),
}

impl From<elephid_kv::KVError> for IdentityError {
    fn from(e: elephid_kv::KVError) -> Self {
        Self::Persistence(e.to_string())
    }
}
