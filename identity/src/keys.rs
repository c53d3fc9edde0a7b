//! KV key layout for a persisted identity database.
//!
//! Every key is scoped under a namespace so several databases can share
//! one store:
//!
//! ```text
//! {ns}:meta              → msgpack Meta
//! {ns}:id:{seq_20d}      → msgpack IdentityRecord
//! ```
//!
//! Sequence numbers are zero-padded to 20 digits so a prefix scan returns
//! identities in creation order.

/// Prefix covering every key of a namespace. Format: "{ns}:"
pub fn namespace_prefix(ns: &str) -> String {
    format!("{ns}:")
}

/// KV key for database metadata. Format: "{ns}:meta"
pub fn meta_key(ns: &str) -> String {
    format!("{ns}:meta")
}

/// Prefix for listing all identity records. Format: "{ns}:id:"
pub fn identity_prefix(ns: &str) -> String {
    format!("{ns}:id:")
}

/// KV key for one identity record. Format: "{ns}:id:{seq:020}"
pub fn identity_key(ns: &str, seq: u64) -> String {
    format!("{ns}:id:{seq:020}")
}
