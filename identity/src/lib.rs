//! Incremental identity database with best-evidence similarity matching.
//!
//! Each identity owns an append-only, insertion-ordered list of embeddings.
//! A query is matched against every stored embedding; an identity scores the
//! maximum over its embeddings, and ties are broken deterministically.
//!
//! # Usage
//!
//! ```
//! use elephid_identity::{best_match, IdentityDb};
//!
//! let mut db = IdentityDb::default();
//! let key = db.create(vec![1.0, 0.0, 0.0]).unwrap();
//!
//! let m = best_match(&[0.9, 0.1, 0.0], &db, 0.55).unwrap();
//! assert_eq!(m.key, key);
//! db.append(&m.key, vec![0.9, 0.1, 0.0]).unwrap();
//! assert_eq!(db.get(&key).unwrap().len(), 2);
//! ```
//!
//! # Persistence
//!
//! [`save`] and [`load`] write and read full snapshots through the
//! [`elephid_kv::KVStore`] contract.

mod cosine;
mod db;
mod error;
pub mod keys;
mod matcher;
mod persist;

pub use cosine::cosine_similarity;
pub use db::{DbStats, Embedding, Identity, IdentityDb, IdentityKey, DEFAULT_PREFIX};
pub use error::IdentityError;
pub use matcher::{best_match, rank, score_identity, Match};
pub use persist::{load, load_or_new, save, FORMAT_VERSION};
