use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::IdentityError;

/// A face embedding. Immutable once stored.
pub type Embedding = Vec<f32>;

/// Stable identifier of one individual (e.g. "elephant_0001").
pub type IdentityKey = String;

/// Default prefix for generated identity keys.
pub const DEFAULT_PREFIX: &str = "elephant";

/// One individual and every embedding observed for it, in insertion order.
#[derive(Clone, PartialEq)]
pub struct Identity {
    key: IdentityKey,
    seq: u64,
    embeddings: Vec<Embedding>,
}

impl Identity {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Allocation sequence number; lower means created earlier.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn embeddings(&self) -> &[Embedding] {
        &self.embeddings
    }

    /// Number of stored embeddings, always at least one.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("key", &self.key)
            .field("seq", &self.seq)
            .field("embeddings", &self.embeddings.len())
            .finish()
    }
}

/// Summary figures for database inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbStats {
    pub identities: usize,
    pub embeddings: usize,
    pub avg_per_identity: f64,
    pub dim: Option<usize>,
}

/// Maps identity keys to their append-only embedding collections.
///
/// The database is a plain owned value: pass it explicitly to whatever
/// resolves images against it. Identities are kept in creation order and
/// keys are generated from a monotonically increasing sequence, so a key is
/// never reused even across save/load cycles.
///
/// All embeddings share one dimension, fixed by the first embedding stored.
#[derive(Clone)]
pub struct IdentityDb {
    prefix: String,
    dim: Option<usize>,
    model: Option<String>,
    last_seq: u64,
    identities: Vec<Identity>,
    index: HashMap<IdentityKey, usize>,
}

impl IdentityDb {
    /// Creates an empty database whose keys look like `{prefix}_0001`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            dim: None,
            model: None,
            last_seq: 0,
            identities: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Rebuilds a database from persisted parts, checking every invariant.
    pub(crate) fn from_parts(
        prefix: String,
        dim: Option<usize>,
        model: Option<String>,
        last_seq: u64,
        records: Vec<(IdentityKey, u64, Vec<Embedding>)>,
    ) -> Result<Self, IdentityError> {
        let mut db = Self::new(prefix);
        db.dim = dim;
        db.model = model;

        let mut prev_seq = 0;
        for (key, seq, embeddings) in records {
            if embeddings.is_empty() {
                return Err(IdentityError::Persistence(format!("identity {key:?} has no embeddings")));
            }
            if seq <= prev_seq {
                return Err(IdentityError::Persistence(format!(
                    "identity {key:?} has out-of-order sequence {seq}"
                )));
            }
            if seq > last_seq {
                return Err(IdentityError::Persistence(format!(
                    "identity {key:?} sequence {seq} exceeds last allocated {last_seq}"
                )));
            }
            let expected = db.format_key(seq);
            if key != expected {
                return Err(IdentityError::Persistence(format!(
                    "identity {key:?} does not match sequence {seq} (want {expected:?})"
                )));
            }
            for emb in &embeddings {
                db.check_embedding(emb)
                    .map_err(|e| IdentityError::Persistence(format!("identity {key:?}: {e}")))?;
                db.dim.get_or_insert(emb.len());
            }
            prev_seq = seq;
            db.index.insert(key.clone(), db.identities.len());
            db.identities.push(Identity { key, seq, embeddings });
        }
        db.last_seq = last_seq;
        Ok(db)
    }

    /// Validates an embedding against the database dimension without storing it.
    pub fn check_embedding(&self, emb: &[f32]) -> Result<(), IdentityError> {
        if emb.is_empty() {
            return Err(IdentityError::EmptyEmbedding);
        }
        if let Some(expected) = self.dim {
            if emb.len() != expected {
                return Err(IdentityError::DimensionMismatch {
                    expected,
                    got: emb.len(),
                });
            }
        }
        if let Some(i) = emb.iter().position(|v| !v.is_finite()) {
            return Err(IdentityError::NonFinite(i));
        }
        Ok(())
    }

    /// Allocates a fresh identity holding exactly `[emb]` and returns its key.
    pub fn create(&mut self, emb: Embedding) -> Result<IdentityKey, IdentityError> {
        self.check_embedding(&emb)?;
        let seq = self
            .last_seq
            .checked_add(1)
            .ok_or(IdentityError::KeySpaceExhausted)?;
        // Keys are derived from strictly increasing sequences, so a fresh
        // sequence never names an existing identity.
        let key = self.format_key(seq);
        debug_assert!(!self.index.contains_key(&key), "identity: key {key} reused");

        self.dim.get_or_insert(emb.len());
        self.last_seq = seq;
        self.index.insert(key.clone(), self.identities.len());
        self.identities.push(Identity {
            key: key.clone(),
            seq,
            embeddings: vec![emb],
        });
        debug!(key = %key, "identity: created");
        Ok(key)
    }

    /// Appends `emb` to an existing identity, preserving insertion order.
    pub fn append(&mut self, key: &str, emb: Embedding) -> Result<(), IdentityError> {
        let idx = *self
            .index
            .get(key)
            .ok_or_else(|| IdentityError::UnknownIdentity(key.to_string()))?;
        self.check_embedding(&emb)?;
        self.dim.get_or_insert(emb.len());
        let identity = &mut self.identities[idx];
        identity.embeddings.push(emb);
        debug!(key = %key, count = identity.embeddings.len(), "identity: appended");
        Ok(())
    }

    /// Returns the embeddings stored for `key`.
    pub fn get(&self, key: &str) -> Option<&[Embedding]> {
        self.identity(key).map(Identity::embeddings)
    }

    /// Returns the full identity for `key`.
    pub fn identity(&self, key: &str) -> Option<&Identity> {
        self.index.get(key).map(|&i| &self.identities[i])
    }

    /// Iterates over all identities in creation order.
    pub fn all(&self) -> impl Iterator<Item = &Identity> {
        self.identities.iter()
    }

    /// Number of identities.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Number of embeddings across all identities.
    pub fn total_embeddings(&self) -> usize {
        self.identities.iter().map(Identity::len).sum()
    }

    /// Embedding dimension, once known.
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Name of the extraction model the embeddings came from, if recorded.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Records the extraction model name.
    pub fn set_model(&mut self, name: impl Into<String>) {
        self.model = Some(name.into());
    }

    /// Highest sequence number allocated so far.
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    pub fn stats(&self) -> DbStats {
        let identities = self.len();
        let embeddings = self.total_embeddings();
        DbStats {
            identities,
            embeddings,
            avg_per_identity: if identities == 0 {
                0.0
            } else {
                embeddings as f64 / identities as f64
            },
            dim: self.dim,
        }
    }

    fn format_key(&self, seq: u64) -> IdentityKey {
        if self.prefix.is_empty() {
            format!("{seq:04}")
        } else {
            format!("{}_{seq:04}", self.prefix)
        }
    }
}

impl Default for IdentityDb {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl fmt::Debug for IdentityDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityDb")
            .field("prefix", &self.prefix)
            .field("dim", &self.dim)
            .field("model", &self.model)
            .field("identities", &self.identities.len())
            .field("embeddings", &self.total_embeddings())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get_returns_singleton() {
        let mut db = IdentityDb::default();
        let e = vec![1.0, 0.0, 0.0];
        let k = db.create(e.clone()).unwrap();
        assert_eq!(k, "elephant_0001");
        assert_eq!(db.get(&k).unwrap(), &[e][..]);
        assert_eq!(db.len(), 1);
        assert_eq!(db.dim(), Some(3));
    }

    #[test]
    fn append_preserves_order() {
        let mut db = IdentityDb::default();
        let e1 = vec![1.0, 0.0];
        let e2 = vec![0.0, 1.0];
        let k = db.create(e1.clone()).unwrap();
        db.append(&k, e2.clone()).unwrap();
        assert_eq!(db.get(&k).unwrap(), &[e1, e2][..]);
        assert_eq!(db.total_embeddings(), 2);
    }

    #[test]
    fn append_unknown_fails() {
        let mut db = IdentityDb::default();
        let err = db.append("elephant_0042", vec![1.0]).unwrap_err();
        assert!(matches!(err, IdentityError::UnknownIdentity(ref k) if k == "elephant_0042"));
        assert!(db.is_empty());
    }

    #[test]
    fn keys_are_sequential_and_unique() {
        let mut db = IdentityDb::new("tusker");
        let keys: Vec<String> = (0..3).map(|i| db.create(vec![i as f32 + 1.0]).unwrap()).collect();
        assert_eq!(keys, vec!["tusker_0001", "tusker_0002", "tusker_0003"]);
        let listed: Vec<&str> = db.all().map(|i| i.key()).collect();
        assert_eq!(listed, vec!["tusker_0001", "tusker_0002", "tusker_0003"]);
        assert_eq!(db.last_seq(), 3);
        assert!(db.all().all(|i| !i.is_empty() && i.len() == 1));
    }

    #[test]
    fn empty_prefix_format() {
        let mut db = IdentityDb::new("");
        assert_eq!(db.create(vec![1.0]).unwrap(), "0001");
    }

    #[test]
    fn dimension_is_enforced() {
        let mut db = IdentityDb::default();
        let k = db.create(vec![1.0, 2.0, 3.0]).unwrap();
        let err = db.create(vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, IdentityError::DimensionMismatch { expected: 3, got: 2 }));
        let err = db.append(&k, vec![1.0]).unwrap_err();
        assert!(matches!(err, IdentityError::DimensionMismatch { .. }));
        // Failed calls leave the database untouched.
        assert_eq!(db.len(), 1);
        assert_eq!(db.total_embeddings(), 1);
        assert_eq!(db.last_seq(), 1);
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        let mut db = IdentityDb::default();
        assert!(matches!(db.create(vec![]), Err(IdentityError::EmptyEmbedding)));
        assert!(matches!(db.create(vec![1.0, f32::NAN]), Err(IdentityError::NonFinite(1))));
        assert!(db.is_empty());
        assert_eq!(db.dim(), None);
    }

    #[test]
    fn stats_summary() {
        let mut db = IdentityDb::default();
        assert_eq!(db.stats().avg_per_identity, 0.0);

        let a = db.create(vec![1.0, 0.0]).unwrap();
        db.create(vec![0.0, 1.0]).unwrap();
        db.append(&a, vec![1.0, 0.1]).unwrap();
        db.append(&a, vec![1.0, 0.2]).unwrap();

        let s = db.stats();
        assert_eq!(s.identities, 2);
        assert_eq!(s.embeddings, 4);
        assert_eq!(s.avg_per_identity, 2.0);
        assert_eq!(s.dim, Some(2));
    }

    #[test]
    fn from_parts_rejects_duplicates() {
        let recs = vec![
            ("e_0001".to_string(), 1, vec![vec![1.0]]),
            ("e_0001".to_string(), 2, vec![vec![1.0]]),
        ];
        let err = IdentityDb::from_parts("e".into(), None, None, 2, recs).unwrap_err();
        assert!(matches!(err, IdentityError::Persistence(_)));
    }

    #[test]
    fn from_parts_rejects_key_not_derived_from_seq() {
        let recs = vec![("e_0002".to_string(), 1, vec![vec![1.0]])];
        let err = IdentityDb::from_parts("e".into(), None, None, 1, recs).unwrap_err();
        assert!(matches!(err, IdentityError::Persistence(_)), "{err}");
    }

    #[test]
    fn from_parts_rejects_mixed_dimensions() {
        let recs = vec![
            ("e_0001".to_string(), 1, vec![vec![1.0, 0.0]]),
            ("e_0002".to_string(), 2, vec![vec![1.0, 0.0, 0.0]]),
        ];
        let err = IdentityDb::from_parts("e".into(), None, None, 2, recs).unwrap_err();
        assert!(matches!(err, IdentityError::Persistence(_)), "{err}");
    }

    #[test]
    fn from_parts_rejects_empty_identity() {
        let recs = vec![("e_0001".to_string(), 1, vec![])];
        assert!(IdentityDb::from_parts("e".into(), None, None, 1, recs).is_err());
    }

    #[test]
    fn from_parts_continues_sequence() {
        let recs = vec![("e_0005".to_string(), 5, vec![vec![1.0, 0.0]])];
        let mut db = IdentityDb::from_parts("e".into(), Some(2), None, 7, recs).unwrap();
        assert_eq!(db.create(vec![0.0, 1.0]).unwrap(), "e_0008");
    }
}
