//! Snapshot persistence of an [`IdentityDb`] over a [`KVStore`].
//!
//! [`save`] replaces the whole namespace in one atomic step, so a reader
//! sees either the previous snapshot or the new one. [`load`] validates
//! every invariant and refuses a store it cannot fully trust. Embedding
//! values are stored as msgpack f32 and round-trip bit-exactly.

use elephid_kv::KVStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::IdentityError;
use crate::db::{Embedding, IdentityDb};
use crate::keys::{identity_key, identity_prefix, meta_key, namespace_prefix};

/// Current on-store format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Meta {
    version: u32,
    prefix: String,
    dim: Option<usize>,
    #[serde(default)]
    model: Option<String>,
    last_seq: u64,
    identities: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct IdentityRecord {
    key: String,
    seq: u64,
    embeddings: Vec<Embedding>,
}

fn check_namespace(ns: &str) -> Result<(), IdentityError> {
    if ns.is_empty() || ns.contains(':') {
        return Err(IdentityError::Persistence(format!("invalid namespace {ns:?}")));
    }
    Ok(())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, IdentityError> {
    rmp_serde::to_vec_named(value).map_err(|e| IdentityError::Persistence(format!("encode: {e}")))
}

/// Writes a full snapshot of `db` under namespace `ns`, replacing any previous one.
pub fn save(db: &IdentityDb, store: &dyn KVStore, ns: &str) -> Result<(), IdentityError> {
    check_namespace(ns)?;

    let meta = Meta {
        version: FORMAT_VERSION,
        prefix: db.prefix().to_string(),
        dim: db.dim(),
        model: db.model().map(str::to_string),
        last_seq: db.last_seq(),
        identities: db.len(),
    };

    let mut entries: Vec<(String, Vec<u8>)> = Vec::with_capacity(db.len() + 1);
    entries.push((meta_key(ns), encode(&meta)?));
    for identity in db.all() {
        let record = IdentityRecord {
            key: identity.key().to_string(),
            seq: identity.seq(),
            embeddings: identity.embeddings().to_vec(),
        };
        entries.push((identity_key(ns, identity.seq()), encode(&record)?));
    }

    let refs: Vec<(&str, &[u8])> = entries
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_slice()))
        .collect();
    store.replace_prefix(&namespace_prefix(ns), &refs)?;

    info!(
        namespace = ns,
        identities = db.len(),
        embeddings = db.total_embeddings(),
        "identity: saved snapshot"
    );
    Ok(())
}

/// Loads the snapshot stored under `ns`.
///
/// Returns `Ok(None)` when the namespace holds nothing at all. Any
/// inconsistency (missing metadata, undecodable or duplicate records,
/// empty identities, mixed dimensions) is an error.
pub fn load(store: &dyn KVStore, ns: &str) -> Result<Option<IdentityDb>, IdentityError> {
    check_namespace(ns)?;

    let raw_records = store.scan(&identity_prefix(ns))?;
    let meta = match store.get(&meta_key(ns))? {
        Some(data) => rmp_serde::from_slice::<Meta>(&data)
            .map_err(|e| IdentityError::Persistence(format!("decode meta: {e}")))?,
        None if raw_records.is_empty() => return Ok(None),
        None => {
            return Err(IdentityError::Persistence(format!(
                "{} identity records without metadata",
                raw_records.len()
            )));
        }
    };

    if meta.version != FORMAT_VERSION {
        return Err(IdentityError::Persistence(format!(
            "unsupported format version {} (want {FORMAT_VERSION})",
            meta.version
        )));
    }
    if raw_records.len() != meta.identities {
        return Err(IdentityError::Persistence(format!(
            "metadata lists {} identities, store holds {}",
            meta.identities,
            raw_records.len()
        )));
    }

    let mut records = Vec::with_capacity(raw_records.len());
    for (kv_key, data) in raw_records {
        let rec: IdentityRecord = rmp_serde::from_slice(&data)
            .map_err(|e| IdentityError::Persistence(format!("decode {kv_key}: {e}")))?;
        if kv_key != identity_key(ns, rec.seq) {
            return Err(IdentityError::Persistence(format!(
                "record {kv_key} carries sequence {}",
                rec.seq
            )));
        }
        records.push((rec.key, rec.seq, rec.embeddings));
    }

    let db = IdentityDb::from_parts(meta.prefix, meta.dim, meta.model, meta.last_seq, records)?;
    debug!(namespace = ns, identities = db.len(), "identity: loaded snapshot");
    Ok(Some(db))
}

/// Loads the snapshot under `ns`, or starts an empty database with `prefix`.
pub fn load_or_new(store: &dyn KVStore, ns: &str, prefix: &str) -> Result<IdentityDb, IdentityError> {
    Ok(load(store, ns)?.unwrap_or_else(|| IdentityDb::new(prefix)))
}
