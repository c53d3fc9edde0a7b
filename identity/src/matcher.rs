//! Best-evidence identity matching.
//!
//! The query is compared against every stored embedding. An identity's
//! score is the maximum over its embeddings, so one strong prior sighting
//! is enough to confirm it even when other sightings are noisier.
//!
//! Candidates are totally ordered by:
//! 1. score, descending
//! 2. number of stored embeddings, descending
//! 3. creation sequence, ascending
//!
//! so equal inputs always produce the same winner.

use std::cmp::Ordering;

use serde::Serialize;

use crate::cosine::cosine_similarity;
use crate::db::{Identity, IdentityDb, IdentityKey};

/// A scored candidate identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub key: IdentityKey,
    /// Cosine similarity of the closest stored embedding.
    pub score: f32,
    /// Number of embeddings the identity held when scored.
    pub embeddings: usize,
}

/// Scores `query` against one identity: the maximum similarity over its embeddings.
pub fn score_identity(query: &[f32], identity: &Identity) -> f32 {
    identity
        .embeddings()
        .iter()
        .map(|e| cosine_similarity(query, e))
        .fold(f32::NEG_INFINITY, f32::max)
}

struct Candidate<'a> {
    identity: &'a Identity,
    score: f32,
}

impl Candidate<'_> {
    /// `Less` means `self` ranks ahead of `other`.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.identity.len().cmp(&self.identity.len()))
            .then_with(|| self.identity.seq().cmp(&other.identity.seq()))
    }

    fn into_match(self) -> Match {
        Match {
            key: self.identity.key().to_string(),
            score: self.score,
            embeddings: self.identity.len(),
        }
    }
}

fn candidates<'a>(query: &'a [f32], db: &'a IdentityDb) -> impl Iterator<Item = Candidate<'a>> + 'a {
    db.all().map(move |identity| Candidate {
        identity,
        score: score_identity(query, identity),
    })
}

/// Returns the best-scoring identity when its score reaches `threshold`.
///
/// Returns `None` for an empty database or when the best score is below
/// the threshold. Never mutates the database.
pub fn best_match(query: &[f32], db: &IdentityDb, threshold: f32) -> Option<Match> {
    let best = candidates(query, db).min_by(|a, b| a.rank_cmp(b))?;
    if best.score >= threshold {
        Some(best.into_match())
    } else {
        None
    }
}

/// Scores every identity and returns them best first, using the same
/// ordering as [`best_match`].
pub fn rank(query: &[f32], db: &IdentityDb) -> Vec<Match> {
    let mut all: Vec<Candidate<'_>> = candidates(query, db).collect();
    all.sort_by(|a, b| a.rank_cmp(b));
    all.into_iter().map(Candidate::into_match).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_db_never_matches() {
        let db = IdentityDb::default();
        assert!(best_match(&[1.0, 0.0], &db, 0.0).is_none());
        assert!(best_match(&[1.0, 0.0], &db, -1.0).is_none());
        assert!(rank(&[1.0, 0.0], &db).is_empty());
    }

    #[test]
    fn below_threshold_is_none() {
        let mut db = IdentityDb::default();
        db.create(vec![1.0, 0.0]).unwrap();
        assert!(best_match(&[0.0, 1.0], &db, 0.55).is_none());
        assert!(best_match(&[1.0, 0.0], &db, 0.55).is_some());
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut db = IdentityDb::default();
        let k = db.create(vec![1.0, 0.0]).unwrap();
        let m = best_match(&[1.0, 0.0], &db, 1.0).unwrap();
        assert_eq!(m.key, k);
        assert_eq!(m.score, 1.0);
    }

    #[test]
    fn max_over_embeddings_not_mean() {
        let mut db = IdentityDb::default();
        // A: one exact sighting plus two noisy ones.
        let a = db.create(vec![0.0, 1.0, 0.0]).unwrap();
        db.append(&a, vec![0.0, 0.0, 1.0]).unwrap();
        db.append(&a, vec![1.0, 0.0, 0.0]).unwrap();
        // B: consistently fairly close.
        let b = db.create(vec![0.8, 0.6, 0.0]).unwrap();

        let query = [1.0, 0.0, 0.0];
        // Mean for A would be 1/3 < 0.8; max is 1.0.
        let m = best_match(&query, &db, 0.5).unwrap();
        assert_eq!(m.key, a);
        assert_eq!(m.embeddings, 3);

        let ranked = rank(&query, &db);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[1].key, b);
        assert!((ranked[1].score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn tie_prefers_more_embeddings() {
        let mut db = IdentityDb::default();
        let first = db.create(vec![1.0, 0.0]).unwrap();
        let second = db.create(vec![1.0, 0.0]).unwrap();
        db.append(&second, vec![0.0, 1.0]).unwrap();

        let m = best_match(&[1.0, 0.0], &db, 0.5).unwrap();
        assert_eq!(m.key, second);
        assert_ne!(m.key, first);
    }

    #[test]
    fn tie_then_prefers_earliest() {
        let mut db = IdentityDb::default();
        let first = db.create(vec![1.0, 0.0]).unwrap();
        db.create(vec![1.0, 0.0]).unwrap();
        db.create(vec![1.0, 0.0]).unwrap();

        for _ in 0..5 {
            let m = best_match(&[2.0, 0.0], &db, 0.5).unwrap();
            assert_eq!(m.key, first);
        }
        let order: Vec<String> = rank(&[1.0, 0.0], &db).into_iter().map(|m| m.key).collect();
        assert_eq!(order, vec!["elephant_0001", "elephant_0002", "elephant_0003"]);
    }

    #[test]
    fn match_is_pure() {
        let mut db = IdentityDb::default();
        db.create(vec![1.0, 0.0]).unwrap();
        let before = db.total_embeddings();
        let _ = best_match(&[1.0, 0.0], &db, 0.5);
        let _ = rank(&[1.0, 0.0], &db);
        assert_eq!(db.total_embeddings(), before);
        assert_eq!(db.len(), 1);
    }
}
