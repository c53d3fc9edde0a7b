use std::fmt;
use std::path::{Path, PathBuf};

use elephid_identity::IdentityKey;
use serde::Serialize;

/// Whether a resolution created an identity or extended an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    New,
    Matched,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::New => f.write_str("new"),
            Outcome::Matched => f.write_str("matched"),
        }
    }
}

/// The identity an image was resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub key: IdentityKey,
    pub is_new: bool,
    /// Similarity to the matched identity. `None` for new identities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl Resolution {
    pub(crate) fn created(key: IdentityKey) -> Self {
        Self {
            key,
            is_new: true,
            similarity: None,
            source: None,
        }
    }

    pub(crate) fn matched(key: IdentityKey, similarity: f32) -> Self {
        Self {
            key,
            is_new: false,
            similarity: Some(similarity),
            source: None,
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.is_new { Outcome::New } else { Outcome::Matched }
    }
}

/// Per-image result of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct ImageOutcome {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a batch run, with results in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub failed: usize,
    pub new_identities: usize,
    pub matched: usize,
    pub results: Vec<ImageOutcome>,
}

impl BatchReport {
    pub(crate) fn record(&mut self, path: &Path, resolution: Resolution) {
        self.processed += 1;
        match resolution.outcome() {
            Outcome::New => self.new_identities += 1,
            Outcome::Matched => self.matched += 1,
        }
        self.results.push(ImageOutcome {
            path: path.to_path_buf(),
            resolution: Some(resolution),
            error: None,
        });
    }

    pub(crate) fn record_failure(&mut self, path: &Path, error: String) {
        self.processed += 1;
        self.failed += 1;
        self.results.push(ImageOutcome {
            path: path.to_path_buf(),
            resolution: None,
            error: Some(error),
        });
    }

    pub fn succeeded(&self) -> usize {
        self.processed - self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally() {
        let mut report = BatchReport::default();
        report.record(Path::new("a.jpg"), Resolution::created("elephant_0001".into()));
        report.record(Path::new("b.jpg"), Resolution::matched("elephant_0001".into(), 0.9));
        report.record_failure(Path::new("c.jpg"), "no face".into());

        assert_eq!(report.processed, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.new_identities, 1);
        assert_eq!(report.matched, 1);
        assert!(report.results[2].resolution.is_none());
    }

    #[test]
    fn outcome_display() {
        assert_eq!(Resolution::created("k".into()).outcome().to_string(), "new");
        assert_eq!(Resolution::matched("k".into(), 1.0).outcome(), Outcome::Matched);
    }

    #[test]
    fn new_resolution_omits_similarity() {
        let json = serde_json::to_value(Resolution::created("elephant_0001".into())).unwrap();
        assert_eq!(json["key"], "elephant_0001");
        assert_eq!(json["is_new"], true);
        assert!(json.get("similarity").is_none());
    }
}
