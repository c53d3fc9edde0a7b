use serde::{Deserialize, Serialize};

use crate::ResolveError;

/// Default minimum similarity for matching an existing identity.
pub const DEFAULT_THRESHOLD: f32 = 0.55;

/// File extensions picked up by directory scans when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// Controls resolver behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Minimum cosine similarity to match an existing identity.
    /// Lower = more lenient (more merges), higher = stricter (more new identities).
    /// Default: 0.55.
    pub threshold: f32,

    /// Image file extensions considered by directory scans, case-insensitive.
    pub extensions: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), ResolveError> {
        check_threshold(self.threshold)
    }
}

pub(crate) fn check_threshold(t: f32) -> Result<(), ResolveError> {
    if (0.0..=1.0).contains(&t) {
        Ok(())
    } else {
        Err(ResolveError::InvalidThreshold(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold() {
        let cfg = ResolverConfig::default();
        assert_eq!(cfg.threshold, 0.55);
        assert!(cfg.extensions.iter().any(|e| e == "jpg"));
        cfg.validate().unwrap();
    }

    #[test]
    fn threshold_bounds() {
        assert!(check_threshold(0.0).is_ok());
        assert!(check_threshold(1.0).is_ok());
        assert!(check_threshold(-0.01).is_err());
        assert!(check_threshold(1.01).is_err());
        assert!(check_threshold(f32::NAN).is_err());
    }
}
