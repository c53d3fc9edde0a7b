//! Configuration management for CLI tools.
//!
//! Configuration is stored in ~/.elephid/config.yaml. Every field is
//! optional in the file; missing fields take their defaults.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use elephid_facevec::FeatureConfig;
use elephid_resolve::{ResolverConfig, DEFAULT_EXTENSIONS, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};

use crate::paths::Paths;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum similarity to match an existing identity.
    pub threshold: f32,

    /// Identity database file. Defaults to ~/.elephid/data/identities.redb.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// Namespace of the identity database inside the store.
    pub namespace: String,

    /// Prefix for new identity keys, e.g. `elephant` gives `elephant_0001`.
    pub key_prefix: String,

    /// Image extensions picked up by `batch`.
    pub extensions: Vec<String>,

    /// Embedding extractor settings.
    pub model: FeatureConfig,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            db_path: None,
            namespace: "elephid".to_string(),
            key_prefix: "elephant".to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            model: FeatureConfig::default(),
            config_path: PathBuf::new(),
        }
    }
}

impl Config {
    /// Gets the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Paths::new().ok().map(|p| p.config_file())
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the database file, falling back to the default location.
    pub fn db_file(&self) -> anyhow::Result<PathBuf> {
        match &self.db_path {
            Some(p) => Ok(p.clone()),
            None => Ok(Paths::new()?.db_file()),
        }
    }

    /// Builds the resolver settings from this configuration.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            threshold: self.threshold,
            extensions: self.extensions.clone(),
        }
    }

    /// Checks every field, reporting the first problem.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.resolver_config().validate()?;
        self.model.validate()?;
        if self.namespace.is_empty() || self.namespace.contains(':') {
            anyhow::bail!("namespace {:?} must be non-empty without ':'", self.namespace);
        }
        if self.key_prefix.is_empty() {
            anyhow::bail!("key_prefix must not be empty");
        }
        Ok(())
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        save_config(self, &self.config_path)
    }
}

fn config_path(custom_path: Option<&Path>) -> anyhow::Result<PathBuf> {
    match custom_path {
        Some(p) => Ok(p.to_path_buf()),
        None => Config::default_config_path()
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path")),
    }
}

fn parse_config(path: &Path) -> anyhow::Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("parse {}", path.display()))
}

/// Loads the configuration from `custom_path` or the default location.
///
/// A missing file is created with default values.
pub fn load_config(custom_path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = config_path(custom_path)?;

    let mut cfg = if config_path.exists() {
        parse_config(&config_path)?
    } else {
        let cfg = Config::default();
        save_config(&cfg, &config_path)?;
        cfg
    };

    cfg.config_path = config_path;
    Ok(cfg)
}

/// Like [`load_config`], but never touches the filesystem beyond reading.
/// A missing file yields the defaults.
pub fn read_config(custom_path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = config_path(custom_path)?;

    let mut cfg = if config_path.exists() {
        parse_config(&config_path)?
    } else {
        Config::default()
    };

    cfg.config_path = config_path;
    Ok(cfg)
}

/// Saves configuration to the specified path.
pub fn save_config(config: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
