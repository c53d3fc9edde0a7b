//! Shared helpers for commands.

use anyhow::Context as _;
use elephid_cli::{load_config, read_config, Config, Output, OutputFormat};
use elephid_facevec::FeatureModel;
use elephid_identity::{load_or_new, save, IdentityDb};
use elephid_kv::RedbStore;
use elephid_resolve::Resolver;
use tracing::{debug, info};

use crate::Cli;

/// Loads the configuration, creating a default file when missing, and
/// applies command-line overrides.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    with_overrides(cli, load_config(cli.config.as_deref())?)
}

/// Like [`get_config`] for read-only commands: a missing file is not created.
pub fn read_only_config(cli: &Cli) -> anyhow::Result<Config> {
    with_overrides(cli, read_config(cli.config.as_deref())?)
}

fn with_overrides(cli: &Cli, mut cfg: Config) -> anyhow::Result<Config> {
    if let Some(db) = &cli.db {
        cfg.db_path = Some(db.clone());
    }
    if let Some(t) = cli.threshold {
        cfg.threshold = t;
    }
    cfg.validate()
        .with_context(|| format!("invalid configuration in {}", cfg.path().display()))?;
    Ok(cfg)
}

/// Builds the resolver described by `cfg`.
pub fn build_resolver(cfg: &Config) -> anyhow::Result<Resolver> {
    let model = FeatureModel::new(cfg.model.clone())?;
    Ok(Resolver::new(Box::new(model), cfg.resolver_config())?)
}

/// An identity database opened for writing.
pub struct Session {
    store: RedbStore,
    namespace: String,
    pub db: IdentityDb,
}

impl Session {
    /// Opens (creating if needed) the database file and loads the snapshot.
    pub fn open(cfg: &Config) -> anyhow::Result<Self> {
        let path = cfg.db_file()?;
        let store = RedbStore::open(&path)
            .with_context(|| format!("open database {}", path.display()))?;
        let db = load_or_new(&store, &cfg.namespace, &cfg.key_prefix)?;
        debug!(path = %path.display(), identities = db.len(), "opened database");
        Ok(Self {
            store,
            namespace: cfg.namespace.clone(),
            db,
        })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        save(&self.db, &self.store, &self.namespace)?;
        info!(identities = self.db.len(), "database saved");
        Ok(())
    }
}

/// Loads the database for reading without writing to it. A missing file
/// reads as empty and is not created.
pub fn read_db(cfg: &Config) -> anyhow::Result<IdentityDb> {
    let path = cfg.db_file()?;
    if !path.exists() {
        debug!(path = %path.display(), "no database yet");
        return Ok(IdentityDb::new(cfg.key_prefix.as_str()));
    }
    let store = RedbStore::open_existing(&path)
        .with_context(|| format!("open database {}", path.display()))?;
    Ok(load_or_new(&store, &cfg.namespace, &cfg.key_prefix)?)
}

/// Returns the output destination selected on the command line.
pub fn output(cli: &Cli) -> Output {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Yaml
    };
    Output::new(format, cli.output.clone())
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}
