//! Read-only database inspection.

use std::path::PathBuf;

use clap::Args;
use elephid_identity::DbStats;
use serde::Serialize;

use super::{output, read_db, read_only_config};
use crate::Cli;

/// List identities with their embedding counts.
#[derive(Args)]
pub struct ListCommand {}

#[derive(Serialize)]
struct IdentityRow {
    key: String,
    embeddings: usize,
}

impl ListCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = read_only_config(cli)?;
        let db = read_db(&cfg)?;

        let rows: Vec<IdentityRow> = db
            .all()
            .map(|id| IdentityRow {
                key: id.key().to_string(),
                embeddings: id.len(),
            })
            .collect();
        output(cli).write(&rows)
    }
}

/// Show one identity.
#[derive(Args)]
pub struct ShowCommand {
    /// Identity key, e.g. elephant_0001
    key: String,
}

#[derive(Serialize)]
struct IdentityView {
    key: String,
    seq: u64,
    embeddings: usize,
    dim: Option<usize>,
}

impl ShowCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = read_only_config(cli)?;
        let db = read_db(&cfg)?;

        let Some(id) = db.identity(&self.key) else {
            anyhow::bail!("identity '{}' not found", self.key);
        };
        output(cli).write(&IdentityView {
            key: id.key().to_string(),
            seq: id.seq(),
            embeddings: id.len(),
            dim: db.dim(),
        })
    }
}

/// Database statistics.
#[derive(Args)]
pub struct StatsCommand {}

#[derive(Serialize)]
struct StatsView {
    database: PathBuf,
    namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(flatten)]
    stats: DbStats,
}

impl StatsCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = read_only_config(cli)?;
        let db = read_db(&cfg)?;

        output(cli).write(&StatsView {
            database: cfg.db_file()?,
            namespace: cfg.namespace.clone(),
            model: db.model().map(str::to_string),
            stats: db.stats(),
        })
    }
}
