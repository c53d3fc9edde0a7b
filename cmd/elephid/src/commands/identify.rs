//! Single-image commands.

use std::path::PathBuf;

use clap::Args;
use elephid_identity::{rank, Match};
use serde::Serialize;

use super::{build_resolver, get_config, output, read_db, read_only_config, Session};
use crate::Cli;

/// Resolve one image, creating a new identity when nothing matches.
///
/// The database is saved after the image is resolved.
#[derive(Args)]
pub struct IdentifyCommand {
    /// Image file (JPEG, PNG, GIF, WebP, BMP)
    image: PathBuf,
}

impl IdentifyCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let resolver = build_resolver(&cfg)?;
        let mut session = Session::open(&cfg)?;

        let res = resolver.resolve_file(&mut session.db, &self.image)?;
        session.save()?;
        output(cli).write(&res)
    }
}

/// Rank the closest identities for an image. Read-only.
#[derive(Args)]
pub struct MatchCommand {
    /// Image file
    image: PathBuf,

    /// Number of candidates to show
    #[arg(long, default_value_t = 5)]
    top: usize,
}

#[derive(Serialize)]
struct MatchReport {
    threshold: f32,
    /// Identity `identify` would assign, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    best: Option<String>,
    candidates: Vec<Match>,
}

impl MatchCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = read_only_config(cli)?;
        let resolver = build_resolver(&cfg)?;
        let db = read_db(&cfg)?;
        let name = resolver.model().name();
        match db.model() {
            Some(existing) if existing != name => {
                anyhow::bail!("database was built with model {existing:?}, config selects {name:?}")
            }
            _ => {}
        }

        let emb = resolver.model().extract_file(&self.image)?;
        db.check_embedding(&emb)?;

        let mut candidates = rank(&emb, &db);
        let best = candidates
            .first()
            .filter(|m| m.score >= resolver.threshold())
            .map(|m| m.key.clone());
        candidates.truncate(self.top);

        output(cli).write(&MatchReport {
            threshold: resolver.threshold(),
            best,
            candidates,
        })
    }
}
