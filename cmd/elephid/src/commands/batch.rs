//! Folder processing.

use std::path::PathBuf;

use clap::Args;
use tracing::warn;

use super::{build_resolver, get_config, output, print_success, Session};
use crate::Cli;

/// Resolve every image in a folder, in file name order.
///
/// Images that cannot be read or contain no usable face are reported and
/// skipped. The database is saved once at the end.
#[derive(Args)]
pub struct BatchCommand {
    /// Folder of images
    dir: PathBuf,
}

impl BatchCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let resolver = build_resolver(&cfg)?;
        let mut session = Session::open(&cfg)?;

        let report = resolver.resolve_dir(&mut session.db, &self.dir)?;
        session.save()?;

        output(cli).write(&report)?;
        if report.failed > 0 {
            warn!(failed = report.failed, "some images could not be resolved");
        }
        print_success(&format!(
            "{} images processed, {} resolved, {} failed, {} unique identities in database",
            report.processed,
            report.succeeded(),
            report.failed,
            session.db.len()
        ));
        Ok(())
    }
}
