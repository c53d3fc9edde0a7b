//! elephid - identify individual elephants from face photographs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    BatchCommand, ConfigCommand, IdentifyCommand, ListCommand, MatchCommand, ShowCommand,
    StatsCommand,
};

/// elephid - identify individual elephants from face photographs.
///
/// Each photo is turned into a face embedding and compared with every
/// elephant seen so far. A close enough match adds the photo to that
/// elephant; otherwise a new identity such as `elephant_0007` is created.
///
/// Configuration is stored in ~/.elephid/config.yaml and the identity
/// database in ~/.elephid/data/identities.redb.
#[derive(Parser)]
#[command(name = "elephid")]
#[command(about = "Elephant face identification")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.elephid/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Identity database file (overrides the config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Match threshold in [0, 1] (overrides the config)
    #[arg(short = 't', long, global = true)]
    pub threshold: Option<f32>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<PathBuf>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve one image to an identity
    Identify(IdentifyCommand),
    /// Resolve every image in a folder
    Batch(BatchCommand),
    /// Rank identities against an image without changing the database
    Match(MatchCommand),
    /// List identities
    List(ListCommand),
    /// Show one identity
    Show(ShowCommand),
    /// Database statistics
    Stats(StatsCommand),
    /// Manage CLI configuration
    Config(ConfigCommand),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Identify(cmd) => cmd.run(&cli),
        Commands::Batch(cmd) => cmd.run(&cli),
        Commands::Match(cmd) => cmd.run(&cli),
        Commands::List(cmd) => cmd.run(&cli),
        Commands::Show(cmd) => cmd.run(&cli),
        Commands::Stats(cmd) => cmd.run(&cli),
        Commands::Config(cmd) => cmd.run(&cli),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "elephid", "batch", "photos", "--threshold", "0.65", "--json", "--db", "/tmp/h.redb",
        ]);
        assert_eq!(cli.threshold, Some(0.65));
        assert!(cli.json);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/h.redb")));
        assert!(matches!(cli.command, Commands::Batch(_)));
    }
}
