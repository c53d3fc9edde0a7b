//! Configuration management commands.

use clap::{Args, Subcommand};
use elephid_cli::config::save_config;
use elephid_cli::{Config, Paths};

use super::{output, print_success, read_only_config};
use crate::Cli;

/// Manage CLI configuration.
///
/// Configuration is stored in ~/.elephid/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// View the effective configuration
    View,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::View => {
                let cfg = read_only_config(cli)?;
                eprintln!("Config file: {}", cfg.path().display());
                eprintln!("Database: {}", cfg.db_file()?.display());
                output(cli).write(&cfg)
            }

            ConfigSubcommand::Init { force } => {
                let path = match &cli.config {
                    Some(p) => p.clone(),
                    None => Paths::new()?.config_file(),
                };
                if path.exists() && !force {
                    anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
                }
                save_config(&Config::default(), &path)?;
                print_success(&format!("Wrote {}", path.display()));
                Ok(())
            }
        }
    }
}
