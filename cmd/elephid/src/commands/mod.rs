//! CLI commands module.

mod batch;
mod config;
mod identify;
mod inspect;
mod util;

pub use batch::BatchCommand;
pub use config::ConfigCommand;
pub use identify::{IdentifyCommand, MatchCommand};
pub use inspect::{ListCommand, ShowCommand, StatsCommand};

pub(crate) use util::*;
