//! CLI utilities for elephid.
//!
//! Configuration loading, well-known paths and result output shared by
//! the command-line tools.

pub mod config;
pub mod output;
pub mod paths;

pub use config::{load_config, read_config, Config};
pub use output::{Output, OutputFormat};
pub use paths::Paths;
