//! Path utilities for elephid.

use std::io;
use std::path::PathBuf;

/// Default base directory name under the user's home.
pub const DEFAULT_BASE_DIR: &str = ".elephid";

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Default identity database filename inside the data directory.
pub const DEFAULT_DB_FILE: &str = "identities.redb";

/// Provides access to the elephid directory structure.
#[derive(Debug, Clone)]
pub struct Paths {
    /// User's home directory.
    pub home_dir: PathBuf,
}

impl Paths {
    pub fn new() -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not find home directory")
        })?;
        Ok(Self { home_dir })
    }

    /// Uses `home_dir` instead of the user's home.
    pub fn with_home(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
        }
    }

    /// Returns the base directory (~/.elephid).
    pub fn base_dir(&self) -> PathBuf {
        self.home_dir.join(DEFAULT_BASE_DIR)
    }

    /// Returns the config file path (~/.elephid/config.yaml).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir().join(DEFAULT_CONFIG_FILE)
    }

    /// Returns the data directory (~/.elephid/data).
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir().join("data")
    }

    /// Returns the default database file (~/.elephid/data/identities.redb).
    pub fn db_file(&self) -> PathBuf {
        self.data_dir().join(DEFAULT_DB_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_new() {
        let paths = Paths::new().unwrap();
        assert!(!paths.home_dir.as_os_str().is_empty());
    }

    #[test]
    fn test_paths_structure() {
        let paths = Paths::with_home("/home/ranger");

        assert_eq!(paths.base_dir(), PathBuf::from("/home/ranger/.elephid"));
        assert_eq!(paths.config_file(), PathBuf::from("/home/ranger/.elephid/config.yaml"));
        assert!(paths.data_dir().ends_with("data"));
        assert_eq!(
            paths.db_file(),
            PathBuf::from("/home/ranger/.elephid/data/identities.redb")
        );
    }
}
