//! Router configuration.
//!
//! Loaded from an optional TOML file (`mare.toml` by default). Every field
//! has a default, so an empty or absent file yields a working router.
//!
//! ```toml
//! rep_directory = "reps"
//! rep_file_suffix = "_rep.json"
//! rules_file = "rules.toml"
//!
//! [dispatch]
//! max_concurrent = 4
//! fail_fast = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigurationError, Result};
use crate::routing::executor::DispatchConfig;
use crate::routing::roles::DEFAULT_REP_FILE_SUFFIX;
use crate::routing::rules::RuleTable;

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "mare.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MareConfig {
    /// Directory scanned for role definition files.
    pub rep_directory: PathBuf,

    /// File-name suffix identifying role definition files.
    pub rep_file_suffix: String,

    /// Optional TOML rules file replacing the built-in rule table.
    pub rules_file: Option<PathBuf>,

    pub dispatch: DispatchConfig,
}

impl Default for MareConfig {
    fn default() -> Self {
        Self {
            rep_directory: PathBuf::from("."),
            rep_file_suffix: DEFAULT_REP_FILE_SUFFIX.to_string(),
            rules_file: None,
            dispatch: DispatchConfig::default(),
        }
    }
}

impl MareConfig {
    pub fn from_toml_str(source: &str, origin: &Path) -> Result<Self> {
        toml::from_str(source).map_err(|source| ConfigurationError::ParseToml {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load `path`. Relative `rep_directory` and `rules_file` entries are
    /// resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| {
            ConfigurationError::ReadFile {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let mut config = Self::from_toml_str(&source, path)?;
        if let Some(base) = path.parent() {
            config.rep_directory = base.join(&config.rep_directory);
            config.rules_file = config.rules_file.map(|f| base.join(f));
        }
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// The configured rule table: the rules file if set, else the built-in one.
    pub fn rule_table(&self) -> Result<RuleTable> {
        match &self.rules_file {
            Some(path) => RuleTable::from_toml_file(path),
            None => Ok(RuleTable::standard()),
        }
    }
}
