//! Pipeline configuration
//!
//! Everything a pipeline entry point needs to know about where it runs is
//! carried in a [`PipelineConfig`] value. It can be read from
//! `<config_dir>/atlas-d2k/pipelines.toml`:
//!
//! ```toml
//! host = "staging.atlas-d2k.org"
//! catalog_id = "2"
//! scratch_dir = "/scratch/scrna"
//! credential_file = "/home/me/.deriva/credential.json"
//! ```
//!
//! Missing keys take their defaults; command-line flags override the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

pub const DEFAULT_HOST: &str = "dev.atlas-d2k.org";
pub const DEFAULT_CATALOG_ID: &str = "2";
pub const DEFAULT_SCRATCH_DIR: &str = "/scratch/scrna";

const PRODUCTION_HOSTS: &[&str] = &[
    "www.atlas-d2k.org",
    "www.gudmap.org",
    "www.rebuildingakidney.org",
];
const STAGING_HOSTS: &[&str] = &[
    "staging.atlas-d2k.org",
    "staging.gudmap.org",
    "staging.rebuildingakidney.org",
];

/// Deployment tier a host belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Staging,
    Development,
}

impl Environment {
    /// Unknown hosts are development servers
    pub fn for_host(host: &str) -> Self {
        if PRODUCTION_HOSTS.contains(&host) {
            Environment::Production
        } else if STAGING_HOSTS.contains(&host) {
            Environment::Staging
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Development => "development",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fully qualified catalog host
    pub host: String,
    /// ERMrest catalog id or alias
    pub catalog_id: String,
    /// Root under which per-replicate working trees are created
    pub scratch_dir: PathBuf,
    /// Deriva credential file; `None` means `~/.deriva/credential.json`
    pub credential_file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            catalog_id: DEFAULT_CATALOG_ID.to_string(),
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            credential_file: None,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml(toml_str: &str, origin: &Path) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| PipelineError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(PipelineError::io(path))?;
        Self::from_toml(&content, path)
    }

    /// `<config_dir>/atlas-d2k/pipelines.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("atlas-d2k").join("pipelines.toml"))
    }

    /// Read the default config file if there is one, otherwise use defaults
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!("Loading pipeline config from {}", path.display());
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_catalog_id(mut self, catalog_id: impl Into<String>) -> Self {
        self.catalog_id = catalog_id.into();
        self
    }

    pub fn with_scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = scratch_dir.into();
        self
    }

    pub fn with_credential_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_file = Some(path.into());
        self
    }

    pub fn environment(&self) -> Environment {
        Environment::for_host(&self.host)
    }

    /// Working tree of one replicate under the scratch directory
    pub fn replicate_dir(&self, replicate_rid: &str) -> PathBuf {
        self.scratch_dir.join(replicate_rid)
    }
}
