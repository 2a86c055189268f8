//! Deriva session credentials
//!
//! The credential file maps each host to the session cookie obtained by
//! logging in with deriva-auth:
//!
//! ```json
//! { "dev.atlas-d2k.org": { "cookie": "webauthn=..." } }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use atlas_http::Auth;
use serde::Deserialize;

use crate::error::{PipelineError, Result};

#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct HostCredential {
    pub cookie: String,
}

impl std::fmt::Debug for HostCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostCredential")
            .field("cookie", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DerivaCredentials {
    hosts: HashMap<String, HostCredential>,
}

impl DerivaCredentials {
    /// `~/.deriva/credential.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".deriva").join("credential.json"))
    }

    pub fn from_json(json: &str, origin: &Path) -> Result<Self> {
        let hosts = serde_json::from_str(json).map_err(|e| PipelineError::Credentials {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self { hosts })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(PipelineError::io(path))?;
        Self::from_json(&content, path)
    }

    /// Load `path`, or the default file when `None`.
    ///
    /// A missing default file yields empty credentials, i.e. anonymous access.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(path),
                _ => {
                    tracing::warn!("No deriva credential file found, continuing anonymously");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn for_host(&self, host: &str) -> Option<Auth> {
        self.hosts
            .get(host)
            .map(|credential| Auth::Cookie(credential.cookie.clone()))
    }
}
