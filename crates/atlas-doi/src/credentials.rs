//! DataCite account credentials
//!
//! Loaded once from a JSON file of the form
//!
//! ```json
//! {
//!     "server": "https://mds.test.datacite.org",
//!     "username": "ISI.ATLAS",
//!     "password": "...",
//!     "prefix": "10.25548"
//! }
//! ```

use std::path::Path;

use atlas_http::Auth;
use serde::Deserialize;

use crate::error::{DataciteError, Result};

#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub server: String,
    pub username: String,
    pub password: String,
    pub prefix: String,
}

impl Credentials {
    pub fn new(
        server: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Result<Self> {
        Self {
            server: server.into(),
            username: username.into(),
            password: password.into(),
            prefix: prefix.into(),
        }
        .normalized(Path::new("<inline>"))
    }

    /// Read and validate a credential file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DataciteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, path)
    }

    pub fn from_json(json: &str, origin: &Path) -> Result<Self> {
        let credentials: Credentials =
            serde_json::from_str(json).map_err(|e| DataciteError::Credentials {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;
        credentials.normalized(origin)
    }

    fn normalized(mut self, origin: &Path) -> Result<Self> {
        let invalid = |message: String| DataciteError::Credentials {
            path: origin.to_path_buf(),
            message,
        };

        url::Url::parse(&self.server)
            .map_err(|e| invalid(format!("server {:?} is not a URL: {}", self.server, e)))?;
        while self.server.ends_with('/') {
            self.server.pop();
        }

        self.prefix = self.prefix.trim().trim_end_matches('/').to_string();
        if self.prefix.is_empty() {
            return Err(invalid("prefix must not be empty".to_string()));
        }
        if self.username.is_empty() {
            return Err(invalid("username must not be empty".to_string()));
        }

        Ok(self)
    }

    pub(crate) fn auth(&self) -> Auth {
        Auth::Basic {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"***")
            .field("prefix", &self.prefix)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "server": "https://mds.test.datacite.org/",
        "username": "ISI.ATLAS",
        "password": "s3cret",
        "prefix": "10.25548"
    }"#;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let creds = Credentials::load(file.path()).unwrap();
        assert_eq!(creds.server, "https://mds.test.datacite.org");
        assert_eq!(creds.username, "ISI.ATLAS");
        assert_eq!(creds.prefix, "10.25548");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Credentials::load("/nonexistent/datacite.json").unwrap_err();
        assert!(matches!(err, DataciteError::Io { .. }));
    }

    #[test]
    fn test_missing_field_rejected() {
        let err = Credentials::from_json(
            r#"{"server": "https://mds.datacite.org", "username": "u", "password": "p"}"#,
            Path::new("creds.json"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("prefix"));
    }

    #[test]
    fn test_server_must_be_url() {
        let err = Credentials::new("mds.datacite.org", "u", "p", "10.1").unwrap_err();
        assert!(matches!(err, DataciteError::Credentials { .. }));
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = Credentials::from_json(SAMPLE, Path::new("creds.json")).unwrap();
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("10.25548"));
    }
}
