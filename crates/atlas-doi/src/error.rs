//! Error types for atlas-doi

use std::path::PathBuf;

use atlas_http::HttpError;
use thiserror::Error;

/// Result type alias for DataCite operations
pub type Result<T> = std::result::Result<T, DataciteError>;

/// Errors raised by the MDS client, the metadata builder and the orchestration helpers
#[derive(Error, Debug)]
pub enum DataciteError {
    /// HTTP 404 from any endpoint
    #[error("NOT FOUND: {endpoint}{}: {status} {body}", about(.doi))]
    NotFound {
        endpoint: String,
        doi: Option<String>,
        status: u16,
        body: String,
    },

    /// HTTP 204: the DOI exists but carries no metadata
    #[error("{doi} has no metadata content: {status} {body}")]
    NoContent {
        doi: String,
        status: u16,
        body: String,
    },

    /// HTTP 422: invalid XML or schema violation
    #[error("{reason}{}: {status} {body}", about(.doi))]
    UnprocessableEntity {
        reason: &'static str,
        doi: Option<String>,
        status: u16,
        body: String,
    },

    #[error("Unable to set DOI URL ({doi}, {url}): {status} {body}{}", explain(.reason))]
    SetUrl {
        doi: String,
        url: String,
        status: u16,
        body: String,
        reason: Option<&'static str>,
    },

    #[error("Unable to set DOI metadata: {status} {body}")]
    SetMetadata { status: u16, body: String },

    #[error("Unable to delete {target}: {status} {body}")]
    DeleteMetadata {
        target: String,
        status: u16,
        body: String,
    },

    /// HTTP 405 on DOI deletion: only draft DOIs can be deleted
    #[error("Unable to delete non-draft DOI {doi} (DOI with assigned URL): {status} {body}")]
    MethodNotAllowed {
        doi: String,
        status: u16,
        body: String,
    },

    #[error("Can't generate an unused DOI for prefix {prefix} after {attempts} attempts")]
    DoiNamespaceExhausted { prefix: String, attempts: usize },

    #[error("Unexpected status code from {endpoint}: {status} {body}")]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Invalid credentials in {}: {message}", .path.display())]
    Credentials { path: PathBuf, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing results to the caller's sink failed
    #[error("Unable to write output: {0}")]
    Output(#[source] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    /// Dataset descriptor failed local validation; nothing was sent
    #[error("Invalid dataset: {0}")]
    Validation(String),
}

fn about(doi: &Option<String>) -> String {
    doi.as_ref().map(|d| format!(" ({})", d)).unwrap_or_default()
}

fn explain(reason: &Option<&'static str>) -> String {
    reason.map(|r| format!(". {}", r)).unwrap_or_default()
}

impl DataciteError {
    /// Failures to create, update or delete registry state
    pub fn is_update_error(&self) -> bool {
        matches!(
            self,
            DataciteError::SetUrl { .. }
                | DataciteError::SetMetadata { .. }
                | DataciteError::DeleteMetadata { .. }
                | DataciteError::MethodNotAllowed { .. }
        )
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            DataciteError::NotFound { status, .. }
            | DataciteError::NoContent { status, .. }
            | DataciteError::UnprocessableEntity { status, .. }
            | DataciteError::SetUrl { status, .. }
            | DataciteError::SetMetadata { status, .. }
            | DataciteError::DeleteMetadata { status, .. }
            | DataciteError::MethodNotAllowed { status, .. }
            | DataciteError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for DataciteError {
    fn from(e: quick_xml::Error) -> Self {
        DataciteError::Xml(e.to_string())
    }
}
