//! Error types for atlas-pipelines

use std::path::PathBuf;

use atlas_http::HttpError;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Transport-level failure talking to ERMrest or Hatrac
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Non-2xx answer from the catalog
    #[error("Catalog request {url} failed: {status} {body}")]
    Catalog {
        url: String,
        status: u16,
        body: String,
    },

    /// Catalog answered with something other than a JSON row list
    #[error("Malformed catalog response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    /// Query matched no rows where one was required
    #[error("Not found: {0}")]
    NotFound(String),

    /// A row lacks a column the pipeline relies on
    #[error("Row is missing column {column}")]
    MissingColumn { column: &'static str },

    /// A catalog value that would not stay inside the replicate tree
    #[error("Refusing file name {name:?}: not a single path component")]
    UnsafeFileName { name: String },

    #[error("Invalid config in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("Invalid credential file {}: {message}", .path.display())]
    Credentials { path: PathBuf, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| PipelineError::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = PipelineError::Catalog {
            url: "https://dev.atlas-d2k.org/ermrest/catalog/2/entity/RNASeq:File".into(),
            status: 403,
            body: "Forbidden".into(),
        };
        assert_eq!(
            err.to_string(),
            "Catalog request https://dev.atlas-d2k.org/ermrest/catalog/2/entity/RNASeq:File failed: 403 Forbidden"
        );

        let err = PipelineError::MissingColumn { column: "URI" };
        assert_eq!(err.to_string(), "Row is missing column URI");

        let err = PipelineError::UnsafeFileName {
            name: "../x_R1.fastq.gz".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"Refusing file name "../x_R1.fastq.gz": not a single path component"#
        );
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let err = PipelineError::io("/scratch/scrna")(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(err.to_string().starts_with("I/O error on /scratch/scrna"));
    }
}
