//! Hatrac object store access

use std::path::Path;

use atlas_http::{Auth, HttpClient, HttpRequest, Transport};

use crate::error::{PipelineError, Result};

/// Fetches stored objects to local files
pub trait ObjectStore {
    /// Download the object at `uri` (a Hatrac path or absolute URL) to
    /// `dest`, returning the number of bytes written
    fn get_obj(&self, uri: &str, dest: &Path) -> Result<u64>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
    fn get_obj(&self, uri: &str, dest: &Path) -> Result<u64> {
        (**self).get_obj(uri, dest)
    }
}

pub struct HatracStore<T: Transport = HttpClient> {
    transport: T,
    host: String,
    auth: Option<Auth>,
}

impl<T: Transport> HatracStore<T> {
    pub fn new(transport: T, host: impl Into<String>) -> Self {
        Self {
            transport,
            host: host.into(),
            auth: None,
        }
    }

    pub fn with_auth(mut self, auth: Option<Auth>) -> Self {
        self.auth = auth;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Absolute URLs pass through; paths are resolved against the host
    pub fn object_url(&self, uri: &str) -> String {
        if uri.starts_with("https://") || uri.starts_with("http://") {
            uri.to_string()
        } else {
            format!("https://{}{}", self.host, uri)
        }
    }
}

impl<T: Transport> ObjectStore for HatracStore<T> {
    fn get_obj(&self, uri: &str, dest: &Path) -> Result<u64> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(PipelineError::io(parent))?;
        }

        let url = self.object_url(uri);
        let mut request = HttpRequest::get(&url);
        if let Some(auth) = &self.auth {
            request = request.with_auth(auth.clone());
        }

        let bytes = self.transport.download(request, dest)?;
        tracing::debug!("GET {}: {} bytes -> {}", url, bytes, dest.display());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_http::testing::ScriptedTransport;
    use atlas_http::HttpError;

    #[test]
    fn test_object_url() {
        let store = HatracStore::new(ScriptedTransport::new(), "dev.atlas-d2k.org");
        assert_eq!(
            store.object_url("/hatrac/resources/rnaseq/a_R1.fastq.gz:ABC"),
            "https://dev.atlas-d2k.org/hatrac/resources/rnaseq/a_R1.fastq.gz:ABC"
        );
        assert_eq!(
            store.object_url("https://www.gudmap.org/hatrac/x"),
            "https://www.gudmap.org/hatrac/x"
        );
    }

    #[test]
    fn test_get_obj_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("a_R1.fastq.gz");

        let store = HatracStore::new(ScriptedTransport::new(), "dev.atlas-d2k.org")
            .with_auth(Some(Auth::Cookie("webauthn=abc".into())));
        store.transport().push_status(200, "@read\nACGT\n");

        let bytes = store.get_obj("/hatrac/a_R1.fastq.gz", &dest).unwrap();
        assert_eq!(bytes, 11);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "@read\nACGT\n");
        assert_eq!(
            store.transport().last_request().unwrap().auth,
            Some(Auth::Cookie("webauthn=abc".into()))
        );
    }

    #[test]
    fn test_get_obj_missing_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = HatracStore::new(ScriptedTransport::new(), "dev.atlas-d2k.org");
        store.transport().push_status(404, "not found");

        let err = store
            .get_obj("/hatrac/missing", &dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Http(HttpError::Status { status: 404, .. })
        ));
    }
}
