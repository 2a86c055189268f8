//! HTTP client abstraction for the ATLAS-D2K service clients
//!
//! Every remote service this workspace talks to (DataCite MDS, ERMrest,
//! Hatrac) goes through the [`Transport`] trait. The production
//! implementation is [`HttpClient`], a thin wrapper over a blocking reqwest
//! client; tests substitute a scripted transport.

pub mod native;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use native::HttpClient;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {message}")]
    RequestFailed { message: String },
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
    #[error("Timeout")]
    Timeout,
    #[error("Parse error: {message}")]
    ParseError { message: String },
    #[error("Unexpected status code: {status} {body}")]
    Status { status: u16, body: String },
    #[error("I/O error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// Credentials attached to a request
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    Basic { username: String, password: String },
    /// Raw `Cookie` header value, e.g. `webauthn=...`
    Cookie(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Auth::Cookie(_) => f.debug_tuple("Cookie").field(&"***").finish(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub auth: Option<Auth>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            auth: None,
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::Post, url).with_body(body)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, lossy
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    /// Any 2xx status
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// A blocking request/response channel to a remote service
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;

    /// Fetch a resource into `dest`, returning the number of bytes written.
    ///
    /// The default buffers the whole body through [`Transport::execute`];
    /// [`HttpClient`] streams instead.
    fn download(&self, request: HttpRequest, dest: &Path) -> Result<u64, HttpError> {
        let response = self.execute(request)?;
        if !response.is_success() {
            return Err(HttpError::Status {
                status: response.status,
                body: response.body,
            });
        }
        std::fs::write(dest, response.body.as_bytes()).map_err(|e| HttpError::Io {
            path: dest.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(response.body.len() as u64)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        (**self).execute(request)
    }

    fn download(&self, request: HttpRequest, dest: &Path) -> Result<u64, HttpError> {
        (**self).download(request, dest)
    }
}
