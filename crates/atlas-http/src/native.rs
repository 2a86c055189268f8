//! Native HTTP client using reqwest

use super::{Auth, HttpError, HttpRequest, HttpResponse, Method, Transport};
use reqwest::blocking::{Client, RequestBuilder};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("atlas-d2k/", env!("CARGO_PKG_VERSION"));

pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HttpError::RequestFailed {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
        })
    }

    pub fn with_default_agent() -> Result<Self, HttpError> {
        Self::new(DEFAULT_USER_AGENT)
    }

    fn prepare(&self, request: HttpRequest) -> RequestBuilder {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .header("User-Agent", &self.user_agent);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.auth {
            Some(Auth::Basic { username, password }) => builder.basic_auth(username, Some(password)),
            Some(Auth::Cookie(cookie)) => builder.header("Cookie", cookie),
            None => builder,
        };

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        builder
    }

    fn send(&self, request: HttpRequest) -> Result<reqwest::blocking::Response, HttpError> {
        if reqwest::Url::parse(&request.url).is_err() {
            return Err(HttpError::InvalidUrl { url: request.url });
        }

        tracing::debug!("{} {}", request.method.as_str(), request.url);

        self.prepare(request).send().map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::RequestFailed {
                    message: e.to_string(),
                }
            }
        })
    }
}

impl Transport for HttpClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = self.send(request)?;

        let status = response.status().as_u16();

        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();

        let body = response.text().map_err(|e| HttpError::ParseError {
            message: e.to_string(),
        })?;

        Ok(HttpResponse {
            status,
            body,
            headers,
        })
    }

    fn download(&self, request: HttpRequest, dest: &Path) -> Result<u64, HttpError> {
        let mut response = self.send(request)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(HttpError::Status { status, body });
        }

        let io_error = |e: std::io::Error| HttpError::Io {
            path: dest.to_path_buf(),
            message: e.to_string(),
        };
        let mut file = std::fs::File::create(dest).map_err(io_error)?;
        response
            .copy_to(&mut file)
            .map_err(|e| HttpError::RequestFailed {
                message: e.to_string(),
            })
    }
}
