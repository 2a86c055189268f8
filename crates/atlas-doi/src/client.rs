//! DataCite Metadata Store (MDS) client
//!
//! API docs: https://support.datacite.org/docs/mds-api-guide
//!
//! DOIs exist in three states. A DOI is a *draft* once metadata has been
//! registered, becomes *findable* when a URL is registered, and drops to
//! *registered* when its metadata is removed from the search index.
//! Registered DOIs stay in the global handle system but are not indexed in
//! DataCite Search. Only drafts can be deleted.

use std::fmt;
use std::path::Path;

use atlas_http::{HttpClient, HttpRequest, HttpResponse, Transport};

use crate::credentials::Credentials;
use crate::error::{DataciteError, Result};
use crate::status::{check, Operation, RequestContext};

/// Number of random suffixes tried before giving up
pub const MAX_SUFFIX_TRIALS: usize = 100;

const TEXT_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";
const XML_CONTENT_TYPE: &str = "application/xml;charset=UTF-8";

/// RFC 4648 base-32 alphabet
const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// DOI lifecycle states as defined by DataCite
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoiState {
    Draft,
    Findable,
    Registered,
}

impl DoiState {
    /// State a DOI is left in after a successful update, if the update
    /// determines it. Posting metadata alone does not: it creates a draft
    /// or brings a registered DOI back to findable.
    pub fn after(op: Operation) -> Option<DoiState> {
        match op {
            Operation::SetDoiUrl => Some(DoiState::Findable),
            Operation::DeleteDoiMetadataIndex => Some(DoiState::Registered),
            _ => None,
        }
    }
}

impl fmt::Display for DoiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DoiState::Draft => "draft",
            DoiState::Findable => "findable",
            DoiState::Registered => "registered",
        })
    }
}

pub struct DataCiteMds<T: Transport = HttpClient> {
    transport: T,
    credentials: Credentials,
}

impl DataCiteMds<HttpClient> {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Ok(Self::with_transport(
            credentials,
            HttpClient::with_default_agent()?,
        ))
    }

    /// Build a client from a JSON credential file
    pub fn from_credential_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(Credentials::load(path)?)
    }
}

impl<T: Transport> DataCiteMds<T> {
    pub fn with_transport(credentials: Credentials, transport: T) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.credentials.prefix
    }

    pub fn server(&self) -> &str {
        &self.credentials.server
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.credentials.server, path)
    }

    fn send(&self, op: Operation, request: HttpRequest) -> Result<HttpResponse> {
        let request = request.with_auth(self.credentials.auth());
        let response = self.transport.execute(request)?;
        tracing::debug!(
            "{}: {} {}",
            op.name(),
            response.status,
            response.body.trim_end()
        );
        Ok(response)
    }

    /// List all DOIs of the account, one per line.
    ///
    /// The test MDS server does not list test DOIs.
    pub fn get_all_dois(&self) -> Result<String> {
        let endpoint = self.endpoint("/doi");
        let response = self.send(Operation::GetAllDois, HttpRequest::get(&endpoint))?;
        check(
            Operation::GetAllDois,
            &RequestContext::new(endpoint),
            response,
        )
    }

    /// URL registered for `doi`
    pub fn get_doi_url(&self, doi: &str) -> Result<String> {
        let endpoint = self.endpoint(&format!("/doi/{}", doi));
        let response = self.send(Operation::GetDoiUrl, HttpRequest::get(&endpoint))?;
        check(
            Operation::GetDoiUrl,
            &RequestContext::new(endpoint).with_doi(doi),
            response,
        )
    }

    /// Raw XML metadata registered for `doi`
    pub fn get_doi_metadata(&self, doi: &str) -> Result<String> {
        let endpoint = self.endpoint(&format!("/metadata/{}", doi));
        let response = self.send(
            Operation::GetDoiMetadata,
            HttpRequest::get(&endpoint).with_header("Accept", "application/xml"),
        )?;
        check(
            Operation::GetDoiMetadata,
            &RequestContext::new(endpoint).with_doi(doi),
            response,
        )
    }

    /// Find a random `XXXX-XXXX` suffix that is not yet registered.
    ///
    /// A `NotFound` lookup means the suffix is free. Any other outcome skips
    /// the candidate; after [`MAX_SUFFIX_TRIALS`] candidates the
    /// namespace is considered exhausted.
    pub fn get_unused_suffix(&self) -> Result<String> {
        for trial in 1..=MAX_SUFFIX_TRIALS {
            let suffix = random_suffix();
            let doi = self.compose_doi(&suffix);
            match self.get_doi_url(&doi) {
                Err(DataciteError::NotFound { .. }) => {
                    tracing::debug!("Suffix {} is free after {} trial(s)", suffix, trial);
                    return Ok(suffix);
                }
                Ok(_) => {
                    tracing::debug!("Suffix {} already registered", suffix);
                }
                Err(e) => {
                    tracing::warn!(
                        "Problems while checking unused DOI {} under prefix {}: {}. Skipping it.",
                        doi,
                        self.prefix(),
                        e
                    );
                }
            }
        }

        Err(DataciteError::DoiNamespaceExhausted {
            prefix: self.prefix().to_string(),
            attempts: MAX_SUFFIX_TRIALS,
        })
    }

    /// Random unused DOI under the account prefix
    pub fn get_unused_doi(&self) -> Result<String> {
        Ok(self.compose_doi(&self.get_unused_suffix()?))
    }

    /// `prefix/suffix`
    pub fn compose_doi(&self, suffix: &str) -> String {
        format!("{}/{}", self.credentials.prefix, suffix)
    }

    /// `https://doi.org/prefix/suffix`
    pub fn doi_resolver_url(&self, suffix: &str) -> String {
        format!("https://doi.org/{}", self.compose_doi(suffix))
    }

    /// Create or update a DOI from a metadata file.
    ///
    /// This only uploads metadata, leaving the DOI in the draft state; call
    /// [`DataCiteMds::set_doi_url`] to make it findable.
    pub fn register_doi(&self, doi: &str, metadata_file: impl AsRef<Path>) -> Result<bool> {
        tracing::info!("Registering metadata for {}", doi);
        self.set_doi_metadata_file(metadata_file)
    }

    /// Register or update the landing page of `doi`.
    ///
    /// Metadata must already exist for the DOI.
    pub fn set_doi_url(&self, doi: &str, url: &str) -> Result<bool> {
        let endpoint = self.endpoint("/doi");
        let body = format!("doi={}\nurl={}", doi, url);
        let request =
            HttpRequest::post(&endpoint, body).with_header("Content-Type", TEXT_CONTENT_TYPE);
        let response = self.send(Operation::SetDoiUrl, request)?;
        check(
            Operation::SetDoiUrl,
            &RequestContext::new(endpoint).with_doi(doi).with_url(url),
            response,
        )?;
        log_state(Operation::SetDoiUrl, doi);
        tracing::info!("Set URL of {} to {}", doi, url);
        Ok(true)
    }

    /// Create or update metadata. The XML must carry the DOI identifier.
    pub fn set_doi_metadata(&self, xml: &str) -> Result<bool> {
        let endpoint = self.endpoint("/metadata");
        let request = HttpRequest::post(&endpoint, xml.as_bytes().to_vec())
            .with_header("Content-Type", XML_CONTENT_TYPE);
        let response = self.send(Operation::SetDoiMetadata, request)?;
        check(
            Operation::SetDoiMetadata,
            &RequestContext::new(endpoint),
            response,
        )?;
        Ok(true)
    }

    pub fn set_doi_metadata_file(&self, metadata_file: impl AsRef<Path>) -> Result<bool> {
        let path = metadata_file.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|source| DataciteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.set_doi_metadata(&xml)
    }

    /// Remove `doi` from the search index, demoting a findable DOI to registered.
    ///
    /// Posting new metadata makes it findable again.
    pub fn delete_doi_metadata_index(&self, doi: &str) -> Result<bool> {
        let endpoint = self.endpoint(&format!("/metadata/{}", doi));
        let response = self.send(
            Operation::DeleteDoiMetadataIndex,
            HttpRequest::delete(&endpoint),
        )?;
        check(
            Operation::DeleteDoiMetadataIndex,
            &RequestContext::new(endpoint).with_doi(doi),
            response,
        )?;
        log_state(Operation::DeleteDoiMetadataIndex, doi);
        tracing::info!("Removed {} from the search index", doi);
        Ok(true)
    }

    /// Delete a draft DOI. Findable and registered DOIs are rejected with
    /// [`DataciteError::MethodNotAllowed`].
    pub fn delete_doi(&self, doi: &str) -> Result<bool> {
        let endpoint = self.endpoint(&format!("/doi/{}", doi));
        let response = self.send(Operation::DeleteDoi, HttpRequest::delete(&endpoint))?;
        check(
            Operation::DeleteDoi,
            &RequestContext::new(endpoint).with_doi(doi),
            response,
        )?;
        tracing::info!("Deleted {} DOI {}", DoiState::Draft, doi);
        Ok(true)
    }
}

fn log_state(op: Operation, doi: &str) {
    if let Some(state) = DoiState::after(op) {
        tracing::debug!("{} is now {}", doi, state);
    }
}

/// Eight base-32 characters from 40 random bits, split as `XXXX-XXXX`
pub fn random_suffix() -> String {
    let uuid = uuid::Uuid::new_v4();
    let mut bytes = [0u8; 5];
    bytes.copy_from_slice(&uuid.as_bytes()[..5]);
    let encoded = encode_base32_40(bytes);
    format!("{}-{}", &encoded[..4], &encoded[4..])
}

/// Base-32 encode exactly five bytes (no padding needed)
fn encode_base32_40(bytes: [u8; 5]) -> String {
    let bits = bytes
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    (0..8)
        .rev()
        .map(|i| BASE32_ALPHABET[((bits >> (i * 5)) & 0x1f) as usize] as char)
        .collect()
}
