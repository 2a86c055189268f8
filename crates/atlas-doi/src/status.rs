//! HTTP status → outcome tables for every MDS operation
//!
//! Each operation owns one ordered rule list; the first matching rule wins.
//! Every list ends with a catch-all so evaluation is total.

use atlas_http::HttpResponse;

use crate::error::DataciteError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusMatch {
    /// 200..=299
    Success,
    Exact(u16),
    Any,
}

impl StatusMatch {
    pub fn matches(&self, status: u16) -> bool {
        match self {
            StatusMatch::Success => (200..=299).contains(&status),
            StatusMatch::Exact(code) => *code == status,
            StatusMatch::Any => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    NotFound,
    NoContent,
    UnprocessableEntity(&'static str),
    SetUrl(Option<&'static str>),
    SetMetadata,
    DeleteMetadata,
    MethodNotAllowed,
    Unexpected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(Failure),
}

#[derive(Clone, Copy, Debug)]
pub struct StatusRule {
    pub when: StatusMatch,
    pub verdict: Verdict,
}

const fn rule(when: StatusMatch, verdict: Verdict) -> StatusRule {
    StatusRule { when, verdict }
}

use Failure::*;
use StatusMatch::*;
use Verdict::*;

pub const SET_URL_BAD_REQUEST: &str =
    "400 Bad Request: request body must be exactly two lines: DOI and URL; wrong domain; wrong prefix";
pub const SET_URL_PRECONDITION: &str = "Precondition failed: metadata must be uploaded first";
pub const SET_URL_TAKEN: &str = "Bad DOI (422 This doi has already been taken)";

const GET_ALL_DOIS: &[StatusRule] = &[
    rule(Success, Accept),
    rule(Exact(404), Reject(NotFound)),
    rule(Any, Reject(Unexpected)),
];

const GET_DOI_URL: &[StatusRule] = &[
    rule(Exact(200), Accept),
    rule(Exact(204), Reject(NoContent)),
    rule(Exact(404), Reject(NotFound)),
    rule(Any, Reject(Unexpected)),
];

const GET_DOI_METADATA: &[StatusRule] = &[
    rule(Exact(200), Accept),
    rule(Exact(204), Reject(NoContent)),
    rule(Exact(404), Reject(NotFound)),
    rule(
        Exact(422),
        Reject(UnprocessableEntity(
            "Metadata failed validation against the DataCite schema",
        )),
    ),
    rule(Any, Reject(Unexpected)),
];

const SET_DOI_URL: &[StatusRule] = &[
    rule(Success, Accept),
    rule(Exact(400), Reject(SetUrl(Some(SET_URL_BAD_REQUEST)))),
    rule(Exact(412), Reject(SetUrl(Some(SET_URL_PRECONDITION)))),
    rule(Exact(422), Reject(SetUrl(Some(SET_URL_TAKEN)))),
    rule(Any, Reject(SetUrl(None))),
];

const SET_DOI_METADATA: &[StatusRule] = &[
    rule(Success, Accept),
    rule(Exact(422), Reject(UnprocessableEntity("Invalid XML"))),
    rule(Any, Reject(SetMetadata)),
];

const DELETE_DOI_METADATA_INDEX: &[StatusRule] = &[
    rule(Success, Accept),
    rule(Any, Reject(DeleteMetadata)),
];

const DELETE_DOI: &[StatusRule] = &[
    rule(Success, Accept),
    rule(Exact(405), Reject(MethodNotAllowed)),
    rule(Any, Reject(DeleteMetadata)),
];

/// MDS operations with a status table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    GetAllDois,
    GetDoiUrl,
    GetDoiMetadata,
    SetDoiUrl,
    SetDoiMetadata,
    DeleteDoiMetadataIndex,
    DeleteDoi,
}

impl Operation {
    pub fn rules(&self) -> &'static [StatusRule] {
        match self {
            Operation::GetAllDois => GET_ALL_DOIS,
            Operation::GetDoiUrl => GET_DOI_URL,
            Operation::GetDoiMetadata => GET_DOI_METADATA,
            Operation::SetDoiUrl => SET_DOI_URL,
            Operation::SetDoiMetadata => SET_DOI_METADATA,
            Operation::DeleteDoiMetadataIndex => DELETE_DOI_METADATA_INDEX,
            Operation::DeleteDoi => DELETE_DOI,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::GetAllDois => "get_all_dois",
            Operation::GetDoiUrl => "get_doi_url",
            Operation::GetDoiMetadata => "get_doi_metadata",
            Operation::SetDoiUrl => "set_doi_url",
            Operation::SetDoiMetadata => "set_doi_metadata",
            Operation::DeleteDoiMetadataIndex => "delete_doi_metadata_index",
            Operation::DeleteDoi => "delete_doi",
        }
    }

    /// First matching verdict for `status`
    pub fn evaluate(&self, status: u16) -> Verdict {
        self.rules()
            .iter()
            .find(|r| r.when.matches(status))
            .map(|r| r.verdict)
            .unwrap_or(Reject(Unexpected))
    }
}

/// What the request was about, for error messages
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub endpoint: String,
    pub doi: Option<String>,
    pub url: Option<String>,
}

impl RequestContext {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_doi(mut self, doi: &str) -> Self {
        self.doi = Some(doi.to_string());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }
}

impl Failure {
    pub fn into_error(self, ctx: &RequestContext, response: HttpResponse) -> DataciteError {
        let doi = ctx.doi.clone().unwrap_or_default();
        let HttpResponse { status, body, .. } = response;
        match self {
            NotFound => DataciteError::NotFound {
                endpoint: ctx.endpoint.clone(),
                doi: ctx.doi.clone(),
                status,
                body,
            },
            NoContent => DataciteError::NoContent { doi, status, body },
            UnprocessableEntity(reason) => DataciteError::UnprocessableEntity {
                reason,
                doi: ctx.doi.clone(),
                status,
                body,
            },
            SetUrl(reason) => DataciteError::SetUrl {
                doi,
                url: ctx.url.clone().unwrap_or_default(),
                status,
                body,
                reason,
            },
            SetMetadata => DataciteError::SetMetadata { status, body },
            DeleteMetadata => DataciteError::DeleteMetadata {
                target: if ctx.endpoint.contains("/metadata/") {
                    format!("DOI metadata {}", doi)
                } else {
                    format!("DOI {}", doi)
                },
                status,
                body,
            },
            MethodNotAllowed => DataciteError::MethodNotAllowed { doi, status, body },
            Unexpected => DataciteError::UnexpectedStatus {
                endpoint: ctx.endpoint.clone(),
                status,
                body,
            },
        }
    }
}

/// Map a response through the operation's table
pub fn check(
    op: Operation,
    ctx: &RequestContext,
    response: HttpResponse,
) -> Result<String, DataciteError> {
    match op.evaluate(response.status) {
        Accept => Ok(response.body),
        Reject(failure) => Err(failure.into_error(ctx, response)),
    }
}
