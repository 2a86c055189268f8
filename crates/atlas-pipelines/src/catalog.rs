//! ERMrest catalog access

use atlas_http::{Auth, HttpClient, HttpRequest, Transport};
use serde_json::{Map, Value};

use crate::context::{ClientContext, CLIENT_CONTEXT_HEADER};
use crate::error::{PipelineError, Result};

/// One entity as returned by the ERMrest entity API
pub type Row = Map<String, Value>;

/// Read access to catalog tables
pub trait Catalog {
    /// Rows of `schema:table` matching `constraints`, an already-quoted
    /// ERMrest path suffix such as `RID=16-2PS4` (empty for all rows)
    fn get_entities(&self, schema: &str, table: &str, constraints: &str) -> Result<Vec<Row>>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn get_entities(&self, schema: &str, table: &str, constraints: &str) -> Result<Vec<Row>> {
        (**self).get_entities(schema, table, constraints)
    }
}

pub struct ErmrestCatalog<T: Transport = HttpClient> {
    transport: T,
    host: String,
    catalog_id: String,
    auth: Option<Auth>,
    context: ClientContext,
}

impl<T: Transport> ErmrestCatalog<T> {
    pub fn new(transport: T, host: impl Into<String>, catalog_id: impl Into<String>) -> Self {
        Self {
            transport,
            host: host.into(),
            catalog_id: catalog_id.into(),
            auth: None,
            context: ClientContext::Cli,
        }
    }

    pub fn with_auth(mut self, auth: Option<Auth>) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_context(mut self, context: ClientContext) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> ClientContext {
        self.context
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> String {
        format!("https://{}/ermrest/catalog/{}", self.host, self.catalog_id)
    }

    /// `<base>/entity/<schema>:<table>[/<constraints>]`
    pub fn entity_url(&self, schema: &str, table: &str, constraints: &str) -> String {
        let mut url = format!(
            "{}/entity/{}:{}",
            self.base_url(),
            urlencoding::encode(schema),
            urlencoding::encode(table)
        );
        if !constraints.is_empty() {
            url.push('/');
            url.push_str(constraints);
        }
        url
    }
}

impl<T: Transport> Catalog for ErmrestCatalog<T> {
    fn get_entities(&self, schema: &str, table: &str, constraints: &str) -> Result<Vec<Row>> {
        let url = self.entity_url(schema, table, constraints);
        let mut request = HttpRequest::get(&url)
            .with_header("Accept", "application/json")
            .with_header(CLIENT_CONTEXT_HEADER, self.context.header_value());
        if let Some(auth) = &self.auth {
            request = request.with_auth(auth.clone());
        }

        let response = self.transport.execute(request)?;
        tracing::debug!("GET {}: {}", url, response.status);
        if !response.is_success() {
            return Err(PipelineError::Catalog {
                url,
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body)
            .map_err(|e| PipelineError::MalformedResponse {
                url,
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_http::testing::ScriptedTransport;

    fn catalog() -> ErmrestCatalog<ScriptedTransport> {
        ErmrestCatalog::new(ScriptedTransport::new(), "dev.atlas-d2k.org", "2")
            .with_context(ClientContext::PipelineScRnaSeq)
            .with_auth(Some(Auth::Cookie("webauthn=abc".into())))
    }

    #[test]
    fn test_entity_url() {
        let catalog = catalog();
        assert_eq!(
            catalog.entity_url("RNASeq", "File", "Replicate_RID=16-2PS4"),
            "https://dev.atlas-d2k.org/ermrest/catalog/2/entity/RNASeq:File/Replicate_RID=16-2PS4"
        );
        assert_eq!(
            catalog.entity_url("Common", "Collection", ""),
            "https://dev.atlas-d2k.org/ermrest/catalog/2/entity/Common:Collection"
        );
    }

    #[test]
    fn test_get_entities_sends_context_and_cookie() {
        let catalog = catalog();
        catalog
            .transport()
            .push_status(200, r#"[{"RID": "1-ABC", "File_Name": "a_R1.fastq.gz"}]"#);

        let rows = catalog.get_entities("RNASeq", "File", "RID=1-ABC").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["File_Name"], "a_R1.fastq.gz");

        let request = catalog.transport().last_request().unwrap();
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(
            request.header(CLIENT_CONTEXT_HEADER),
            Some(ClientContext::PipelineScRnaSeq.header_value().as_str())
        );
        assert_eq!(request.auth, Some(Auth::Cookie("webauthn=abc".into())));
    }

    #[test]
    fn test_error_status() {
        let catalog = catalog();
        catalog.transport().push_status(409, "conflict");
        let err = catalog.get_entities("RNASeq", "File", "").unwrap_err();
        assert!(matches!(err, PipelineError::Catalog { status: 409, .. }));
    }

    #[test]
    fn test_non_list_body() {
        let catalog = catalog();
        catalog.transport().push_status(200, "<html/>");
        let err = catalog.get_entities("RNASeq", "File", "").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedResponse { .. }));
    }
}
