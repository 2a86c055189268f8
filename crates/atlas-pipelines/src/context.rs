//! Deriva client context (`dcctx`)
//!
//! Every catalog request carries a `deriva-client-context` header naming the
//! kind of client that made it, so audit logs can tell pipelines from people.

use serde::Serialize;

pub const CLIENT_CONTEXT_HEADER: &str = "deriva-client-context";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientContext {
    Model,
    Acl,
    Annotation,
    Comment,
    Pipeline,
    PipelineImage,
    PipelineScRnaSeq,
    PipelineMRnaSeq,
    /// Spatial transcriptomics
    PipelineSpatial,
    /// Obsolete
    PipelineNoid,
    Cli,
    CliRead,
    CliTest,
    CliIngest,
}

#[derive(Serialize)]
struct Dcctx<'a> {
    cid: &'a str,
}

impl ClientContext {
    /// The `cid` value
    pub fn cid(&self) -> &'static str {
        match self {
            ClientContext::Model => "model/change",
            ClientContext::Acl => "config/acl",
            ClientContext::Annotation => "config/anno",
            ClientContext::Comment => "config/comment",
            ClientContext::Pipeline => "pipeline",
            ClientContext::PipelineImage => "pipeline/image",
            ClientContext::PipelineScRnaSeq => "pipeline/seq/scrna",
            ClientContext::PipelineMRnaSeq => "pipeline/seq/mrna",
            ClientContext::PipelineSpatial => "pipeline/seq/st",
            ClientContext::PipelineNoid => "pipeline/noid",
            ClientContext::Cli => "cli",
            ClientContext::CliRead => "cli/read",
            ClientContext::CliTest => "cli/test",
            ClientContext::CliIngest => "cli/ingest",
        }
    }

    /// Percent-encoded compact JSON, as sent in the header
    pub fn header_value(&self) -> String {
        let json = serde_json::to_string(&Dcctx { cid: self.cid() })
            .unwrap_or_else(|_| format!("{{\"cid\":\"{}\"}}", self.cid()));
        urlencoding::encode(&json).into_owned()
    }
}
