//! Shared helpers for atlas-doi integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use atlas_doi::{Credentials, DataCiteMds};
use atlas_http::testing::ScriptedTransport;

pub const SERVER: &str = "https://mds.test.datacite.org";
pub const PREFIX: &str = "10.25548";

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

pub fn credentials() -> Credentials {
    Credentials::new(SERVER, "ISI.ATLAS", "secret", PREFIX).unwrap()
}

/// Client over a scripted transport with no canned responses yet
pub fn scripted_client() -> DataCiteMds<ScriptedTransport> {
    DataCiteMds::with_transport(credentials(), ScriptedTransport::new())
}

/// Client that answers every request beyond the script with `status`
pub fn client_with_fallback(status: u16, body: &str) -> DataCiteMds<ScriptedTransport> {
    DataCiteMds::with_transport(
        credentials(),
        ScriptedTransport::new().with_fallback(atlas_http::HttpResponse::new(status, body)),
    )
}
