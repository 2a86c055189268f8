//! atlas-doi: DOI registration for ATLAS-D2K datasets
//!
//! This library provides:
//! - A blocking client for the DataCite Metadata Store (MDS) API
//! - A DataCite kernel-4 XML metadata builder
//! - Dataset descriptors and the consortium project table
//! - Orchestration helpers to create, print and delete DOIs

pub mod client;
pub mod credentials;
pub mod dataset;
pub mod error;
pub mod metadata;
pub mod ops;
pub mod projects;
pub mod status;

pub use client::{random_suffix, DataCiteMds, DoiState, MAX_SUFFIX_TRIALS};
pub use credentials::Credentials;
pub use dataset::{Creator, Dataset, FundingReference};
pub use error::{DataciteError, Result};
pub use metadata::{build_resource, parse_resource, DataCiteXmlMetadata, Element};
pub use ops::{create_new_doi, delete_doi, print_all_dois, print_doi};
pub use projects::{project, Project, PROJECTS};
