//! atlas-pipelines: ATLAS-D2K data pipelines
//!
//! Pipelines talk to a Deriva deployment through two seams, [`Catalog`]
//! for ERMrest entity queries and [`ObjectStore`] for Hatrac downloads, so
//! each step can run against in-memory fakes.

pub mod catalog;
pub mod config;
pub mod context;
pub mod credential;
pub mod error;
pub mod replicate;
pub mod store;

pub use catalog::{Catalog, ErmrestCatalog, Row};
pub use config::{Environment, PipelineConfig};
pub use context::ClientContext;
pub use credential::DerivaCredentials;
pub use error::{PipelineError, Result};
pub use replicate::{get_experiment_settings, prepare_replicate_files, ReplicateLayout};
pub use store::{HatracStore, ObjectStore};
