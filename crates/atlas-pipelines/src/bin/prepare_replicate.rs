//! prepare-replicate: stage an scRNA-Seq replicate's FASTQ files on scratch
//!
//! ```text
//! prepare-replicate --host dev.atlas-d2k.org --scratch /scratch/scrna --replicate 16-2PS4
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use atlas_http::HttpClient;
use atlas_pipelines::{
    get_experiment_settings, prepare_replicate_files, ClientContext, DerivaCredentials,
    ErmrestCatalog, HatracStore, PipelineConfig,
};

#[derive(Parser, Debug)]
#[command(name = "prepare-replicate", version, about = "ATLAS-D2K replicate preparation")]
struct Args {
    /// Replicate RID
    #[arg(long, value_name = "RID")]
    replicate: String,

    /// Fully qualified hostname (default dev.atlas-d2k.org)
    #[arg(long)]
    host: Option<String>,

    /// Deriva catalog ID (default 2)
    #[arg(long, value_name = "ID")]
    catalog_id: Option<String>,

    /// Scratch directory path (default /scratch/scrna)
    #[arg(long, value_name = "DIR")]
    scratch: Option<PathBuf>,

    /// Deriva credential file (default ~/.deriva/credential.json)
    #[arg(long, value_name = "FILE")]
    credential_file: Option<PathBuf>,

    /// Pipeline config file (default <config_dir>/atlas-d2k/pipelines.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn pipeline_config(&self) -> atlas_pipelines::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::load_default()?,
        };
        if let Some(host) = &self.host {
            config = config.with_host(host.as_str());
        }
        if let Some(catalog_id) = &self.catalog_id {
            config = config.with_catalog_id(catalog_id.as_str());
        }
        if let Some(scratch) = &self.scratch {
            config = config.with_scratch_dir(scratch.as_path());
        }
        if let Some(path) = &self.credential_file {
            config = config.with_credential_file(path.as_path());
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = args.pipeline_config()?;
    tracing::info!(
        "host: {} ({}), catalog: {}, scratch: {}",
        config.host,
        config.environment(),
        config.catalog_id,
        config.scratch_dir.display()
    );

    let credentials = DerivaCredentials::load_or_default(config.credential_file.as_deref())?;
    let auth = credentials.for_host(&config.host);

    let catalog = ErmrestCatalog::new(HttpClient::with_default_agent()?, &config.host, &config.catalog_id)
        .with_auth(auth.clone())
        .with_context(ClientContext::PipelineScRnaSeq);
    let store = HatracStore::new(HttpClient::with_default_agent()?, &config.host).with_auth(auth);

    get_experiment_settings(&catalog, &args.replicate)?;
    let files = prepare_replicate_files(&catalog, &store, &config.scratch_dir, &args.replicate)?;
    tracing::info!("Prepared {} file(s) for {}", files.len(), args.replicate);

    Ok(())
}
