//! atlas-doi: register and inspect DataCite DOIs from the command line

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use atlas_doi::{
    build_resource, create_new_doi, delete_doi, print_all_dois, print_doi, project, DataCiteMds,
    DataciteError, Dataset, DoiState,
};

#[derive(Parser, Debug)]
#[command(name = "atlas-doi", version, about = "DataCite DOI registration for ATLAS-D2K")]
struct Cli {
    /// DataCite credential file ({server, username, password, prefix})
    #[arg(short, long, global = true, value_name = "FILE")]
    credentials: Option<PathBuf>,

    /// Log every registry exchange
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every DOI registered to the account
    List,
    /// Print the metadata and URL of prefix/SUFFIX
    Show { suffix: String },
    /// Register a dataset descriptor under prefix/<rid>
    Create {
        /// Dataset descriptor (JSON)
        dataset: PathBuf,
        /// Fill publisher and funding from a consortium project
        #[arg(short, long)]
        project: Option<String>,
        /// Where to keep the generated metadata document
        #[arg(long, value_name = "FILE")]
        metadata_out: Option<PathBuf>,
    },
    /// Delete the draft DOI prefix/SUFFIX
    Delete { suffix: String },
    /// Hide prefix/SUFFIX from the public index
    Deindex { suffix: String },
    /// Find a suffix not yet registered under the prefix
    UnusedSuffix,
    /// Print the metadata document for a dataset without registering it
    Metadata {
        dataset: PathBuf,
        #[arg(short, long)]
        project: Option<String>,
        /// DOI to put in the identifier element
        #[arg(long, default_value = "10.0000/PLACEHOLDER")]
        doi: String,
    },
}

fn load_dataset(path: &Path, project_key: Option<&str>) -> Result<Dataset, Box<dyn std::error::Error>> {
    let mut dataset = Dataset::load(path)?;
    if let Some(key) = project_key {
        let project = project(key).ok_or_else(|| format!("unknown project: {}", key))?;
        dataset.apply_project(project);
    }
    Ok(dataset)
}

fn client(credentials: Option<PathBuf>) -> Result<DataCiteMds, Box<dyn std::error::Error>> {
    let path = credentials.ok_or("--credentials is required for registry commands")?;
    Ok(DataCiteMds::from_credential_file(path)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::List => print_all_dois(&client(cli.credentials)?, &mut stdout)?,
        Command::Show { suffix } => print_doi(&client(cli.credentials)?, &suffix, &mut stdout)?,
        Command::Create {
            dataset,
            project,
            metadata_out,
        } => {
            let dataset = load_dataset(&dataset, project.as_deref())?;
            let metadata_out =
                metadata_out.unwrap_or_else(|| std::env::temp_dir().join("metadata.xml"));
            let doi = create_new_doi(&client(cli.credentials)?, &dataset, &metadata_out)?;
            writeln!(stdout, "{}", doi)?;
        }
        Command::Delete { suffix } => match delete_doi(&client(cli.credentials)?, &suffix) {
            Ok(_) => tracing::info!("Deleted {} DOI suffix {}", DoiState::Draft, suffix),
            Err(e @ DataciteError::MethodNotAllowed { .. }) => {
                return Err(format!(
                    "{}\nOnly {} DOIs can be deleted; use `deindex` to make it {}",
                    e,
                    DoiState::Draft,
                    DoiState::Registered
                )
                .into())
            }
            Err(e) => return Err(e.into()),
        },
        Command::Deindex { suffix } => {
            let client = client(cli.credentials)?;
            let doi = client.compose_doi(&suffix);
            client.delete_doi_metadata_index(&doi)?;
            tracing::info!("{} is now {}", doi, DoiState::Registered);
        }
        Command::UnusedSuffix => {
            writeln!(stdout, "{}", client(cli.credentials)?.get_unused_suffix()?)?
        }
        Command::Metadata {
            dataset,
            project,
            doi,
        } => {
            let dataset = load_dataset(&dataset, project.as_deref())?;
            build_resource(&doi, &dataset)?.write_to(&mut stdout)?;
        }
    }

    Ok(())
}
