//! Call-site conveniences composing the MDS client and the metadata builder

use std::io::Write;
use std::path::Path;

use atlas_http::Transport;

use crate::client::DataCiteMds;
use crate::dataset::Dataset;
use crate::error::{DataciteError, Result};
use crate::metadata::create_datacite_metadata;

/// Register `dataset` under `prefix/rid` and point it at `dataset.url`.
///
/// The metadata document is written to `metadata_path` before upload so it
/// can be inspected afterwards. Returns the new DOI.
pub fn create_new_doi<T: Transport>(
    client: &DataCiteMds<T>,
    dataset: &Dataset,
    metadata_path: impl AsRef<Path>,
) -> Result<String> {
    dataset.validate()?;
    let rid = dataset
        .rid()
        .ok_or_else(|| DataciteError::Validation("rid is required to compose a DOI".into()))?;
    let url = dataset
        .url()
        .ok_or_else(|| DataciteError::Validation("url is required to register a DOI".into()))?;

    let doi = client.compose_doi(rid);
    tracing::info!("Creating new doi: {}", doi);

    let metadata_path = metadata_path.as_ref();
    create_datacite_metadata(&doi, metadata_path, dataset)?;
    client.set_doi_metadata_file(metadata_path)?;
    client.set_doi_url(&doi, url)?;

    Ok(doi)
}

/// Print the registered metadata and URL of `prefix/suffix`.
///
/// Registry errors are reported to `out` and otherwise ignored.
pub fn print_doi<T: Transport, W: Write>(
    client: &DataCiteMds<T>,
    suffix: &str,
    out: &mut W,
) -> std::io::Result<()> {
    let doi = client.compose_doi(suffix);
    let fetched = client
        .get_doi_metadata(&doi)
        .and_then(|metadata| Ok((metadata, client.get_doi_url(&doi)?)));

    match fetched {
        Ok((metadata, url)) => {
            writeln!(out, "{}", metadata.trim_end())?;
            writeln!(out, "{} -> {}", doi, url)
        }
        Err(e) => {
            tracing::error!("Can't print DOI suffix {}: {}", suffix, e);
            writeln!(out, "ERROR: Can't print DOI suffix {} due to {}", suffix, e)
        }
    }
}

/// Delete the draft DOI `prefix/suffix`
pub fn delete_doi<T: Transport>(client: &DataCiteMds<T>, suffix: &str) -> Result<bool> {
    client.delete_doi(&client.compose_doi(suffix))
}

/// Print every DOI registered to the account
pub fn print_all_dois<T: Transport, W: Write>(client: &DataCiteMds<T>, out: &mut W) -> Result<()> {
    let dois = client.get_all_dois()?;
    writeln!(out, "{}", dois.trim_end()).map_err(DataciteError::Output)
}
