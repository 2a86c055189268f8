//! scRNA-Seq replicate preparation
//!
//! Lays out a per-replicate working tree under the scratch directory and
//! pulls the replicate's paired-end FASTQ files from the object store:
//!
//! ```text
//! <scratch>/<replicate>/extras/
//! <scratch>/<replicate>/raw/fastq/RNA/<File_Name>
//! ```

use std::path::{Component, Path, PathBuf};

use serde_json::Value;

use crate::catalog::{Catalog, Row};
use crate::error::{PipelineError, Result};
use crate::store::ObjectStore;

pub const RNASEQ_SCHEMA: &str = "RNASeq";

/// Read 1 and read 2 of a paired-end run
pub const FASTQ_PATTERN: &str = ".[R][12].fastq.gz";

/// Working directories of one replicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicateLayout {
    pub root: PathBuf,
    pub extras_dir: PathBuf,
    pub fastq_dir: PathBuf,
}

impl ReplicateLayout {
    pub fn new(scratch_dir: &Path, replicate_rid: &str) -> Self {
        let root = scratch_dir.join(replicate_rid);
        Self {
            extras_dir: root.join("extras"),
            fastq_dir: root.join("raw").join("fastq").join("RNA"),
            root,
        }
    }

    /// Create both directories; existing ones are kept
    pub fn create(&self) -> Result<()> {
        for dir in [&self.extras_dir, &self.fastq_dir] {
            std::fs::create_dir_all(dir).map_err(PipelineError::io(dir.as_path()))?;
        }
        Ok(())
    }
}

fn text_column<'a>(row: &'a Row, column: &'static str) -> Result<&'a str> {
    row.get(column)
        .and_then(Value::as_str)
        .ok_or(PipelineError::MissingColumn { column })
}

/// `name` as a plain file name, rejecting separators, `..` and absolute paths
fn local_file_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(PipelineError::UnsafeFileName {
            name: name.to_string(),
        }),
    }
}

/// Experiment settings joined to a replicate through its experiment
pub fn get_experiment_settings(catalog: &impl Catalog, replicate_rid: &str) -> Result<Row> {
    let constraints = format!(
        "RID={}/(Experiment_RID)=(RNASeq:Experiment_Settings:Experiment_RID)",
        urlencoding::encode(replicate_rid)
    );
    let rows = catalog.get_entities(RNASEQ_SCHEMA, "Replicate", &constraints)?;
    tracing::debug!(
        "Experiment settings for {}: {}",
        replicate_rid,
        serde_json::to_string_pretty(&rows).unwrap_or_default()
    );

    rows.into_iter().next().ok_or_else(|| {
        PipelineError::NotFound(format!(
            "experiment settings for replicate {}",
            replicate_rid
        ))
    })
}

/// Download the replicate's FASTQ files into its working tree.
///
/// Returns the local paths in catalog order. A replicate without matching
/// files yields an empty list after the directories are created. Every
/// `File_Name` must be a bare file name; the rows are checked before any
/// download starts.
pub fn prepare_replicate_files(
    catalog: &impl Catalog,
    store: &impl ObjectStore,
    scratch_dir: &Path,
    replicate_rid: &str,
) -> Result<Vec<PathBuf>> {
    local_file_name(replicate_rid)?;
    let layout = ReplicateLayout::new(scratch_dir, replicate_rid);
    layout.create()?;

    let constraints = format!(
        "Replicate_RID={}&File_Name::regexp::{}",
        urlencoding::encode(replicate_rid),
        urlencoding::encode(FASTQ_PATTERN)
    );
    let rows = catalog.get_entities(RNASEQ_SCHEMA, "File", &constraints)?;
    tracing::info!("Replicate {} has {} FASTQ file(s)", replicate_rid, rows.len());

    let mut files = Vec::with_capacity(rows.len());
    for row in &rows {
        let file_name = local_file_name(text_column(row, "File_Name")?)?;
        files.push((file_name, text_column(row, "URI")?));
    }

    let mut downloaded = Vec::with_capacity(files.len());
    for (file_name, uri) in files {
        let dest = layout.fastq_dir.join(file_name);
        store.get_obj(uri, &dest)?;
        tracing::info!("Downloaded file: {} -> {}", uri, dest.display());
        downloaded.push(dest);
    }

    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let layout = ReplicateLayout::new(Path::new("/scratch/scrna"), "16-2PS4");
        assert_eq!(layout.root, PathBuf::from("/scratch/scrna/16-2PS4"));
        assert_eq!(
            layout.extras_dir,
            PathBuf::from("/scratch/scrna/16-2PS4/extras")
        );
        assert_eq!(
            layout.fastq_dir,
            PathBuf::from("/scratch/scrna/16-2PS4/raw/fastq/RNA")
        );
    }

    #[test]
    fn test_layout_create_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ReplicateLayout::new(dir.path(), "16-2PS4");
        layout.create().unwrap();
        layout.create().unwrap();
        assert!(layout.extras_dir.is_dir());
        assert!(layout.fastq_dir.is_dir());
    }

    #[test]
    fn test_text_column() {
        let row: Row = serde_json::from_str(r#"{"File_Name": "a_R1.fastq.gz", "Size": 3}"#).unwrap();
        assert_eq!(text_column(&row, "File_Name").unwrap(), "a_R1.fastq.gz");
        assert!(matches!(
            text_column(&row, "Size"),
            Err(PipelineError::MissingColumn { column: "Size" })
        ));
        assert!(text_column(&row, "URI").is_err());
    }

    #[test]
    fn test_local_file_name() {
        assert_eq!(
            local_file_name("16-2PS4_S1_L001_R1.fastq.gz").unwrap(),
            "16-2PS4_S1_L001_R1.fastq.gz"
        );
        for name in [
            "../../escaped_R1.fastq.gz",
            "/etc/escaped_R1.fastq.gz",
            "nested/a_R1.fastq.gz",
            "..",
            ".",
            "",
        ] {
            assert!(
                matches!(
                    local_file_name(name),
                    Err(PipelineError::UnsafeFileName { .. })
                ),
                "{:?} accepted",
                name
            );
        }
    }
}
