//! Loading of somatic mutation calls from MAF files.

use std::path::Path;

use serde::Deserialize;
use thousands::Separable;

use crate::common::io::open_read_maybe_gz;

/// One somatic mutation call as read from a MAF file.
///
/// MAF files carry over a hundred columns; only the three needed for the
/// landscape are deserialized, everything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MutationRecord {
    /// The HUGO gene symbol.
    #[serde(rename = "Hugo_Symbol")]
    pub gene: String,
    /// The raw variant classification string.
    #[serde(rename = "Variant_Classification")]
    pub variant_classification: String,
    /// The tumor sample barcode.
    #[serde(rename = "Tumor_Sample_Barcode")]
    pub sample_id: String,
}

/// Read the mutation records of a single MAF file.
pub fn read_maf_file<P>(path: P) -> Result<Vec<MutationRecord>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let reader = open_read_maybe_gz(&path)
        .map_err(|e| anyhow::anyhow!("could not open {:?}: {}", path.as_ref(), e))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for record in reader.deserialize() {
        let record: MutationRecord = record
            .map_err(|e| anyhow::anyhow!("error parsing {:?}: {}", path.as_ref(), e))?;
        records.push(record);
    }

    Ok(records)
}

/// Read and concatenate the MAF files of the given cases from `dir`.
///
/// Per-case files are expected as `<case>.maf` (or `<case>.maf.gz`);
/// missing files are logged and skipped.  It is an error if no file can
/// be read at all.
pub fn read_maf_files<P>(dir: P, case_ids: &[String]) -> Result<Vec<MutationRecord>, anyhow::Error>
where
    P: AsRef<Path>,
{
    let mut all_records = Vec::new();
    let mut count_files = 0;

    for case_id in case_ids {
        let path_plain = dir.as_ref().join(format!("{}.maf", case_id));
        let path_gz = dir.as_ref().join(format!("{}.maf.gz", case_id));
        let path = if path_plain.exists() {
            path_plain
        } else if path_gz.exists() {
            path_gz
        } else {
            tracing::warn!("{:?} not found", &path_plain);
            continue;
        };

        let records = read_maf_file(&path)?;
        if records.is_empty() {
            tracing::warn!("{:?} is empty", &path);
        }
        all_records.extend(records);
        count_files += 1;
    }

    if count_files == 0 {
        anyhow::bail!(
            "no MAF files found in {:?} for the {} selected cases",
            dir.as_ref(),
            case_ids.len()
        );
    }
    tracing::info!(
        "read {} mutation records from {} MAF files",
        all_records.len().separate_with_commas(),
        count_files.separate_with_commas()
    );

    Ok(all_records)
}
