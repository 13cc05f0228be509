//! Loading of TCGA "clinical_patient" tables.
//!
//! The files are tab separated with one header row followed by two
//! metadata rows (`CDE_ID` etc.) that are skipped positionally, then one
//! row per patient.

use std::path::Path;

use crate::common::io::open_read_maybe_gz;

/// Number of metadata rows between the header and the first patient row.
const METADATA_ROWS: usize = 2;

/// An in-memory clinical patient table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalTable {
    /// Column names from the header row.
    pub columns: Vec<String>,
    /// One entry per patient, padded to the column count.
    pub rows: Vec<Vec<String>>,
}

impl ClinicalTable {
    /// Load a clinical patient table from a (possibly gzipped) TSV file.
    pub fn load<P>(path: P) -> Result<Self, anyhow::Error>
    where
        P: AsRef<Path>,
    {
        let reader = open_read_maybe_gz(&path)
            .map_err(|e| anyhow::anyhow!("could not open {:?}: {}", path.as_ref(), e))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = reader.records();
        let header = records
            .next()
            .ok_or_else(|| anyhow::anyhow!("{:?} has no header row", path.as_ref()))??;
        let columns: Vec<String> = header.iter().map(|s| s.to_string()).collect();

        let mut rows = Vec::new();
        for (i, record) in records.enumerate() {
            if i < METADATA_ROWS {
                continue;
            }
            let record = record?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        tracing::debug!(
            "loaded {} patients with {} columns from {:?}",
            rows.len(),
            columns.len(),
            path.as_ref()
        );

        Ok(Self { columns, rows })
    }

    /// Return the index of the column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Return the case IDs of all patients matching any of the given
    /// `(column, value)` clauses.
    ///
    /// Clauses are OR-ed; the case ID is taken from the second column of
    /// the table (`bcr_patient_barcode` in TCGA tables).  A clause naming
    /// an unknown column is an error.
    pub fn case_ids_matching(
        &self,
        includes: &[(String, String)],
    ) -> Result<Vec<String>, anyhow::Error> {
        let mut clause_indices = Vec::new();
        for (column, value) in includes {
            let idx = self
                .column_index(column)
                .ok_or_else(|| anyhow::anyhow!("no such clinical column: {}", column))?;
            clause_indices.push((idx, value));
        }

        let mut case_ids = Vec::new();
        for row in &self.rows {
            let matches = clause_indices
                .iter()
                .any(|(idx, value)| row.get(*idx).map(String::as_str) == Some(value.as_str()));
            if matches {
                let case_id = row
                    .get(1)
                    .ok_or_else(|| anyhow::anyhow!("patient row has no case ID column"))?;
                case_ids.push(case_id.clone());
            }
        }

        Ok(case_ids)
    }
}

/// Parse an `--include COLUMN=VALUE` clause.
pub fn parse_include(s: &str) -> Result<(String, String), anyhow::Error> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected COLUMN=VALUE, got {:?}", s))?;
    Ok((column.to_string(), value.to_string()))
}
