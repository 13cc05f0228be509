//! Implementation of the `clinical combine` sub command.
//!
//! Merges the per-cohort `clinical_patient_<cohort>.txt` tables of a
//! directory into one combined CSV file.  Columns are unioned across
//! cohorts, `cohort` and `source_file` columns are appended, all-empty
//! columns and duplicate rows are dropped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::Parser;
use indexmap::IndexSet;
use thousands::Separable;

use super::table::ClinicalTable;

/// Command line arguments for `clinical combine` sub command.
#[derive(Parser, Debug)]
#[command(about = "Combine per-cohort clinical tables into one CSV", long_about = None)]
pub struct Args {
    /// Path to the directory with the clinical patient files.
    #[arg(long, default_value = "data_clinical")]
    pub path_in: PathBuf,
    /// Path to the combined output CSV file.
    #[arg(long, default_value = "combined_clinical_cohorts.csv")]
    pub path_out: PathBuf,
}

/// One loaded cohort table together with its provenance.
#[derive(Debug)]
struct CohortTable {
    /// Upper-cased cohort code extracted from the file name.
    cohort: String,
    /// Name of the source file.
    source_file: String,
    /// The loaded table.
    table: ClinicalTable,
}

/// Discover and load all cohort tables in `path_in`, sorted by file name.
fn load_cohort_tables(path_in: &Path) -> Result<Vec<CohortTable>, anyhow::Error> {
    let pattern = regex::Regex::new(r"clinical_patient_([a-zA-Z]+)\.txt$")
        .expect("invalid hard-coded regex");

    let mut file_names: Vec<String> = std::fs::read_dir(path_in)
        .map_err(|e| anyhow::anyhow!("could not list {:?}: {}", path_in, e))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    file_names.sort();

    let mut tables = Vec::new();
    for file_name in file_names {
        let Some(captures) = pattern.captures(&file_name) else {
            continue;
        };
        let cohort = captures[1].to_uppercase();
        let path = path_in.join(&file_name);
        match ClinicalTable::load(&path) {
            Ok(table) => {
                tracing::info!(
                    "loaded cohort {} with {} patients from {}",
                    &cohort,
                    table.rows.len().separate_with_commas(),
                    &file_name
                );
                tables.push(CohortTable {
                    cohort,
                    source_file: file_name,
                    table,
                });
            }
            Err(e) => {
                tracing::warn!("skipping {}: {}", &file_name, e);
            }
        }
    }

    Ok(tables)
}

/// Union the column names of all tables in first-seen order, then append
/// the `cohort` and `source_file` provenance columns.
fn union_columns(tables: &[CohortTable]) -> Vec<String> {
    let mut columns: IndexSet<String> = IndexSet::new();
    for cohort_table in tables {
        for column in &cohort_table.table.columns {
            columns.insert(column.clone());
        }
    }
    columns.insert("cohort".to_string());
    columns.insert("source_file".to_string());
    columns.into_iter().collect()
}

/// Materialize the combined rows: cells aligned to the unioned columns,
/// missing cells empty, duplicates dropped.
fn combine_rows(tables: &[CohortTable], columns: &[String]) -> Vec<Vec<String>> {
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut rows = Vec::new();

    for cohort_table in tables {
        for row in &cohort_table.table.rows {
            let mut out_row = Vec::with_capacity(columns.len());
            for column in columns {
                let value = match column.as_str() {
                    "cohort" => cohort_table.cohort.clone(),
                    "source_file" => cohort_table.source_file.clone(),
                    _ => cohort_table
                        .table
                        .column_index(column)
                        .and_then(|idx| row.get(idx))
                        .cloned()
                        .unwrap_or_default(),
                };
                out_row.push(value);
            }
            if seen.insert(out_row.clone()) {
                rows.push(out_row);
            }
        }
    }

    rows
}

/// Drop columns that are empty in every row.
///
/// Without rows there is no evidence that a column is empty, so the
/// column set is kept as-is.
fn drop_empty_columns(columns: &mut Vec<String>, rows: &mut [Vec<String>]) {
    if rows.is_empty() {
        return;
    }
    let keep: Vec<bool> = (0..columns.len())
        .map(|idx| rows.iter().any(|row| !row[idx].is_empty()))
        .collect();

    let mut idx = 0;
    columns.retain(|_| {
        let k = keep[idx];
        idx += 1;
        k
    });
    for row in rows.iter_mut() {
        let mut idx = 0;
        row.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
    }
}

/// Main entry point for the `clinical combine` command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `clinical combine`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let tables = load_cohort_tables(&args.path_in)?;
    if tables.is_empty() {
        anyhow::bail!("no clinical patient files found in {:?}", &args.path_in);
    }

    let mut columns = union_columns(&tables);
    let mut rows = combine_rows(&tables, &columns);
    drop_empty_columns(&mut columns, &mut rows);

    let mut writer = csv::Writer::from_path(&args.path_out)
        .map_err(|e| anyhow::anyhow!("could not open {:?} for writing: {}", &args.path_out, e))?;
    writer.write_record(&columns)?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    tracing::info!(
        "wrote {} patients from {} cohorts with {} columns to {:?}",
        rows.len().separate_with_commas(),
        tables.len().separate_with_commas(),
        columns.len().separate_with_commas(),
        &args.path_out
    );

    Ok(())
}
