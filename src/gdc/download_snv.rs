//! Implementation of the `gdc download-snv` sub command.
//!
//! Queries the GDC for the masked somatic mutation MAF files of one TCGA
//! cohort, downloads each file, decompresses it on the fly, and stores it
//! as `<case_submitter_id>.maf` in the output directory.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thousands::Separable;

use crate::common::io::write_gunzipped;

use super::{Client, FileHit, Filter};

/// Command line arguments for `gdc download-snv` sub command.
#[derive(Parser, Debug)]
#[command(about = "Download masked somatic mutation MAF files for a cohort", long_about = None)]
pub struct Args {
    /// The TCGA cohort to download, e.g. `PAAD`.
    #[arg(long)]
    pub cohort: String,
    /// Path to the output directory, defaults to `data_snv_<cohort>`.
    #[arg(long)]
    pub path_out: Option<PathBuf>,
    /// Maximal number of files to list.
    #[arg(long, default_value_t = 1000)]
    pub size: usize,
    /// Delay between two downloads in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub delay_ms: u64,
    /// Number of retries for failed requests.
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,
    /// Initial retry backoff in milliseconds, doubled per attempt.
    #[arg(long, default_value_t = 1000)]
    pub backoff_ms: u64,
}

/// Build the filter expression selecting the cohort's masked MAF files.
fn build_filter(cohort: &str) -> Filter {
    Filter::and(vec![
        Filter::eq("cases.project.project_id", &format!("TCGA-{}", cohort)),
        Filter::eq("data_type", "Masked Somatic Mutation"),
        Filter::eq("file_name", "*masked.maf.gz*"),
    ])
}

/// Derive the output file name `<case>.maf` for a hit.
///
/// The GDC returns one case per masked MAF file; a hit without case
/// annotation cannot be renamed and is an error.
fn case_maf_name(hit: &FileHit) -> Result<String, anyhow::Error> {
    let case = hit
        .cases
        .first()
        .ok_or_else(|| anyhow::anyhow!("file {} has no case annotation", &hit.file_name))?;
    Ok(format!("{}.maf", case.submitter_id))
}

/// Main entry point for the `gdc download-snv` command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `gdc download-snv`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let path_out = args
        .path_out
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("data_snv_{}", &args.cohort)));
    let client = Client::new(
        super::GDC_API_URL,
        args.max_retries,
        Duration::from_millis(args.backoff_ms),
    );
    let filter = build_filter(&args.cohort);

    super::runtime()?.block_on(async {
        tracing::info!("querying file list for cohort {}...", &args.cohort);
        let hits = client
            .query_files(&filter, "file_id,file_name,cases.submitter_id", args.size)
            .await?;
        if hits.is_empty() {
            tracing::warn!("no files found matching the filter");
            return Ok(());
        }
        tracing::info!("found {} matching files", hits.len().separate_with_commas());

        std::fs::create_dir_all(&path_out)?;
        let mut count_files = 0;
        for hit in &hits {
            let maf_name = case_maf_name(hit)?;
            let path_maf = path_out.join(&maf_name);

            // Be gentle with the portal between downloads.
            tokio::time::sleep(Duration::from_millis(args.delay_ms)).await;

            tracing::debug!("downloading {} -> {}", &hit.file_name, &maf_name);
            let data = client.fetch_data(&hit.file_id).await?;
            write_gunzipped(&data, &path_maf)?;
            tracing::info!("processed {}", &maf_name);

            count_files += 1;
        }
        tracing::info!(
            "downloaded and decompressed {} files",
            count_files.separate_with_commas()
        );

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
