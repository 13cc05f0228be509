//! Implementation of the `gdc download-clinical` sub command.
//!
//! Queries the GDC for TCGA "Clinical Supplement" files whose name matches
//! `*clinical_patient*` and downloads each into the output directory.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thousands::Separable;

use super::{Client, Filter};

/// Command line arguments for `gdc download-clinical` sub command.
#[derive(Parser, Debug)]
#[command(about = "Download TCGA clinical patient tables from the GDC", long_about = None)]
pub struct Args {
    /// Path to the output directory.
    #[arg(long, default_value = "data_clinical")]
    pub path_out: PathBuf,
    /// Project ID pattern to match, `*` wildcards are allowed.
    #[arg(long, default_value = "*TCGA*")]
    pub project_id: String,
    /// Maximal number of files to list.
    #[arg(long, default_value_t = 100)]
    pub size: usize,
    /// Number of retries for failed requests.
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,
    /// Initial retry backoff in milliseconds, doubled per attempt.
    #[arg(long, default_value_t = 1000)]
    pub backoff_ms: u64,
}

/// Build the filter expression selecting clinical patient supplements.
fn build_filter(project_id: &str) -> Filter {
    Filter::and(vec![
        Filter::eq("cases.project.project_id", project_id),
        Filter::eq("data_type", "Clinical Supplement"),
        Filter::eq("file_name", "*clinical_patient*"),
    ])
}

/// Main entry point for the `gdc download-clinical` command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `gdc download-clinical`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let client = Client::new(
        super::GDC_API_URL,
        args.max_retries,
        Duration::from_millis(args.backoff_ms),
    );
    let filter = build_filter(&args.project_id);

    super::runtime()?.block_on(async {
        tracing::info!("querying file list...");
        let hits = client
            .query_files(&filter, "file_id,file_name", args.size)
            .await?;
        if hits.is_empty() {
            tracing::warn!("no files found matching the filter");
            return Ok(());
        }
        tracing::info!("found {} matching files", hits.len().separate_with_commas());

        std::fs::create_dir_all(&args.path_out)?;
        for hit in &hits {
            let path_out = args.path_out.join(&hit.file_name);
            tracing::info!("downloading {}...", &hit.file_name);
            let data = client.fetch_data(&hit.file_id).await?;
            std::fs::write(&path_out, &data)
                .map_err(|e| anyhow::anyhow!("could not write {:?}: {}", &path_out, e))?;
        }
        tracing::info!("downloaded {} files", hits.len().separate_with_commas());

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
