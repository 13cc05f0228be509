//! Implementation of the `landscape plot` sub command.

use std::path::PathBuf;

use clap::Parser;
use thousands::Separable;

use crate::clinical::table::{parse_include, ClinicalTable};

use super::categories::CategoryConfig;
use super::maf::read_maf_files;
use super::matrix::build_tables;
use super::render::{render_svg, PlotSettings};
use super::sorting::sort_samples;

/// Command line arguments for `landscape plot` sub command.
#[derive(Parser, Debug)]
#[command(about = "Render a mutation landscape SVG for a cohort", long_about = None)]
pub struct Args {
    /// Path to the clinical patient table.
    #[arg(long)]
    pub path_clinical: PathBuf,
    /// Path to the directory with the per-case MAF files.
    #[arg(long)]
    pub path_snv: PathBuf,
    /// Path to the output SVG file.
    #[arg(long)]
    pub path_out: PathBuf,
    /// Histology filter as `COLUMN=VALUE`, can be given multiple times;
    /// clauses are OR-ed, no clause selects all cases.
    #[arg(long = "include", value_parser = parse_include)]
    pub include: Vec<(String, String)>,
    /// Number of most frequently mutated genes to show.
    #[arg(long, default_value_t = 30)]
    pub top_n_genes: usize,
    /// Title of the plot.
    #[arg(long, default_value = "")]
    pub title: String,
}

/// Main entry point for the `landscape plot` command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `landscape plot`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    tracing::info!("reading clinical data from {:?}...", &args.path_clinical);
    let clinical = ClinicalTable::load(&args.path_clinical)?;
    let case_ids = if args.include.is_empty() {
        clinical
            .rows
            .iter()
            .filter_map(|row| row.get(1).cloned())
            .collect()
    } else {
        clinical.case_ids_matching(&args.include)?
    };
    tracing::info!(
        "found {} cases matching the histology criteria",
        case_ids.len().separate_with_commas()
    );

    tracing::info!("reading MAF files from {:?}...", &args.path_snv);
    let records = read_maf_files(&args.path_snv, &case_ids)?;

    tracing::info!("building mutation matrix...");
    let config = CategoryConfig::default();
    let tables = build_tables(&records, args.top_n_genes, &config);
    if tables.matrix.is_empty() {
        tracing::warn!("no qualifying mutations found, the plot will be empty");
    }
    let order = sort_samples(&tables.matrix);

    tracing::info!("rendering landscape...");
    let settings = PlotSettings {
        title: args.title.clone(),
        ..Default::default()
    };
    let svg = render_svg(&tables, &order, &config, &settings);
    std::fs::write(&args.path_out, svg)
        .map_err(|e| anyhow::anyhow!("could not write {:?}: {}", &args.path_out, e))?;
    tracing::info!("plot saved as {:?}", &args.path_out);

    Ok(())
}

#[cfg(test)]
mod test {
    use temp_testdir::TempDir;

    use crate::common::Args as CommonArgs;

    use super::{run, Args};

    #[test]
    fn run_smoke() -> Result<(), anyhow::Error> {
        let tmp_dir = TempDir::default();
        let common_args = CommonArgs::default();
        let args = Args {
            path_clinical: "tests/clinical/clinical_patient_paad.txt".into(),
            path_snv: "tests/landscape/snv".into(),
            path_out: tmp_dir.join("landscape.svg"),
            include: vec![(
                "histologic_diagnosis".to_string(),
                "Pancreas-Adenocarcinoma Ductal Type".to_string(),
            )],
            top_n_genes: 30,
            title: "PAAD".to_string(),
        };

        run(&common_args, &args)?;

        let svg = std::fs::read_to_string(tmp_dir.join("landscape.svg"))?;
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("KRAS"));
        assert!(svg.contains("PAAD"));

        Ok(())
    }

    #[test]
    fn run_fails_without_maf_files() {
        let tmp_dir = TempDir::default();
        let common_args = CommonArgs::default();
        let args = Args {
            path_clinical: "tests/clinical/clinical_patient_paad.txt".into(),
            path_snv: tmp_dir.join("empty"),
            path_out: tmp_dir.join("landscape.svg"),
            include: vec![],
            top_n_genes: 30,
            title: String::new(),
        };

        assert!(run(&common_args, &args).is_err());
    }
}
