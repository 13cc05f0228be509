//! Mutscape main executable

pub mod clinical;
pub mod common;
pub mod gdc;
pub mod landscape;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "TCGA mutation landscape toolkit",
    long_about = "This tool downloads TCGA cohort data from the GDC portal and renders mutation landscapes"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// GDC data portal related commands.
    Gdc(Gdc),
    /// Clinical table related commands.
    Clinical(Clinical),
    /// Mutation landscape related commands.
    Landscape(Landscape),
}

/// Parsing of "gdc *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Gdc {
    /// The sub command to run
    #[command(subcommand)]
    command: GdcCommands,
}

/// Enum supporting the parsing of "gdc *" sub commands.
#[derive(Debug, Subcommand)]
enum GdcCommands {
    DownloadClinical(gdc::download_clinical::Args),
    DownloadSnv(gdc::download_snv::Args),
}

/// Parsing of "clinical *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Clinical {
    /// The sub command to run
    #[command(subcommand)]
    command: ClinicalCommands,
}

/// Enum supporting the parsing of "clinical *" sub commands.
#[derive(Debug, Subcommand)]
enum ClinicalCommands {
    Combine(clinical::combine::Args),
}

/// Parsing of "landscape *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Landscape {
    /// The sub command to run
    #[command(subcommand)]
    command: LandscapeCommands,
}

/// Enum supporting the parsing of "landscape *" sub commands.
#[derive(Debug, Subcommand)]
enum LandscapeCommands {
    Plot(landscape::plot::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Gdc(gdc) => match &gdc.command {
                GdcCommands::DownloadClinical(args) => {
                    gdc::download_clinical::run(&cli.common, args)?;
                }
                GdcCommands::DownloadSnv(args) => {
                    gdc::download_snv::run(&cli.common, args)?;
                }
            },
            Commands::Clinical(clinical) => match &clinical.command {
                ClinicalCommands::Combine(args) => {
                    clinical::combine::run(&cli.common, args)?;
                }
            },
            Commands::Landscape(landscape) => match &landscape.command {
                LandscapeCommands::Plot(args) => {
                    landscape::plot::run(&cli.common, args)?;
                }
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
