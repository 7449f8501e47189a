//! Orgchart CLI
//!
//! Usage:
//!   orgchart pipeline [--positions data.json]
//!   orgchart extract
//!   orgchart list [org_id]
//!   orgchart calibrate <pdf> <search_text> <node_id> [--org-id ID] [--output template.json]
//!
//! All subcommands accept `--config settings.json`; otherwise the file named
//! by `ORGCHART_CONFIG` is used, falling back to built-in defaults.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{info, warn};

use orgchart::cli::{finish, init_logging, parse_or_exit};
use orgchart::datalake::StaticLookup;
use orgchart::extract::ExtractOptions;
use orgchart::snapshot::{self, PositionDatabase};
use orgchart::template;
use orgchart::{run_pipeline, Result, Settings};

#[derive(Parser)]
#[command(name = "orgchart", version, about = "Org chart PDF update tools")]
struct Cli {
    /// JSON settings file (overrides ORGCHART_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every template in the templates directory over its base PDF
    Pipeline {
        /// Position data as a JSON array; the built-in demo data otherwise
        #[arg(long)]
        positions: Option<PathBuf>,
    },
    /// Rebuild the position snapshot from the PDFs in the templates directory
    Extract,
    /// Print the elements recorded in the snapshot
    List {
        /// Limit the listing to one org chart
        org_id: Option<String>,
    },
    /// Write a one-node template from text found on page 0 of a PDF
    Calibrate {
        pdf: PathBuf,
        search_text: String,
        node_id: String,
        /// Defaults to the PDF's file stem
        #[arg(long)]
        org_id: Option<String>,
        /// Defaults to {templates_dir}/{org_id}.json
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli: Cli = parse_or_exit();
    finish(Settings::resolve(cli.config.as_deref()).and_then(|settings| run(cli.command, &settings)))
}

fn run(command: Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Pipeline { positions } => {
            let lookup = match positions {
                Some(path) => StaticLookup::from_json_file(&path)?,
                None => StaticLookup::demo(),
            };
            let report = run_pipeline(settings, &lookup)?;
            for path in &report.generated {
                println!("✓ {}", path.display());
            }
            for skipped in &report.skipped {
                println!("✗ {}: {}", skipped.config.display(), skipped.reason);
            }
        }
        Command::Extract => {
            let db = snapshot::rebuild(settings)?;
            let total: usize = db.organigramas.values().map(|e| e.element_count()).sum();
            info!(
                "{} org charts, {} elements",
                db.organigramas.len(),
                total
            );
        }
        Command::List { org_id } => {
            let db = PositionDatabase::load(&settings.paths.snapshot_path)?;
            print!("{}", db.listing(org_id.as_deref())?);
        }
        Command::Calibrate {
            pdf,
            search_text,
            node_id,
            org_id,
            output,
        } => {
            let org_id = org_id.unwrap_or_else(|| {
                pdf.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "ORG".to_string())
            });
            let template = template::calibrate(
                &pdf,
                &search_text,
                &node_id,
                &org_id,
                &ExtractOptions::from(&settings.extraction),
            )?;
            let output = output.unwrap_or_else(|| {
                settings
                    .paths
                    .templates_dir
                    .join(format!("{}.json", org_id))
            });
            if output.exists() {
                warn!("overwriting {}", output.display());
            }
            template.save(&output)?;
            println!("✓ template written to {}", output.display());
        }
    }
    Ok(())
}
