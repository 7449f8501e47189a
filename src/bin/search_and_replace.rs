//! Replace text found by searching the PDF itself.
//!
//! Usage:
//!   search-and-replace <pdf_path> <search_text> <replacement_text> [output_path]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use orgchart::cli::{finish, init_logging, parse_or_exit};
use orgchart::Settings;

#[derive(Parser)]
#[command(name = "search-and-replace", version, about = "White out text found in a PDF and write a replacement")]
struct Args {
    /// PDF to update (page 0 is searched)
    pdf_path: PathBuf,
    /// Exact, case-sensitive text to find
    search_text: String,
    /// New text; use \n in the argument for several lines
    replacement_text: String,
    /// Defaults to output/{pdf_stem}_actualizado.pdf
    output_path: Option<PathBuf>,
    /// JSON settings file (overrides ORGCHART_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_logging();
    let args: Args = parse_or_exit();

    finish(Settings::resolve(args.config.as_deref()).and_then(|settings| {
        info!("searching '{}' in {}", args.search_text, args.pdf_path.display());
        orgchart::search_and_replace(
            &args.pdf_path,
            &args.search_text,
            &args.replacement_text,
            args.output_path.as_deref(),
            &settings,
        )
    }))
}
