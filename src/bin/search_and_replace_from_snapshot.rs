//! Replace text located through the position snapshot.
//!
//! Usage:
//!   search-and-replace-from-snapshot <org_id> <search_text> <replacement_text> [output_path]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use orgchart::cli::{finish, init_logging, parse_or_exit};
use orgchart::Settings;

#[derive(Parser)]
#[command(
    name = "search-and-replace-from-snapshot",
    version,
    about = "White out text located in the position snapshot and write a replacement"
)]
struct Args {
    /// Org chart id, as recorded in the snapshot
    org_id: String,
    /// Case-insensitive text to find
    search_text: String,
    replacement_text: String,
    /// Defaults to output/{org_id}_actualizado.pdf
    output_path: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_logging();
    let args: Args = parse_or_exit();

    finish(Settings::resolve(args.config.as_deref()).and_then(|settings| {
        orgchart::search_and_replace_from_snapshot(
            &args.org_id,
            &args.search_text,
            &args.replacement_text,
            args.output_path.as_deref(),
            &settings,
        )
    }))
}
