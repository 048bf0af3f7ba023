use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use photo_date_updater::exif::ExifReader;
use photo_date_updater::inspect::{self, Inspection};

#[derive(Parser, Debug)]
#[command(
    name = "inspect-metadata",
    version,
    about = "Inspect metadata tags in image and video files",
    after_help = "Examples:\n  inspect-metadata photo.jpg\n  inspect-metadata video.mp4\n  inspect-metadata /path/to/photos --recursive"
)]
struct Cli {
    /// File or directory to inspect
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Recursively inspect directories
    #[arg(short, long)]
    recursive: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the categorized tags as JSON instead of a text summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let path = cli.path;
    let mut results: Vec<serde_json::Value> = Vec::new();
    let mut emit = |file: &std::path::Path, inspection: &Inspection| {
        if cli.json {
            results.push(serde_json::json!({
                "path": file.display().to_string(),
                "metadata": inspection,
            }));
        } else {
            print!("{}", inspect::render_summary(file, inspection));
        }
    };

    if let Err(e) = inspect::run(&path, cli.recursive, &ExifReader, &mut emit) {
        log::error!("{e}");
        std::process::exit(1);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}
