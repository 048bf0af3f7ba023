use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use photo_date_updater::config::Config;
use photo_date_updater::exif::ExifReader;
use photo_date_updater::pipeline::{self, UpdateOptions};
use photo_date_updater::setfile::{self, SetFile};

#[derive(Parser, Debug)]
#[command(
    name = "photo-date-updater",
    version,
    about = "Update photo file creation dates to match EXIF dates",
    after_help = "Examples:\n  photo-date-updater /path/to/photos\n  photo-date-updater /path/to/photos --dry-run"
)]
struct Cli {
    /// Directory containing photo files to process
    #[arg(value_name = "DIRECTORY", required_unless_present = "init")]
    directory: Option<PathBuf>,

    /// Show what would be done without making changes
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to config file (default: photo-date-updater.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config file and exit
    #[arg(long)]
    init: bool,

    /// Print the per-file results and final tally as JSON
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

    // Handle --init
    if cli.init {
        let path = Config::default().save(cli.config.as_deref())?;
        println!("Default config written to {}", path.display());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    let options = UpdateOptions::from_config(&config.output, cli.dry_run);

    if options.dry_run {
        log::info!("Running in dry-run mode - no changes will be made");
    }

    let setter = SetFile::new(config.setfile.program.clone());
    if let Err(e) = setfile::preflight(&setter) {
        log::error!("{e}");
        std::process::exit(1);
    }

    let Some(directory) = cli.directory else {
        anyhow::bail!("No directory specified. Use --help for usage.");
    };

    // A bad directory is logged inside and is not a failing exit.
    let report = pipeline::process_directory(&directory, &options, &ExifReader, &setter);

    if cli.json {
        if let Some(report) = report {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
