use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use film_exif::config;
use film_exif::exif::{ExifTool, TagWriter};
use film_exif::pipeline::{self, DirectoryReport};

#[derive(Parser, Debug)]
#[command(
    name = "film-exif",
    version,
    about = "Apply camera, lens, and film metadata from metadata.json to every JPEG (and XMP sidecar) in a directory"
)]
struct Cli {
    /// Directories to process, each containing a metadata.json
    #[arg(value_name = "DIR")]
    dirs: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Log the exiftool requests without modifying any file
    #[arg(long)]
    dry_run: bool,

    /// Maximum number of files tagged at once
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Output per-directory results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.dirs.is_empty() {
        anyhow::bail!("No directories specified. Use --help for usage.");
    }

    // Load config
    let mut config = config::Config::load(cli.config.as_deref())?;
    if cli.dry_run {
        config.output.dry_run = true;
    }
    if let Some(jobs) = cli.jobs {
        config.batch.concurrency = jobs;
    }

    // A missing exiftool aborts the whole run before any directory is read
    let exiftool = ExifTool::locate(&config.exiftool)?;
    log::info!("Using {}", exiftool.program().display());
    if config.output.dry_run {
        log::info!("DRY RUN — no files will be modified");
    }
    let writer: Arc<dyn TagWriter> = Arc::new(exiftool);

    let reports = pipeline::process_directories(&cli.dirs, writer, &config).await;

    for report in &reports {
        let level = match report {
            DirectoryReport::Completed { result, .. } if result.error_count > 0 => log::Level::Warn,
            DirectoryReport::Skipped { .. } => log::Level::Error,
            _ => log::Level::Info,
        };
        log::log!(level, "{}:", report.directory().display());
        for line in report.message().lines() {
            log::log!(level, "  {line}");
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    let completed = reports
        .iter()
        .filter(|r| matches!(r, DirectoryReport::Completed { .. }))
        .count();
    log::info!("Done: {completed} of {} directories tagged", reports.len());

    Ok(())
}
