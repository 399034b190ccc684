//! Download command - fetch the images listed in a GeoJSON result file.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use streetgrid::download::{ImageDownloader, DEFAULT_URL_FIELD};
use streetgrid::output::read_geojson;
use streetgrid::record::ID_FIELD;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the download command.
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// GeoJSON file written by the query command
    pub input: PathBuf,

    /// Directory receiving `<id>.jpg` files
    #[arg(long, short)]
    pub out_dir: PathBuf,

    /// Column holding the image id
    #[arg(long, default_value = ID_FIELD)]
    pub id_field: String,

    /// Column holding the image URL
    #[arg(long, default_value = DEFAULT_URL_FIELD)]
    pub url_field: String,

    /// Pause after each download in milliseconds (default from config)
    #[arg(long)]
    pub cooldown_ms: Option<u64>,
}

/// Run the download command.
pub fn run(args: DownloadArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("download");

    let records = read_geojson(&args.input)?;
    let cooldown_ms = args
        .cooldown_ms
        .unwrap_or(runner.config().download.cooldown_ms);

    println!("Downloading {} image(s):", records.len());
    println!("  Input: {}", args.input.display());
    println!("  Output directory: {}", args.out_dir.display());
    println!();

    let downloader = ImageDownloader::new(runner.http_client()?)
        .with_cooldown(Duration::from_millis(cooldown_ms));
    let summary = runner.block_on(downloader.download_all(
        &records,
        &args.out_dir,
        &args.id_field,
        &args.url_field,
    ))?;

    println!(
        "Download completed: {} succeeded, {} failed",
        summary.success, summary.failed
    );
    for error in &summary.errors {
        println!("  {}", error);
    }

    Ok(())
}
