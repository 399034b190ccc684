//! Bbox command - one metadata query, raw response saved as JSON.

use std::path::PathBuf;

use clap::Args;

use streetgrid::output::write_json;

use super::common::parse_field_list;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the bbox command.
#[derive(Debug, Args)]
pub struct BboxArgs {
    /// West edge in decimal degrees
    #[arg(allow_negative_numbers = true)]
    pub min_lon: f64,

    /// South edge in decimal degrees
    #[arg(allow_negative_numbers = true)]
    pub min_lat: f64,

    /// East edge in decimal degrees
    #[arg(allow_negative_numbers = true)]
    pub max_lon: f64,

    /// North edge in decimal degrees
    #[arg(allow_negative_numbers = true)]
    pub max_lat: f64,

    /// Output JSON file
    #[arg(long, short)]
    pub output: PathBuf,

    /// Maximum records to return
    #[arg(long)]
    pub limit: Option<u32>,

    /// Comma-separated fields to request (geometry is always added)
    #[arg(long)]
    pub fields: Option<String>,

    /// API access token (overrides environment, token file and config)
    #[arg(long)]
    pub token: Option<String>,
}

/// Run the bbox command.
pub fn run(args: BboxArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("bbox");

    let token = runner.resolve_token(args.token)?;
    let config = runner.config();
    let limit = args.limit.unwrap_or(config.api.limit);
    let fields = match &args.fields {
        Some(raw) => parse_field_list(raw),
        None => config.query.fields.clone(),
    };

    println!(
        "Querying bbox {},{},{},{} (limit {})",
        args.min_lon, args.min_lat, args.max_lon, args.max_lat, limit
    );

    let client = runner.metadata_client()?;
    let response = runner.block_on(client.query_metadata(
        args.min_lon,
        args.min_lat,
        args.max_lon,
        args.max_lat,
        &fields,
        &token.token,
        limit,
    ))?;

    write_json(&response, &args.output)?;

    println!("  Images: {}", response.count());
    if response.is_truncated() {
        println!("  Warning: result hit the limit of {}; more images may exist", limit);
    }
    println!("Saved: {}", args.output.display());

    Ok(())
}
