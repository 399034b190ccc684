//! Query command - tiled metadata query over a region.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use streetgrid::config::{ConfigFile, FailurePolicy, TiledQueryConfig};
use streetgrid::orchestrator::{TiledQuery, TiledQueryReport};
use streetgrid::output::write_geojson;

use super::common::{parse_field_list, resolve_region, RegionArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the query command.
#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub region: RegionArgs,

    /// Output GeoJSON file
    #[arg(long, short)]
    pub output: PathBuf,

    /// Tile zoom level (higher means smaller tiles and more queries)
    #[arg(long)]
    pub zoom: Option<u8>,

    /// Maximum records per tile query
    #[arg(long)]
    pub limit: Option<u32>,

    /// Number of tile queries in flight
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Refuse regions covering more tiles than this
    #[arg(long)]
    pub max_tiles: Option<u64>,

    /// Comma-separated fields to request (geometry is always added)
    #[arg(long)]
    pub fields: Option<String>,

    /// Keep going when a tile query fails, reporting the failed tiles
    #[arg(long)]
    pub skip_failed_tiles: bool,

    /// Keep records with duplicate ids
    #[arg(long)]
    pub no_dedup: bool,

    /// API access token (overrides environment, token file and config)
    #[arg(long)]
    pub token: Option<String>,
}

/// Run the query command.
pub fn run(args: QueryArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("query");

    let token = runner.resolve_token(args.token.clone())?;
    let config = build_config(&args, runner.config());
    let polygon = resolve_region(&runner, &args.region)?;

    println!("Querying region:");
    println!("  Zoom: {}", config.zoom());
    println!("  Limit per tile: {}", config.limit());
    println!("  Concurrency: {}", config.concurrency());
    println!("  Max tiles: {}", config.max_tiles());
    println!("  Failure policy: {}", config.failure_policy());
    println!();

    let query = TiledQuery::new(runner.metadata_client()?, config);
    let cancel = CancellationToken::new();
    let start = Instant::now();

    let report = runner.block_on(async {
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling query");
                on_interrupt.cancel();
            }
        });
        query.run_with_cancel(&polygon, &token.token, &cancel).await
    })?;

    write_geojson(&report.records, &args.output)?;
    info!(path = %args.output.display(), records = report.records.len(), "Results written");

    print_report(&report, start.elapsed().as_secs_f64());
    println!("Saved: {}", args.output.display());

    Ok(())
}

/// Config file settings overridden by command-line flags.
fn build_config(args: &QueryArgs, file: &ConfigFile) -> TiledQueryConfig {
    let mut config = file.tiled_query_config();
    if let Some(zoom) = args.zoom {
        config = config.with_zoom(zoom);
    }
    if let Some(limit) = args.limit {
        config = config.with_limit(limit);
    }
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(max_tiles) = args.max_tiles {
        config = config.with_max_tiles(max_tiles);
    }
    if let Some(fields) = &args.fields {
        config = config.with_fields(parse_field_list(fields));
    }
    if args.skip_failed_tiles {
        config = config.with_failure_policy(FailurePolicy::SkipAndReport);
    }
    if args.no_dedup {
        config = config.with_dedup(false);
    }
    config
}

fn print_report(report: &TiledQueryReport, elapsed_secs: f64) {
    println!("Query completed in {:.2}s", elapsed_secs);
    println!("  Images: {}", report.records.len());
    println!(
        "  Tiles: {} queried, {} skipped, {} total",
        report.tiles_queried, report.tiles_skipped, report.tiles_total
    );
    if report.duplicates_removed > 0 {
        println!("  Duplicates removed: {}", report.duplicates_removed);
    }
    if !report.malformed_records.is_empty() {
        println!(
            "  Malformed records dropped: {}",
            report.malformed_records.len()
        );
    }
    if !report.truncated_tiles.is_empty() {
        println!(
            "  Warning: {} tile(s) hit the record limit; rerun with a higher --zoom",
            report.truncated_tiles.len()
        );
        for tile in &report.truncated_tiles {
            println!("    {}", tile);
        }
    }
    if !report.failed_tiles.is_empty() {
        println!("  Warning: {} tile(s) failed:", report.failed_tiles.len());
        for failure in &report.failed_tiles {
            println!("    {}: {}", failure.tile, failure.error);
        }
    }
}
