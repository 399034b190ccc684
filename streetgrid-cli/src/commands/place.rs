//! Place command - resolve a place name to its boundary polygon.

use std::path::PathBuf;

use clap::Args;

use streetgrid::output::write_json;
use streetgrid::region::polygon_to_geojson;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the place command.
#[derive(Debug, Args)]
pub struct PlaceArgs {
    /// Place name, e.g. "Montmartre, Paris"
    pub name: String,

    /// Write the boundary as a GeoJSON Polygon to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Run the place command.
pub fn run(args: PlaceArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("place");

    let resolver = runner.place_resolver()?;
    let place = runner.block_on(resolver.resolve(&args.name))?;

    println!(
        "Resolved: {}",
        place.display_name.as_deref().unwrap_or(&args.name)
    );
    let exterior = place.polygon.exterior().0.len();
    let holes = place.polygon.interiors().len();
    println!("  Boundary: {} vertices, {} hole(s)", exterior, holes);

    if let Some(output) = &args.output {
        write_json(&polygon_to_geojson(&place.polygon), output)?;
        println!("Saved: {}", output.display());
    }

    Ok(())
}
