//! StreetGrid CLI - Command-line interface
//!
//! This binary provides a command-line interface to the StreetGrid library.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::{bbox, download, init, place, query};

#[derive(Parser)]
#[command(name = "streetgrid")]
#[command(version = streetgrid::VERSION)]
#[command(about = "Query street-level imagery metadata over arbitrary regions", long_about = None)]
struct Cli {
    /// Log debug output to stderr as well as the log file
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query all images inside a region, tile by tile
    Query(query::QueryArgs),

    /// Run a single metadata query for a bounding box
    Bbox(bbox::BboxArgs),

    /// Resolve a place name to its boundary polygon
    Place(place::PlaceArgs),

    /// Download the images listed in a GeoJSON result file
    Download(download::DownloadArgs),

    /// Write a default configuration file
    Init(init::InitArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Query(args) => query::run(args, cli.verbose),
        Commands::Bbox(args) => bbox::run(args, cli.verbose),
        Commands::Place(args) => place::run(args, cli.verbose),
        Commands::Download(args) => download::run(args, cli.verbose),
        Commands::Init(args) => init::run(args),
    };

    if let Err(e) = result {
        e.exit();
    }
}
