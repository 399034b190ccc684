//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use geo::Polygon;
use tracing::info;

use streetgrid::metadata::GEOMETRY_FIELD;
use streetgrid::output::read_json;
use streetgrid::region::Region;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Region selection shared by commands that query an area.
#[derive(Debug, Args)]
pub struct RegionArgs {
    /// GeoJSON file holding the region polygon (Polygon, Feature or FeatureCollection)
    #[arg(long, conflicts_with_all = ["place", "lon", "lat", "radius"])]
    pub polygon: Option<PathBuf>,

    /// Place name resolved to its boundary polygon
    #[arg(long, conflicts_with_all = ["lon", "lat", "radius"])]
    pub place: Option<String>,

    /// Center longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, requires_all = ["lat", "radius"])]
    pub lon: Option<f64>,

    /// Center latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, requires_all = ["lon", "radius"])]
    pub lat: Option<f64>,

    /// Half-width of the square around the center, in meters
    #[arg(long, requires_all = ["lon", "lat"])]
    pub radius: Option<f64>,
}

impl RegionArgs {
    /// Describe which region source was selected, before any I/O.
    pub fn to_source(&self) -> Result<RegionSource, CliError> {
        if let Some(path) = &self.polygon {
            return Ok(RegionSource::File(path.clone()));
        }
        if let Some(name) = &self.place {
            return Ok(RegionSource::Place(name.clone()));
        }
        match (self.lon, self.lat, self.radius) {
            (Some(lon), Some(lat), Some(radius_m)) => Ok(RegionSource::Radius(Region::radius(
                lon, lat, radius_m,
            )?)),
            _ => Err(CliError::InvalidArgument(
                "a region is required: --polygon, --place, or --lon/--lat/--radius".to_string(),
            )),
        }
    }
}

/// Where the query region comes from.
#[derive(Debug)]
pub enum RegionSource {
    File(PathBuf),
    Place(String),
    Radius(Region),
}

/// Resolve the region arguments to a (lon, lat) polygon.
pub fn resolve_region(runner: &CliRunner, args: &RegionArgs) -> Result<Polygon<f64>, CliError> {
    match args.to_source()? {
        RegionSource::File(path) => {
            let value = read_json(&path)?;
            let region = Region::from_geojson(&value)?;
            info!(path = %path.display(), "Loaded region polygon");
            Ok(region.to_polygon()?)
        }
        RegionSource::Place(name) => {
            let resolver = runner.place_resolver()?;
            let place = runner.block_on(resolver.resolve(&name))?;
            println!(
                "Resolved place: {}",
                place.display_name.as_deref().unwrap_or(&name)
            );
            Ok(place.polygon)
        }
        RegionSource::Radius(region) => Ok(region.to_polygon()?),
    }
}

/// Parse a comma-separated field list, adding `geometry` if it is missing.
pub fn parse_field_list(raw: &str) -> Vec<String> {
    let mut fields: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(String::from)
        .collect();
    if !fields.iter().any(|f| f == GEOMETRY_FIELD) {
        fields.push(GEOMETRY_FIELD.to_string());
    }
    fields
}
