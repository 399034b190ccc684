//! Tiled query driver

use futures::stream::{self, StreamExt};
use geo::{BoundingRect, Intersects, Polygon};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::types::{OrchestratorError, TileFailure, TileMalformedRecord, TiledQueryReport};
use crate::config::{FailurePolicy, TiledQueryConfig};
use crate::coord::{tile_range_covering_bbox, TileCoord};
use crate::filter::filter_by_polygon;
use crate::geometry::{tile_bounds_to_polygon, AxisOrder};
use crate::http::AsyncHttpClient;
use crate::metadata::{validate_request, MetadataClient, MetadataResponse, QueryError};
use crate::output::write_geojson;
use crate::record::{Projector, RecordSchema};

/// Queries an arbitrary region one map tile at a time.
///
/// The metadata API caps the number of records per request, so a large
/// region is split into tiles at the configured zoom and each intersecting
/// tile is queried on its own. Results are clipped to the region and merged
/// in tile order.
///
/// # Example
///
/// ```ignore
/// use streetgrid::http::AsyncReqwestClient;
/// use streetgrid::metadata::MetadataClient;
/// use streetgrid::orchestrator::{TiledQuery, TiledQueryConfig};
///
/// let client = MetadataClient::new(AsyncReqwestClient::new()?);
/// let query = TiledQuery::new(client, TiledQueryConfig::default().with_zoom(17));
/// let report = query.run(&polygon, &token).await?;
/// println!("{} images", report.records.len());
/// ```
pub struct TiledQuery<C: AsyncHttpClient> {
    client: MetadataClient<C>,
    config: TiledQueryConfig,
    projector: Projector,
}

/// Tiles selected for querying.
struct TilePlan {
    tiles: Vec<TileCoord>,
    total: usize,
}

impl<C: AsyncHttpClient> TiledQuery<C> {
    /// Creates a tiled query whose column schema is derived from the
    /// configured fields.
    pub fn new(client: MetadataClient<C>, config: TiledQueryConfig) -> Self {
        let projector = Projector::new(RecordSchema::for_fields(config.fields()));
        Self {
            client,
            config,
            projector,
        }
    }

    /// Replaces the column schema.
    pub fn with_schema(mut self, schema: RecordSchema) -> Self {
        self.projector = Projector::new(schema);
        self
    }

    pub fn config(&self) -> &TiledQueryConfig {
        &self.config
    }

    /// Runs the query over `region`, a polygon in (lon, lat) order.
    pub async fn run(
        &self,
        region: &Polygon<f64>,
        token: &str,
    ) -> Result<TiledQueryReport, OrchestratorError> {
        self.run_with_cancel(region, token, &CancellationToken::new())
            .await
    }

    /// Runs the query and writes the merged records as GeoJSON to `path`.
    pub async fn run_to_file(
        &self,
        region: &Polygon<f64>,
        token: &str,
        path: &Path,
    ) -> Result<TiledQueryReport, OrchestratorError> {
        let report = self.run(region, token).await?;
        write_geojson(&report.records, path)?;
        info!(path = %path.display(), records = report.records.len(), "Results written");
        Ok(report)
    }

    /// Runs the query, stopping with [`OrchestratorError::Cancelled`] when
    /// `cancel` fires.
    ///
    /// Up to `concurrency` tile queries are in flight at once, but results
    /// are consumed in tile order, so the output does not depend on which
    /// query finishes first. Dropping the stream on abort or cancellation
    /// cancels the queries still in flight.
    pub async fn run_with_cancel(
        &self,
        region: &Polygon<f64>,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<TiledQueryReport, OrchestratorError> {
        validate_request(self.config.fields(), token, self.config.limit())
            .map_err(|e| OrchestratorError::InvalidArgument(e.to_string()))?;

        let plan = self.plan(region)?;
        let mut report = TiledQueryReport {
            tiles_total: plan.total,
            tiles_skipped: plan.total - plan.tiles.len(),
            ..Default::default()
        };

        info!(
            zoom = self.config.zoom(),
            tiles = plan.total,
            to_query = plan.tiles.len(),
            concurrency = self.config.concurrency(),
            "Starting tiled query"
        );

        let client = &self.client;
        let fields = self.config.fields();
        let limit = self.config.limit();

        let queries = stream::iter(plan.tiles)
            .map(|tile| async move {
                let outcome = match tile.bounds().to_bbox() {
                    Ok(bbox) => client.query_bbox(&bbox, fields, token, limit).await,
                    Err(e) => Err(QueryError::from(e)),
                };
                (tile, outcome)
            })
            .buffered(self.config.concurrency());
        let mut queries = std::pin::pin!(queries);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(queried = report.tiles_queried, "Tiled query cancelled");
                    return Err(OrchestratorError::Cancelled);
                }
                next = queries.next() => next,
            };
            let Some((tile, outcome)) = next else {
                break;
            };

            report.tiles_queried += 1;
            match outcome {
                Ok(response) => self.merge_tile(tile, &response, region, &mut report),
                Err(e) if e.is_invalid_argument() => {
                    return Err(OrchestratorError::InvalidArgument(e.to_string()));
                }
                Err(e) => match self.config.failure_policy() {
                    FailurePolicy::Abort => {
                        warn!(tile = %tile, error = %e, "Tile query failed, aborting");
                        return Err(OrchestratorError::Query { tile, source: e });
                    }
                    FailurePolicy::SkipAndReport => {
                        warn!(tile = %tile, error = %e, "Tile query failed, skipping");
                        report.failed_tiles.push(TileFailure { tile, error: e });
                    }
                },
            }
        }

        if self.config.dedup() {
            report.duplicates_removed = report.records.dedup_by_id();
        }

        info!(
            records = report.records.len(),
            queried = report.tiles_queried,
            skipped = report.tiles_skipped,
            truncated = report.truncated_tiles.len(),
            failed = report.failed_tiles.len(),
            malformed = report.malformed_records.len(),
            duplicates = report.duplicates_removed,
            "Tiled query complete"
        );

        Ok(report)
    }

    /// Tiles of the region's bbox, minus those disjoint from the region.
    ///
    /// The grid size is checked against the configured ceiling before any
    /// tile is generated.
    fn plan(&self, region: &Polygon<f64>) -> Result<TilePlan, OrchestratorError> {
        let Some(rect) = region.bounding_rect() else {
            debug!("Empty region, nothing to query");
            return Ok(TilePlan {
                tiles: Vec::new(),
                total: 0,
            });
        };

        let zoom = self.config.zoom();
        let range = tile_range_covering_bbox(
            rect.min().y,
            rect.min().x,
            rect.max().y,
            rect.max().x,
            zoom,
        )?;
        let count = range.len();
        if count > self.config.max_tiles() {
            warn!(tiles = count, zoom, max_tiles = self.config.max_tiles(), "Region too large");
            return Err(OrchestratorError::InvalidArgument(format!(
                "region covers {} tiles at zoom {}, more than the limit of {}; lower the zoom or raise max_tiles",
                count,
                zoom,
                self.config.max_tiles()
            )));
        }
        let total = count as usize;

        // Region polygons are (lon, lat), so tile polygons must be too
        let tiles = range
            .iter()
            .filter(|tile| {
                tile_bounds_to_polygon(&tile.bounds(), AxisOrder::LonLat).intersects(region)
            })
            .collect();

        Ok(TilePlan { tiles, total })
    }

    fn merge_tile(
        &self,
        tile: TileCoord,
        response: &MetadataResponse,
        region: &Polygon<f64>,
        report: &mut TiledQueryReport,
    ) {
        if response.is_truncated() {
            report.truncated_tiles.push(tile);
        }
        if response.is_empty() {
            debug!(tile = %tile, "Tile returned no records");
            return;
        }

        let projection = self.projector.project(response);
        report.malformed_records.extend(
            projection
                .malformed
                .into_iter()
                .map(|record| TileMalformedRecord { tile, record }),
        );

        let inside = filter_by_polygon(&projection.records, region);
        debug!(
            tile = %tile,
            returned = response.count(),
            inside = inside.len(),
            "Tile merged"
        );
        report.records.extend(inside);
    }
}
