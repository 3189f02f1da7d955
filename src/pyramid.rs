use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::error::PackageError;
use crate::format::TileImageFormat;
use crate::tile::{GeoExtent, TileRange, plan_range, tile_extent};

/// Tiles are rendered at the standard slippy-map size.
pub const TILE_PIXELS: u32 = 256;

/// Renders one tile's geographic extent into an encoded raster image.
///
/// Implemented by the host (a map canvas, a WMS client, ...). The builder
/// calls it synchronously, one tile at a time, in a deterministic order; it
/// is never invoked concurrently.
pub trait TileRenderer {
    fn render_tile(
        &mut self,
        extent: &GeoExtent,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Vec<u8>>;
}

/// Cooperative cancellation flag shared between a generation run and its
/// host. Checked between tiles; a cancelled run aborts with
/// [`PackageError::Cancelled`] and still gets its cleanup.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-zoom tile ranges plus the grand total, computed before any rendering
/// so progress reporting is accurate from the first tile.
#[derive(Debug, Clone)]
pub struct PyramidPlan {
    pub levels: Vec<TileRange>,
    pub total_tiles: u64,
}

/// Reject zoom spans the grid math cannot represent. Shared by request
/// validation and the untrusted `plan` entry point.
pub fn validate_zoom_span(min_zoom: u8, max_zoom: u8) -> Result<(), PackageError> {
    if min_zoom > max_zoom {
        return Err(PackageError::InvalidParameters(format!(
            "min zoom {min_zoom} exceeds max zoom {max_zoom}"
        )));
    }
    if max_zoom > crate::mercator::MAX_ZOOM_LEVEL {
        return Err(PackageError::InvalidParameters(format!(
            "max zoom {max_zoom} exceeds supported maximum {}",
            crate::mercator::MAX_ZOOM_LEVEL
        )));
    }
    Ok(())
}

/// Validating variant of [`plan_levels`] for zoom input that has not been
/// through [`crate::package::PackageRequest::validate`] yet.
pub fn try_plan_levels(
    extent: &GeoExtent,
    min_zoom: u8,
    max_zoom: u8,
) -> Result<PyramidPlan, PackageError> {
    validate_zoom_span(min_zoom, max_zoom)?;
    Ok(plan_levels(extent, min_zoom, max_zoom))
}

pub fn plan_levels(extent: &GeoExtent, min_zoom: u8, max_zoom: u8) -> PyramidPlan {
    let mut levels = Vec::new();
    let mut total_tiles = 0u64;
    for zoom in min_zoom..=max_zoom {
        let range = plan_range(extent, zoom);
        total_tiles += range.count();
        levels.push(range);
    }
    PyramidPlan {
        levels,
        total_tiles,
    }
}

/// Render every tile of `plan` into `{tiles_dir}/{z}/{x}/{y}.{ext}`.
///
/// `progress` receives a monotone `(done, total)` after each tile. A failed
/// or empty render aborts the whole run; individual tiles are not retried.
/// Returns the number of tiles written.
pub fn build_pyramid(
    plan: &PyramidPlan,
    renderer: &mut dyn TileRenderer,
    tiles_dir: &Path,
    format: TileImageFormat,
    progress: &mut dyn FnMut(u64, u64),
    cancel: &CancelToken,
) -> Result<u64, PackageError> {
    let mut done = 0u64;
    for range in &plan.levels {
        info!(
            zoom = range.zoom,
            tiles = range.count(),
            columns = range.max_x - range.min_x + 1,
            rows = range.max_y - range.min_y + 1,
            "rendering zoom level"
        );
        for tile in range.iter() {
            if cancel.is_cancelled() {
                return Err(PackageError::Cancelled);
            }
            let extent = tile_extent(tile);
            let bytes = renderer
                .render_tile(&extent, TILE_PIXELS, TILE_PIXELS)
                .map_err(|err| PackageError::Render {
                    zoom: tile.zoom,
                    x: tile.x,
                    y: tile.y,
                    reason: err.to_string(),
                })?;
            if bytes.is_empty() {
                return Err(PackageError::Render {
                    zoom: tile.zoom,
                    x: tile.x,
                    y: tile.y,
                    reason: "renderer returned an empty image".to_string(),
                });
            }
            let column_dir = tiles_dir
                .join(tile.zoom.to_string())
                .join(tile.x.to_string());
            fs::create_dir_all(&column_dir)
                .map_err(|err| PackageError::io("create tile directory", err))?;
            let tile_path = column_dir.join(format!("{}.{}", tile.y, format.extension()));
            fs::write(&tile_path, &bytes).map_err(|err| PackageError::io("write tile", err))?;
            done += 1;
            progress(done, plan.total_tiles);
        }
    }
    Ok(done)
}
