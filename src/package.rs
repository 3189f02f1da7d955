use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::archive::zip_directory;
use crate::error::PackageError;
use crate::format::TileImageFormat;
use crate::mercator;
use crate::pyramid::{CancelToken, TileRenderer, build_pyramid, plan_levels, validate_zoom_span};
use crate::style::{SOURCE_FOLDER, STYLE_DIR, build_style};
use crate::tile::{GeoExtent, TileIndex, tile_extent};

pub use crate::mercator::MAX_ZOOM_LEVEL;

/// Validated input for one generation run. The extent is WGS84; hosts
/// holding a projected extent transform it before building the request.
#[derive(Debug, Clone)]
pub struct PackageRequest {
    pub name: String,
    pub extent: GeoExtent,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub format: TileImageFormat,
    pub output_path: PathBuf,
}

impl PackageRequest {
    pub fn validate(&self) -> Result<(), PackageError> {
        validate_zoom_span(self.min_zoom, self.max_zoom)?;
        let e = &self.extent;
        if ![e.north, e.south, e.east, e.west]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(PackageError::InvalidParameters(
                "extent coordinates must be finite".to_string(),
            ));
        }
        if e.north <= e.south {
            return Err(PackageError::InvalidParameters(format!(
                "extent north {} must be greater than south {}",
                e.north, e.south
            )));
        }
        if e.east <= e.west {
            return Err(PackageError::InvalidParameters(format!(
                "extent east {} must be greater than west {}",
                e.east, e.west
            )));
        }
        validate_output_path(&self.output_path)
    }
}

/// Generate a complete SMP archive at `request.output_path`.
///
/// Stages: temp dir → tile pyramid → style.json → zip → move into place.
/// The temporary directory is removed on every exit path, including render
/// failures, cancellation and panics; a failed run never leaves a partial
/// archive at the output path.
pub fn generate_package(
    request: &PackageRequest,
    renderer: &mut dyn TileRenderer,
    progress: &mut dyn FnMut(u64, u64),
    cancel: &CancelToken,
) -> Result<PathBuf, PackageError> {
    request.validate()?;
    info!(
        name = %request.name,
        min_zoom = request.min_zoom,
        max_zoom = request.max_zoom,
        "generating SMP package"
    );
    with_staging(|temp: &Path| {
        let stage = temp.join("package");
        let tiles_dir = stage.join(STYLE_DIR).join(SOURCE_FOLDER);
        fs::create_dir_all(&tiles_dir)
            .map_err(|err| PackageError::io("create staging directory", err))?;

        let plan = plan_levels(&request.extent, request.min_zoom, request.max_zoom);
        info!(tiles = plan.total_tiles, "planned tile pyramid");
        let rendered = build_pyramid(
            &plan,
            renderer,
            &tiles_dir,
            request.format,
            progress,
            cancel,
        )?;
        info!(tiles = rendered, "rendered tile pyramid");

        write_style(
            &stage,
            &request.name,
            request.max_zoom,
            &request.extent,
            request.format,
        )?;
        archive_stage(temp, &stage, &request.output_path)
    })
}

/// Package a pre-rendered `{z}/{x}/{y}.{ext}` pyramid directory into an SMP
/// without invoking a renderer. Max zoom and bounds are derived from the
/// tiles actually present (union of tile extents at the deepest zoom).
pub fn pack_pyramid(
    name: &str,
    tiles_dir: &Path,
    format: TileImageFormat,
    output_path: &Path,
    progress: &mut dyn FnMut(u64, u64),
) -> Result<PathBuf, PackageError> {
    let scan = scan_pyramid(tiles_dir, format)?;
    validate_output_path(output_path)?;
    info!(
        tiles = scan.tiles.len(),
        max_zoom = scan.max_zoom,
        "packing pre-rendered pyramid"
    );
    with_staging(|temp: &Path| {
        let stage = temp.join("package");
        let dest_root = stage.join(STYLE_DIR).join(SOURCE_FOLDER);
        let total = scan.tiles.len() as u64;
        for (index, (tile, source_path)) in scan.tiles.iter().enumerate() {
            let column_dir = dest_root
                .join(tile.zoom.to_string())
                .join(tile.x.to_string());
            fs::create_dir_all(&column_dir)
                .map_err(|err| PackageError::io("create tile directory", err))?;
            let dest = column_dir.join(format!("{}.{}", tile.y, format.extension()));
            fs::copy(source_path, &dest).map_err(|err| PackageError::io("copy tile", err))?;
            progress(index as u64 + 1, total);
        }
        write_style(&stage, name, scan.max_zoom, &scan.bounds, format)?;
        archive_stage(temp, &stage, output_path)
    })
}

/// Run `work` inside a fresh uniquely-named temporary directory and remove
/// the directory afterwards regardless of the outcome. `TempDir` also
/// removes it on unwind.
fn with_staging<T>(work: impl FnOnce(&Path) -> Result<T, PackageError>) -> Result<T, PackageError> {
    let temp = TempDir::with_prefix("smp-gen-")
        .map_err(|err| PackageError::io("create temporary directory", err))?;
    debug!(path = %temp.path().display(), "using temporary directory");
    let result = work(temp.path());
    if let Err(err) = temp.close() {
        warn!(error = %err, "failed to remove temporary directory");
    }
    result
}

fn write_style(
    stage: &Path,
    name: &str,
    max_zoom: u8,
    bounds: &GeoExtent,
    format: TileImageFormat,
) -> Result<(), PackageError> {
    let style = build_style(name, max_zoom, bounds, format);
    let body = serde_json::to_string_pretty(&style)
        .map_err(|err| PackageError::io("encode style document", err.into()))?;
    fs::write(stage.join("style.json"), body)
        .map_err(|err| PackageError::io("write style.json", err))
}

fn archive_stage(temp: &Path, stage: &Path, output_path: &Path) -> Result<PathBuf, PackageError> {
    let scratch = temp.join("package.smp");
    zip_directory(stage, &scratch)?;
    persist_archive(&scratch, output_path)?;
    info!(path = %output_path.display(), "created SMP package");
    Ok(output_path.to_path_buf())
}

/// Move the finished archive into place. Rename is atomic on the same
/// filesystem; temp dirs often live elsewhere, so fall back to a copy and
/// drop any partial copy if that fails.
fn persist_archive(scratch: &Path, output_path: &Path) -> Result<(), PackageError> {
    if fs::rename(scratch, output_path).is_ok() {
        return Ok(());
    }
    match fs::copy(scratch, output_path) {
        Ok(_) => Ok(()),
        Err(err) => {
            let _ = fs::remove_file(output_path);
            Err(PackageError::io("move archive into place", err))
        }
    }
}

fn validate_output_path(output_path: &Path) -> Result<(), PackageError> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(PackageError::InvalidParameters(format!(
                "output directory does not exist: {}",
                parent.display()
            )));
        }
    }
    Ok(())
}

struct PyramidScan {
    max_zoom: u8,
    bounds: GeoExtent,
    tiles: Vec<(TileIndex, PathBuf)>,
}

fn scan_pyramid(dir: &Path, format: TileImageFormat) -> Result<PyramidScan, PackageError> {
    if !dir.is_dir() {
        return Err(PackageError::InvalidParameters(format!(
            "tile directory does not exist: {}",
            dir.display()
        )));
    }
    let mut tiles = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry
            .map_err(|err| PackageError::io("scan tile directory", std::io::Error::from(err)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        match parse_tile_path(dir, entry.path(), format) {
            Some(tile) => tiles.push((tile, entry.path().to_path_buf())),
            None => debug!(path = %entry.path().display(), "skipping non-tile file"),
        }
    }
    if tiles.is_empty() {
        return Err(PackageError::InvalidParameters(format!(
            "no {{z}}/{{x}}/{{y}}.{} tiles found in {}",
            format.extension(),
            dir.display()
        )));
    }

    let max_zoom = tiles.iter().map(|(tile, _)| tile.zoom).max().unwrap_or(0);
    let mut bounds: Option<GeoExtent> = None;
    for (tile, _) in &tiles {
        if tile.zoom != max_zoom {
            continue;
        }
        let extent = tile_extent(*tile);
        bounds = Some(match bounds {
            Some(current) => current.union(&extent),
            None => extent,
        });
    }
    let bounds = bounds.ok_or_else(|| {
        PackageError::InvalidParameters("pyramid contains no tiles at its deepest zoom".to_string())
    })?;
    Ok(PyramidScan {
        max_zoom,
        bounds,
        tiles,
    })
}

fn parse_tile_path(root: &Path, path: &Path, format: TileImageFormat) -> Option<TileIndex> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = rel.components();
    let zoom: u8 = parts.next()?.as_os_str().to_str()?.parse().ok()?;
    let x: u32 = parts.next()?.as_os_str().to_str()?.parse().ok()?;
    let file = parts.next()?.as_os_str().to_str()?;
    if parts.next().is_some() {
        return None;
    }
    let suffix = format!(".{}", format.extension());
    let y: u32 = file.strip_suffix(suffix.as_str())?.parse().ok()?;
    if zoom > MAX_ZOOM_LEVEL {
        return None;
    }
    let n = mercator::tiles_per_axis(zoom);
    if x >= n || y >= n {
        return None;
    }
    Some(TileIndex { zoom, x, y })
}
