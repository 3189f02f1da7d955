use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Value, json};

use crate::format::TileImageFormat;
use crate::tile::GeoExtent;

pub const STYLE_VERSION: u32 = 8;

/// Key of the single raster source in the style document.
pub const SOURCE_ID: &str = "mbtiles-source";

/// Top-level archive directory holding per-source tile folders.
pub const STYLE_DIR: &str = "s";

/// Folder under [`STYLE_DIR`] holding this source's tile pyramid.
pub const SOURCE_FOLDER: &str = "0";

#[derive(Debug, Clone, Serialize)]
pub struct StyleDocument {
    pub version: u32,
    pub name: String,
    pub sources: BTreeMap<String, RasterSource>,
    pub layers: Vec<StyleLayer>,
    pub metadata: StyleMetadata,
    pub center: [f64; 2],
    pub zoom: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct RasterSource {
    pub format: String,
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub minzoom: u8,
    pub maxzoom: u8,
    pub scheme: String,
    /// `[west, south, east, north]`, the TileJSON axis order.
    pub bounds: [f64; 4],
    pub center: [f64; 3],
    pub tiles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StyleLayer {
    pub id: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub paint: Value,
}

/// Duplicates bounds/maxzoom/source-folder mapping so package consumers can
/// locate tiles without parsing the full style.
#[derive(Debug, Clone, Serialize)]
pub struct StyleMetadata {
    #[serde(rename = "smp:bounds")]
    pub bounds: [f64; 4],
    #[serde(rename = "smp:maxzoom")]
    pub maxzoom: u8,
    #[serde(rename = "smp:sourceFolders")]
    pub source_folders: BTreeMap<String, String>,
}

/// Tile URL template pointing into the archive's own pyramid layout.
pub fn tile_url_template(format: TileImageFormat) -> String {
    format!(
        "smp://maps.v1/{STYLE_DIR}/{SOURCE_FOLDER}/{{z}}/{{x}}/{{y}}.{}",
        format.extension()
    )
}

/// Display-hint zoom for the document root, two levels above the deepest
/// tiles and capped for very deep pyramids.
pub fn default_zoom(max_zoom: u8) -> u8 {
    max_zoom.saturating_sub(2).min(11)
}

/// Build the style document: one raster source over the generated pyramid,
/// a white background layer and a raster layer referencing it.
pub fn build_style(
    name: &str,
    max_zoom: u8,
    bounds: &GeoExtent,
    format: TileImageFormat,
) -> StyleDocument {
    let center = bounds.center();
    let zoom = default_zoom(max_zoom);

    let source = RasterSource {
        format: format.extension().to_string(),
        name: name.to_string(),
        version: "2.0".to_string(),
        source_type: "raster".to_string(),
        minzoom: 0,
        maxzoom: max_zoom,
        scheme: "xyz".to_string(),
        bounds: bounds.bounds(),
        center: [center.lon, center.lat, f64::from(zoom)],
        tiles: vec![tile_url_template(format)],
    };

    let mut sources = BTreeMap::new();
    sources.insert(SOURCE_ID.to_string(), source);

    let mut source_folders = BTreeMap::new();
    source_folders.insert(SOURCE_ID.to_string(), SOURCE_FOLDER.to_string());

    StyleDocument {
        version: STYLE_VERSION,
        name: name.to_string(),
        sources,
        layers: vec![
            StyleLayer {
                id: "background".to_string(),
                layer_type: "background".to_string(),
                source: None,
                paint: json!({ "background-color": "white" }),
            },
            StyleLayer {
                id: "raster".to_string(),
                layer_type: "raster".to_string(),
                source: Some(SOURCE_ID.to_string()),
                paint: json!({ "raster-opacity": 1 }),
            },
        ],
        metadata: StyleMetadata {
            bounds: bounds.bounds(),
            maxzoom: max_zoom,
            source_folders,
        },
        center: [center.lon, center.lat],
        zoom,
    }
}
