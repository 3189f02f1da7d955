use serde_json::Value;

use smp_gen::format::TileImageFormat;
use smp_gen::style::{SOURCE_ID, build_style, default_zoom, tile_url_template};
use smp_gen::tile::GeoExtent;

fn fixture_extent() -> GeoExtent {
    GeoExtent {
        north: 2.0,
        south: 1.0,
        east: 4.0,
        west: 3.0,
    }
}

fn build_fixture_value() -> Value {
    let style = build_style("Test Map", 5, &fixture_extent(), TileImageFormat::Png);
    serde_json::to_value(&style).expect("serialize style")
}

#[test]
fn source_bounds_use_west_south_east_north_order() {
    let value = build_fixture_value();
    let bounds = &value["sources"][SOURCE_ID]["bounds"];
    assert_eq!(bounds[0].as_f64(), Some(3.0));
    assert_eq!(bounds[1].as_f64(), Some(1.0));
    assert_eq!(bounds[2].as_f64(), Some(4.0));
    assert_eq!(bounds[3].as_f64(), Some(2.0));
}

#[test]
fn source_declares_full_xyz_raster_contract() {
    let value = build_fixture_value();
    let source = &value["sources"][SOURCE_ID];
    assert_eq!(source["type"].as_str(), Some("raster"));
    assert_eq!(source["scheme"].as_str(), Some("xyz"));
    assert_eq!(source["format"].as_str(), Some("png"));
    assert_eq!(source["minzoom"].as_u64(), Some(0));
    assert_eq!(source["maxzoom"].as_u64(), Some(5));
    assert_eq!(
        source["tiles"][0].as_str(),
        Some("smp://maps.v1/s/0/{z}/{x}/{y}.png")
    );
}

#[test]
fn default_layers_are_background_then_raster() {
    let value = build_fixture_value();
    let layers = value["layers"].as_array().expect("layers");
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0]["type"].as_str(), Some("background"));
    assert!(layers[0].get("source").is_none());
    assert_eq!(layers[1]["type"].as_str(), Some("raster"));
    assert_eq!(layers[1]["source"].as_str(), Some(SOURCE_ID));
}

#[test]
fn metadata_duplicates_bounds_maxzoom_and_source_folders() {
    let value = build_fixture_value();
    let metadata = &value["metadata"];
    assert_eq!(metadata["smp:maxzoom"].as_u64(), Some(5));
    assert_eq!(metadata["smp:bounds"][0].as_f64(), Some(3.0));
    assert_eq!(metadata["smp:bounds"][3].as_f64(), Some(2.0));
    assert_eq!(metadata["smp:sourceFolders"][SOURCE_ID].as_str(), Some("0"));
}

#[test]
fn root_center_and_zoom_come_from_the_bounds_centroid() {
    let value = build_fixture_value();
    assert_eq!(value["version"].as_u64(), Some(8));
    assert_eq!(value["name"].as_str(), Some("Test Map"));
    assert_eq!(value["center"][0].as_f64(), Some(3.5));
    assert_eq!(value["center"][1].as_f64(), Some(1.5));
    assert_eq!(value["zoom"].as_u64(), Some(3));
}

#[test]
fn default_zoom_is_clamped_both_ways() {
    assert_eq!(default_zoom(0), 0);
    assert_eq!(default_zoom(1), 0);
    assert_eq!(default_zoom(5), 3);
    assert_eq!(default_zoom(20), 11);
}

#[test]
fn url_template_follows_the_tile_format() {
    assert_eq!(
        tile_url_template(TileImageFormat::Jpg),
        "smp://maps.v1/s/0/{z}/{x}/{y}.jpg"
    );
    assert_eq!(
        tile_url_template(TileImageFormat::Webp),
        "smp://maps.v1/s/0/{z}/{x}/{y}.webp"
    );
}
