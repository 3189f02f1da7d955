use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

use smp_gen::error::PackageError;
use smp_gen::format::TileImageFormat;
use smp_gen::package::{PackageRequest, generate_package, pack_pyramid};
use smp_gen::pyramid::{CancelToken, TileRenderer};
use smp_gen::tile::GeoExtent;

struct FakeRenderer {
    calls: u64,
    fail_at: Option<u64>,
}

impl FakeRenderer {
    fn new() -> Self {
        FakeRenderer {
            calls: 0,
            fail_at: None,
        }
    }
}

impl TileRenderer for FakeRenderer {
    fn render_tile(
        &mut self,
        extent: &GeoExtent,
        _width: u32,
        _height: u32,
    ) -> anyhow::Result<Vec<u8>> {
        self.calls += 1;
        if Some(self.calls) == self.fail_at {
            anyhow::bail!("canvas render aborted");
        }
        Ok(format!("tile#{} w={:.6} n={:.6}", self.calls, extent.west, extent.north).into_bytes())
    }
}

fn unit_request(output_path: &Path) -> PackageRequest {
    PackageRequest {
        name: "Fixture Map".to_string(),
        extent: GeoExtent {
            north: 1.0,
            south: 0.0,
            east: 1.0,
            west: 0.0,
        },
        min_zoom: 0,
        max_zoom: 1,
        format: TileImageFormat::Png,
        output_path: output_path.to_path_buf(),
    }
}

fn archive_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let file = File::open(path).expect("open archive");
    let mut zip = ZipArchive::new(file).expect("read archive");
    let mut entries = Vec::new();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).expect("entry");
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).expect("read entry");
        entries.push((entry.name().to_string(), bytes));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

#[test]
fn generates_archive_with_style_and_pyramid_at_the_root() {
    let out = tempfile::tempdir().expect("tempdir");
    let output = out.path().join("fixture.smp");
    let request = unit_request(&output);
    let mut renderer = FakeRenderer::new();
    let mut last = (0u64, 0u64);

    let path = generate_package(
        &request,
        &mut renderer,
        &mut |done, total| last = (done, total),
        &CancelToken::new(),
    )
    .expect("generate");

    assert_eq!(path, output);
    assert_eq!(last, (3, 3));

    let entries = archive_entries(&output);
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["s/0/0/0/0.png", "s/0/1/1/0.png", "s/0/1/1/1.png", "style.json"]);

    let style: serde_json::Value =
        serde_json::from_slice(&entries[3].1).expect("parse style.json");
    assert_eq!(style["metadata"]["smp:maxzoom"].as_u64(), Some(1));
    assert_eq!(style["sources"]["mbtiles-source"]["bounds"][0].as_f64(), Some(0.0));
    assert_eq!(style["sources"]["mbtiles-source"]["bounds"][3].as_f64(), Some(1.0));
}

#[test]
fn identical_requests_produce_identical_tile_bytes() {
    let out = tempfile::tempdir().expect("tempdir");
    let first = out.path().join("first.smp");
    let second = out.path().join("second.smp");

    for output in [&first, &second] {
        let request = unit_request(output);
        let mut renderer = FakeRenderer::new();
        generate_package(&request, &mut renderer, &mut |_, _| {}, &CancelToken::new())
            .expect("generate");
    }

    assert_eq!(archive_entries(&first), archive_entries(&second));
}

#[test]
fn inverted_zoom_range_fails_before_any_work() {
    let out = tempfile::tempdir().expect("tempdir");
    let output = out.path().join("fixture.smp");
    let mut request = unit_request(&output);
    request.min_zoom = 5;
    request.max_zoom = 3;
    let mut renderer = FakeRenderer::new();

    let err = generate_package(&request, &mut renderer, &mut |_, _| {}, &CancelToken::new())
        .expect_err("should fail");

    assert!(matches!(err, PackageError::InvalidParameters(_)));
    assert!(err.to_string().contains("min zoom"));
    assert_eq!(renderer.calls, 0);
    assert!(!output.exists());
}

#[test]
fn zoom_above_grid_limit_is_rejected() {
    let out = tempfile::tempdir().expect("tempdir");
    let output = out.path().join("fixture.smp");
    let mut request = unit_request(&output);
    request.max_zoom = 25;
    let mut renderer = FakeRenderer::new();

    let err = generate_package(&request, &mut renderer, &mut |_, _| {}, &CancelToken::new())
        .expect_err("should fail");

    assert!(matches!(err, PackageError::InvalidParameters(_)));
}

#[test]
fn missing_output_directory_is_rejected() {
    let out = tempfile::tempdir().expect("tempdir");
    let output = out.path().join("no-such-dir").join("fixture.smp");
    let request = unit_request(&output);
    let mut renderer = FakeRenderer::new();

    let err = generate_package(&request, &mut renderer, &mut |_, _| {}, &CancelToken::new())
        .expect_err("should fail");

    assert!(matches!(err, PackageError::InvalidParameters(_)));
    assert!(err.to_string().contains("output directory"));
}

#[test]
fn render_failure_leaves_no_output_file() {
    let out = tempfile::tempdir().expect("tempdir");
    let output = out.path().join("fixture.smp");
    let request = unit_request(&output);
    let mut renderer = FakeRenderer::new();
    renderer.fail_at = Some(2);

    let err = generate_package(&request, &mut renderer, &mut |_, _| {}, &CancelToken::new())
        .expect_err("should fail");

    assert!(matches!(err, PackageError::Render { .. }));
    assert!(!output.exists());
}

#[test]
fn cancelled_token_aborts_without_output() {
    let out = tempfile::tempdir().expect("tempdir");
    let output = out.path().join("fixture.smp");
    let request = unit_request(&output);
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut renderer = FakeRenderer::new();

    let err = generate_package(&request, &mut renderer, &mut |_, _| {}, &cancel)
        .expect_err("should cancel");

    assert!(matches!(err, PackageError::Cancelled));
    assert!(!output.exists());
}

#[test]
fn pack_builds_an_archive_from_existing_tiles() {
    let work = tempfile::tempdir().expect("tempdir");
    let tiles = work.path().join("tiles");
    fs::create_dir_all(tiles.join("1/0")).expect("mkdir");
    fs::create_dir_all(tiles.join("1/1")).expect("mkdir");
    fs::write(tiles.join("1/0/0.png"), b"left").expect("write tile");
    fs::write(tiles.join("1/1/0.png"), b"right").expect("write tile");
    fs::write(tiles.join("README.txt"), b"not a tile").expect("write junk");

    let output = work.path().join("tiles.smp");
    let path = pack_pyramid(
        "Prebuilt",
        &tiles,
        TileImageFormat::Png,
        &output,
        &mut |_, _| {},
    )
    .expect("pack");

    assert_eq!(path, output);
    let entries = archive_entries(&output);
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["s/0/1/0/0.png", "s/0/1/1/0.png", "style.json"]);

    let style: serde_json::Value =
        serde_json::from_slice(&entries[2].1).expect("parse style.json");
    assert_eq!(style["metadata"]["smp:maxzoom"].as_u64(), Some(1));
    // Union of the two northern z1 tiles spans the top half of the grid.
    let bounds = &style["sources"]["mbtiles-source"]["bounds"];
    assert!((bounds[0].as_f64().expect("west") - -180.0).abs() < 1e-9);
    assert!(bounds[1].as_f64().expect("south").abs() < 1e-9);
    assert!((bounds[2].as_f64().expect("east") - 180.0).abs() < 1e-9);
    assert!((bounds[3].as_f64().expect("north") - 85.05112877980659).abs() < 1e-9);
}

#[test]
fn pack_rejects_a_directory_without_tiles() {
    let work = tempfile::tempdir().expect("tempdir");
    let tiles = work.path().join("tiles");
    fs::create_dir_all(&tiles).expect("mkdir");

    let err = pack_pyramid(
        "Empty",
        &tiles,
        TileImageFormat::Png,
        &work.path().join("tiles.smp"),
        &mut |_, _| {},
    )
    .expect_err("should fail");

    assert!(matches!(err, PackageError::InvalidParameters(_)));
    assert!(err.to_string().contains("no {z}/{x}/{y}.png tiles"));
}
