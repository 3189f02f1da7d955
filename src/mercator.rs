use std::f64::consts::PI;

/// Latitude where the Web Mercator projection is cut off. Beyond this the
/// forward transform diverges, so inputs are clamped to the range.
pub const MAX_MERCATOR_LAT: f64 = 85.0511;

/// Deepest supported zoom level (2^24 tiles per axis). Grid math assumes
/// zoom stays within this limit; callers validate untrusted input first.
pub const MAX_ZOOM_LEVEL: u8 = 24;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

/// Number of tiles along one axis at `zoom` (2^zoom).
pub fn tiles_per_axis(zoom: u8) -> u32 {
    1u32 << zoom
}

/// Convert a WGS84 coordinate to the (x, y) index of the tile containing it,
/// per the OpenStreetMap slippy-map tilenames convention.
///
/// Latitude is clamped to the Mercator-valid range before the transform, so
/// extents touching the poles resolve to the outermost tile row instead of
/// producing out-of-range indices. The result is always within
/// `[0, 2^zoom - 1]` on both axes.
pub fn tile_indices(lat: f64, lon: f64, zoom: u8) -> (u32, u32) {
    let n = f64::from(tiles_per_axis(zoom));
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let lat_rad = lat.to_radians();
    let x = ((lon + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor();
    let max = tiles_per_axis(zoom) - 1;
    (clamp_index(x, max), clamp_index(y, max))
}

/// WGS84 coordinate of the north-west corner of tile (x, y).
///
/// Exact inverse of [`tile_indices`] for interior points. Accepts `x == n`
/// and `y == n` so a tile's south-east corner can be read off the next
/// tile's north-west corner.
pub fn tile_nw_corner(x: u32, y: u32, zoom: u8) -> LonLat {
    let n = f64::from(tiles_per_axis(zoom));
    let lon = f64::from(x) / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * f64::from(y) / n)).sinh().atan().to_degrees();
    LonLat { lon, lat }
}

fn clamp_index(value: f64, max: u32) -> u32 {
    if value < 0.0 {
        0
    } else if value > f64::from(max) {
        max
    } else {
        value as u32
    }
}
