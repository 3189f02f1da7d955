use crate::mercator::{self, LonLat};

/// A WGS84 bounding box in decimal degrees. `north > south` and the
/// west/east span does not cross the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoExtent {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoExtent {
    /// Bounds in the `[west, south, east, north]` order used by style
    /// documents and TileJSON.
    pub fn bounds(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    pub fn center(&self) -> LonLat {
        LonLat {
            lon: (self.west + self.east) / 2.0,
            lat: (self.south + self.north) / 2.0,
        }
    }

    pub fn union(&self, other: &GeoExtent) -> GeoExtent {
        GeoExtent {
            north: self.north.max(other.north),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            west: self.west.min(other.west),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

/// Inclusive rectangle of tile indices at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub zoom: u8,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    pub fn count(&self) -> u64 {
        u64::from(self.max_x - self.min_x + 1) * u64::from(self.max_y - self.min_y + 1)
    }

    /// Enumerate every tile in the range, column-major (x outer, y inner),
    /// matching the order tiles are rendered and written.
    pub fn iter(self) -> impl Iterator<Item = TileIndex> {
        (self.min_x..=self.max_x).flat_map(move |x| {
            (self.min_y..=self.max_y).map(move |y| TileIndex {
                zoom: self.zoom,
                x,
                y,
            })
        })
    }
}

/// Compute the inclusive tile range intersecting `extent` at `zoom`.
///
/// Tile y grows southward, so the extent's north edge yields the smaller y.
/// A degenerate (zero-area) extent still yields a valid single-tile range.
pub fn plan_range(extent: &GeoExtent, zoom: u8) -> TileRange {
    let (min_x, min_y) = mercator::tile_indices(extent.north, extent.west, zoom);
    let (max_x, max_y) = mercator::tile_indices(extent.south, extent.east, zoom);
    TileRange {
        zoom,
        min_x,
        max_x,
        min_y,
        max_y,
    }
}

/// WGS84 bounding box of a single tile: the NW corner of the tile and the
/// NW corner of its south-east neighbour.
pub fn tile_extent(tile: TileIndex) -> GeoExtent {
    let nw = mercator::tile_nw_corner(tile.x, tile.y, tile.zoom);
    let se = mercator::tile_nw_corner(tile.x + 1, tile.y + 1, tile.zoom);
    GeoExtent {
        north: nw.lat,
        south: se.lat,
        east: se.lon,
        west: nw.lon,
    }
}
