//! Styled Map Package (SMP) generation.
//!
//! An SMP is a zip archive bundling an XYZ raster tile pyramid with a
//! MapLibre style document, consumable offline by a map renderer. The
//! pipeline plans the tile set for a WGS84 extent and zoom span, renders
//! each tile through a caller-supplied [`pyramid::TileRenderer`], writes the
//! style descriptor and assembles the archive, removing its staging
//! directory on every exit path. Entry points: [`package::generate_package`]
//! and [`package::pack_pyramid`].

pub mod archive;
pub mod cli;
pub mod error;
pub mod format;
pub mod mercator;
pub mod package;
pub mod pyramid;
pub mod style;
pub mod tile;
