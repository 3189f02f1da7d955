use std::path::{Path, PathBuf};

/// Tile image encoding, fixed for a whole generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileImageFormat {
    Png,
    Jpg,
    Webp,
}

impl TileImageFormat {
    pub fn from_str(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(TileImageFormat::Png),
            "jpg" | "jpeg" => Some(TileImageFormat::Jpg),
            "webp" => Some(TileImageFormat::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            TileImageFormat::Png => "png",
            TileImageFormat::Jpg => "jpg",
            TileImageFormat::Webp => "webp",
        }
    }
}

/// Output path for `pack`: explicit path if given, otherwise the tile
/// directory name with an `.smp` extension.
pub fn resolve_output_path(tiles_dir: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => tiles_dir.with_extension("smp"),
    }
}
