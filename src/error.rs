use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure kinds of a package generation run.
///
/// `InvalidParameters` is raised before any filesystem work starts; all
/// other kinds abort the run after the staging directory exists, and the
/// assembler still removes it on those paths.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("render failed for tile {zoom}/{x}/{y}: {reason}")]
    Render {
        zoom: u8,
        x: u32,
        y: u32,
        reason: String,
    },

    #[error("failed to {stage}: {source}")]
    Io {
        stage: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to write archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("generation cancelled")]
    Cancelled,
}

impl PackageError {
    pub fn io(stage: &'static str, source: io::Error) -> Self {
        PackageError::Io { stage, source }
    }
}
