use std::fs::File;
use std::io;
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PackageError;

/// Deflate every file under `source_dir` into a zip at `archive_path`.
///
/// Entry names are relative to `source_dir` with forward slashes, so the
/// archive root holds `style.json` and the source tree directly. Entries are
/// written in sorted path order for reproducible archives.
pub fn zip_directory(source_dir: &Path, archive_path: &Path) -> Result<(), PackageError> {
    let file =
        File::create(archive_path).map_err(|err| PackageError::io("create archive file", err))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry
            .map_err(|err| PackageError::io("walk staging directory", io::Error::from(err)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = match relative_entry_name(source_dir, entry.path()) {
            Some(name) => name,
            None => continue,
        };
        writer
            .start_file(name, options)
            .map_err(|err| PackageError::Archive {
                path: archive_path.to_path_buf(),
                source: err,
            })?;
        let mut source =
            File::open(entry.path()).map_err(|err| PackageError::io("read staged file", err))?;
        io::copy(&mut source, &mut writer)
            .map_err(|err| PackageError::io("compress staged file", err))?;
    }

    writer.finish().map_err(|err| PackageError::Archive {
        path: archive_path.to_path_buf(),
        source: err,
    })?;
    Ok(())
}

fn relative_entry_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
