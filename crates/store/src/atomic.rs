//! Replace-by-rename writes. A reader never observes a half-written table,
//! and a failed write leaves the previous file untouched.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::StoreError;

pub fn replace_file(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let persist = |source| StoreError::Persist { path: path.to_path_buf(), source };

    let directory = parent_dir(path);
    fs::create_dir_all(directory).map_err(persist)?;

    let mut staged = NamedTempFile::new_in(directory).map_err(persist)?;
    staged.write_all(contents).map_err(persist)?;
    staged.as_file().sync_all().map_err(persist)?;
    staged.persist(path).map_err(|error| persist(error.error))?;
    Ok(())
}

/// Checks that a file could be staged next to `path`, without touching `path`
/// and without creating directories. Missing parents are judged by the nearest
/// ancestor that exists, since `replace_file` would create them from there.
pub fn check_writable(path: &Path) -> Result<(), StoreError> {
    NamedTempFile::new_in(nearest_existing_dir(parent_dir(path)))
        .map(drop)
        .map_err(|source| StoreError::Persist { path: path.to_path_buf(), source })
}

fn nearest_existing_dir(directory: &Path) -> &Path {
    directory
        .ancestors()
        .find(|ancestor| !ancestor.as_os_str().is_empty() && ancestor.exists())
        .unwrap_or_else(|| Path::new("."))
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
