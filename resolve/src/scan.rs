use std::fs;
use std::path::{Path, PathBuf};

use crate::ResolveError;

/// Lists regular files in `dir` whose extension is in `extensions`,
/// sorted by file name. Does not recurse.
pub fn image_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, ResolveError> {
    let io_err = |source| ResolveError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}
