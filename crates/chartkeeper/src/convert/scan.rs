use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

/// Lists the entries directly inside `dir` whose names end with `.<extension>`,
/// ignoring case. Directories are included; callers filter as they need.
///
/// Returns `None` when `dir` does not exist or is not a folder.
pub fn list_with_extension(dir: &Path, extension: &str) -> Option<Vec<PathBuf>> {
    if !dir.is_dir() {
        return None;
    }

    let wanted = format!(".{}", extension.to_lowercase());
    let entries: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| name.to_lowercase().ends_with(&wanted))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    debug!(
        "Found {} entries matching '{}' in {}",
        entries.len(),
        wanted,
        dir.display()
    );
    Some(entries)
}
