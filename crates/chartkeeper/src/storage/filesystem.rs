use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::StorageError;

/// What happened when a converted temp file was committed over its original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The original was replaced by the temp file.
    Renamed,
    /// There was no temp file, usually because an earlier run already renamed it.
    NoTempFile,
}

/// Copies `src` to `dst` byte for byte, replacing `dst` if it exists.
///
/// The source is opened before the destination so a missing source never
/// leaves an empty destination behind. Returns the number of bytes copied.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, StorageError> {
    let copy_err = |e| StorageError::CopyFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    };

    let mut reader = BufReader::new(File::open(src).map_err(copy_err)?);
    let mut writer = BufWriter::new(File::create(dst).map_err(copy_err)?);

    let copied = std::io::copy(&mut reader, &mut writer).map_err(copy_err)?;
    // Flush explicitly, a failure inside BufWriter's Drop would be lost
    writer.flush().map_err(copy_err)?;

    Ok(copied)
}

/// Creates `path` and any missing parents. Returns true when something was created.
pub fn ensure_directory(path: &Path) -> Result<bool, StorageError> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(true)
}

/// Deletes `old` and renames `temp` to take its place.
///
/// When `temp` does not exist nothing is touched. When `old` is already gone
/// (an earlier run died between delete and rename) the temp file is simply
/// renamed.
pub fn delete_old_rename_new(old: &Path, temp: &Path) -> Result<CommitOutcome, StorageError> {
    if !temp.exists() {
        return Ok(CommitOutcome::NoTempFile);
    }

    if old.exists() {
        std::fs::remove_file(old).map_err(|e| StorageError::DeleteFile {
            path: old.to_path_buf(),
            source: e,
        })?;
    }

    move_file(temp, old)?;
    Ok(CommitOutcome::Renamed)
}

/// Rename first (atomic on the same filesystem), then fall back to copy + delete
/// for cross-device moves.
fn move_file(src: &Path, dst: &Path) -> Result<(), StorageError> {
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    let rename_err = |e| StorageError::RenameFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    };
    std::fs::copy(src, dst).map_err(rename_err)?;
    std::fs::remove_file(src).map_err(rename_err)?;
    Ok(())
}
