//! Interactive selection and single-file deletion.
//!
//! # Overview
//!
//! Given a duplicate set, [`select_delete`] renders a 1-based numbered
//! list plus a `[0] DO NOTHING` option, reads one line from an injected
//! input source, and deletes at most one member of the set. Invalid
//! input (non-numeric, out of range) is rejected with a diagnostic and
//! leaves the filesystem untouched; a file that vanished between
//! rendering and deletion is reported as a skipped no-op.
//!
//! # Safety
//!
//! A size/mtime snapshot of every member is taken when the list is
//! rendered and re-verified before deletion, so a file modified while
//! the prompt was open is refused. Exactly one file can be deleted per
//! invocation, and only a member of the set passed in.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

use crate::duplicates::DuplicateSet;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (deleted or moved since the scan).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File was modified since the snapshot was taken.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Error type for interpreting a selection line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The input was not a number.
    #[error("not a number: '{0}'")]
    NotANumber(String),

    /// The number was outside 0..=len.
    #[error("selection {index} out of range (choose 0 to {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

/// Configuration for deletion operations.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    /// Move files to the system trash instead of unlinking them.
    pub use_trash: bool,
    /// Verify the snapshot (size + mtime) before deletion.
    pub verify_snapshot: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            use_trash: false,
            verify_snapshot: true,
        }
    }
}

impl DeleteConfig {
    /// Create config for recoverable deletion via the system trash.
    #[must_use]
    pub fn trash() -> Self {
        Self {
            use_trash: true,
            ..Self::default()
        }
    }

    /// Enable/disable snapshot verification.
    #[must_use]
    pub fn with_verify_snapshot(mut self, verify: bool) -> Self {
        self.verify_snapshot = verify;
        self
    }
}

/// File metadata snapshot for pre-deletion verification.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    /// Path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub mtime: Option<SystemTime>,
}

impl FileSnapshot {
    /// Create a snapshot of a file's current state.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist or can't be accessed.
    pub fn capture(path: &Path) -> Result<Self, DeleteError> {
        let metadata = fs::metadata(path).map_err(|e| classify_io(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            mtime: metadata.modified().ok(),
        })
    }

    /// Verify that the file still matches this snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the file was modified, deleted, or can't be
    /// accessed.
    pub fn verify(&self) -> Result<(), DeleteError> {
        let current = Self::capture(&self.path)?;

        if let (Some(orig), Some(curr)) = (self.mtime, current.mtime) {
            if orig != curr {
                log::warn!(
                    "File modified since scan: {} (mtime changed)",
                    self.path.display()
                );
                return Err(DeleteError::Modified(self.path.clone()));
            }
        }

        if self.size != current.size {
            log::warn!(
                "File modified since scan: {} (size changed from {} to {})",
                self.path.display(),
                self.size,
                current.size
            );
            return Err(DeleteError::Modified(self.path.clone()));
        }

        Ok(())
    }
}

/// Classify a raw I/O error against the path being deleted.
fn classify_io(path: &Path, error: io::Error) -> DeleteError {
    match error.kind() {
        io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
        _ => DeleteError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}

/// Delete a single file according to the configuration.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `TrashFailed` if the trash operation fails
fn delete_file(path: &Path, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    let metadata = fs::metadata(path).map_err(|e| classify_io(path, e))?;
    let size = metadata.len();

    if config.use_trash {
        trash::delete(path).map_err(|e| {
            log::error!("Trash operation failed for {}: {}", path.display(), e);
            DeleteError::TrashFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    } else {
        fs::remove_file(path).map_err(|e| classify_io(path, e))?;
        log::info!("Deleted: {} ({} bytes)", path.display(), size);
    }

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: !config.use_trash,
    })
}

/// Interpret one line of selection input.
///
/// Empty input and `0` both mean "do nothing". A value in 1..=len
/// selects that list entry. Anything else is invalid.
///
/// # Errors
///
/// Returns [`SelectionError`] for non-numeric or out-of-range input.
fn parse_selection(line: &str, len: usize) -> Result<Option<usize>, SelectionError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed == "0" {
        return Ok(None);
    }

    let index: usize = trimmed
        .parse()
        .map_err(|_| SelectionError::NotANumber(trimmed.to_string()))?;

    if (1..=len).contains(&index) {
        Ok(Some(index - 1))
    } else {
        Err(SelectionError::OutOfRange { index, len })
    }
}

/// Present a duplicate set for interactive disposition.
///
/// Renders the set, reads one selection from `input`, and deletes at
/// most one member. All user-facing text goes to `output`; diagnostics
/// for rejected input or races also go there, and nothing is deleted
/// in those cases. The set is stale after a successful deletion and
/// must not be reused.
///
/// # Returns
///
/// `Some(DeleteResult)` if a file was deleted, `None` otherwise
/// (declined, invalid input, or a tolerated per-file failure).
///
/// # Errors
///
/// Only I/O errors on the injected reader/writer propagate; per-file
/// deletion failures are reported on `output` and swallowed.
pub fn select_delete<R: BufRead, W: Write>(
    set: &DuplicateSet,
    input: &mut R,
    output: &mut W,
    config: &DeleteConfig,
) -> io::Result<Option<DeleteResult>> {
    writeln!(output, "----")?;
    writeln!(output, "[0] DO NOTHING")?;

    // Snapshots taken at render time; verified again before deletion.
    let mut snapshots = Vec::with_capacity(set.files.len());
    for (i, file) in set.files.iter().enumerate() {
        writeln!(output, "[{}] {}", i + 1, file.path.display())?;
        snapshots.push(FileSnapshot::capture(&file.path));
    }

    write!(output, "SELECT A FILE TO DELETE: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let index = match parse_selection(&line, set.files.len()) {
        Ok(None) => {
            writeln!(output, "DOING NOTHING")?;
            return Ok(None);
        }
        Ok(Some(index)) => index,
        Err(e) => {
            log::warn!("Rejected selection input: {}", e);
            writeln!(output, "INVALID SELECTION ({}), DOING NOTHING", e)?;
            return Ok(None);
        }
    };

    let path = &set.files[index].path;

    let snapshot = match &snapshots[index] {
        Ok(snapshot) => snapshot,
        Err(e) => {
            // Already gone when the list was rendered.
            log::warn!("Skipping deletion of {}: {}", path.display(), e);
            writeln!(output, "SKIPPING ({}), DOING NOTHING", e)?;
            return Ok(None);
        }
    };

    if config.verify_snapshot {
        if let Err(e) = snapshot.verify() {
            log::warn!("Refusing deletion of {}: {}", path.display(), e);
            writeln!(output, "SKIPPING ({}), DOING NOTHING", e)?;
            return Ok(None);
        }
    }

    match delete_file(path, config) {
        Ok(result) => {
            writeln!(output, "DELETING: {}", result.path.display())?;
            Ok(Some(result))
        }
        Err(e) => {
            // The file raced away between verification and deletion,
            // or deletion itself failed; either way a no-op, not fatal.
            log::warn!("Failed to delete {}: {}", path.display(), e);
            writeln!(output, "SKIPPING ({}), DOING NOTHING", e)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::FileEntry;
    use std::fs::File;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    fn make_set(paths: &[PathBuf], size: u64) -> DuplicateSet {
        DuplicateSet::new(
            [0u8; 32],
            size,
            paths
                .iter()
                .map(|p| FileEntry::new(p.clone(), size))
                .collect(),
        )
    }

    fn run_dialog(set: &DuplicateSet, input: &str) -> (Option<DeleteResult>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let result =
            select_delete(set, &mut reader, &mut output, &DeleteConfig::default()).unwrap();
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("", 3), Ok(None));
        assert_eq!(parse_selection("\n", 3), Ok(None));
        assert_eq!(parse_selection("0", 3), Ok(None));
        assert_eq!(parse_selection("1", 3), Ok(Some(0)));
        assert_eq!(parse_selection("3\n", 3), Ok(Some(2)));
        assert_eq!(
            parse_selection("4", 3),
            Err(SelectionError::OutOfRange { index: 4, len: 3 })
        );
        assert_eq!(
            parse_selection("abc", 3),
            Err(SelectionError::NotANumber("abc".to_string()))
        );
        assert_eq!(
            parse_selection("-1", 3),
            Err(SelectionError::NotANumber("-1".to_string()))
        );
    }

    #[test]
    fn test_select_delete_removes_exactly_the_chosen_file() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"same");
        let b = write_file(&dir, "b.txt", b"same");
        let set = make_set(&[a.clone(), b.clone()], 4);

        let (result, output) = run_dialog(&set, "2\n");

        let result = result.expect("a file should have been deleted");
        assert_eq!(result.path, b);
        assert!(result.permanent);
        assert!(!b.exists());
        assert!(a.exists());
        assert!(output.contains("[0] DO NOTHING"));
        assert!(output.contains(&format!("[1] {}", a.display())));
        assert!(output.contains(&format!("[2] {}", b.display())));
        assert!(output.contains(&format!("DELETING: {}", b.display())));
    }

    #[test]
    fn test_select_delete_zero_is_noop() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"same");
        let b = write_file(&dir, "b.txt", b"same");
        let set = make_set(&[a.clone(), b.clone()], 4);

        let (result, output) = run_dialog(&set, "0\n");

        assert!(result.is_none());
        assert!(a.exists());
        assert!(b.exists());
        assert!(output.contains("DOING NOTHING"));
    }

    #[test]
    fn test_select_delete_empty_input_is_noop() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"same");
        let b = write_file(&dir, "b.txt", b"same");
        let set = make_set(&[a.clone(), b.clone()], 4);

        let (result, _) = run_dialog(&set, "\n");

        assert!(result.is_none());
        assert!(a.exists());
        assert!(b.exists());
    }

    #[test]
    fn test_select_delete_out_of_range_is_rejected() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"same");
        let b = write_file(&dir, "b.txt", b"same");
        let set = make_set(&[a.clone(), b.clone()], 4);

        let (result, output) = run_dialog(&set, "7\n");

        assert!(result.is_none());
        assert!(a.exists());
        assert!(b.exists());
        assert!(output.contains("INVALID SELECTION"));
    }

    #[test]
    fn test_select_delete_non_numeric_is_rejected() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"same");
        let b = write_file(&dir, "b.txt", b"same");
        let set = make_set(&[a.clone(), b.clone()], 4);

        let (result, output) = run_dialog(&set, "delete them all\n");

        assert!(result.is_none());
        assert!(a.exists());
        assert!(b.exists());
        assert!(output.contains("INVALID SELECTION"));
    }

    #[test]
    fn test_select_delete_vanished_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"same");
        let b = write_file(&dir, "b.txt", b"same");
        let set = make_set(&[a.clone(), b.clone()], 4);

        // Race: the file disappears after the set was built
        fs::remove_file(&b).unwrap();

        let (result, output) = run_dialog(&set, "2\n");

        assert!(result.is_none());
        assert!(a.exists());
        assert!(output.contains("SKIPPING"));
        assert!(output.contains("DOING NOTHING"));
    }

    #[test]
    fn test_snapshot_detects_mtime_change() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "edited.txt", b"same");

        let snapshot = FileSnapshot::capture(&path).unwrap();
        filetime::set_file_mtime(&path, filetime::FileTime::from_unix_time(1_000_000, 0))
            .unwrap();

        let err = snapshot.verify().unwrap_err();
        assert!(matches!(err, DeleteError::Modified(_)));
        assert!(path.exists());
    }

    #[test]
    fn test_snapshot_detects_size_change() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "grow.txt", b"1234");

        let snapshot = FileSnapshot::capture(&path).unwrap();

        let mut f = fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"56789").unwrap();
        drop(f);
        // Force a distinct mtime in case the filesystem clock is coarse
        filetime::set_file_mtime(&path, filetime::FileTime::from_unix_time(2_000_000, 0))
            .unwrap();

        assert!(matches!(
            snapshot.verify().unwrap_err(),
            DeleteError::Modified(_)
        ));
    }

    #[test]
    fn test_snapshot_capture_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never");

        let err = FileSnapshot::capture(&path).unwrap_err();
        assert!(matches!(err, DeleteError::NotFound(_)));
    }

    #[test]
    fn test_delete_file_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.txt");

        let err = delete_file(&path, &DeleteConfig::default()).unwrap_err();
        assert!(matches!(err, DeleteError::NotFound(_)));
    }
}
