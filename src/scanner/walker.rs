//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing directory
//! trees and collecting file metadata for comparison and duplicate
//! detection. Traversal is single-threaded and fully sequential; the
//! pipeline performs one filesystem operation at a time.
//!
//! # Features
//!
//! - Recursive traversal restricted to regular files
//! - Configurable symlink following
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Size filtering (min/max)
//! - Hidden file filtering
//! - Graceful shutdown via atomic flag
//!
//! Callers must not depend on traversal order; it is platform-defined.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use walkdir::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for sequential file discovery.
///
/// Yields one [`FileEntry`] per regular file under the root. Errors on
/// individual entries are yielded inline so the caller can log and
/// continue rather than abort the whole scan.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops iteration as
    /// soon as possible. This allows for clean Ctrl+C handling.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Validate that the root exists and is a directory.
    ///
    /// A bad root is a structural error: it must fail before any entry
    /// is yielded, unlike per-entry errors which are tolerated.
    ///
    /// # Errors
    ///
    /// - `ScanError::NotFound` if the root does not exist
    /// - `ScanError::NotADirectory` if the root is not a directory
    pub fn validate_root(&self) -> Result<(), ScanError> {
        if !self.root.exists() {
            return Err(ScanError::NotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }
        Ok(())
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Build gitignore matcher from config patterns and .gitignore file.
    fn build_gitignore(&self) -> Option<Gitignore> {
        let mut builder = GitignoreBuilder::new(&self.root);

        // Add local .gitignore if it exists
        let gitignore_path = self.root.join(".gitignore");
        if gitignore_path.exists() {
            if let Some(e) = builder.add(&gitignore_path) {
                log::warn!(
                    "Failed to load .gitignore from {}: {}",
                    gitignore_path.display(),
                    e
                );
            } else {
                log::debug!("Loaded .gitignore from {}", gitignore_path.display());
            }
        }

        // Add custom patterns from config
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) => {
                if gitignore.is_empty() {
                    None
                } else {
                    Some(gitignore)
                }
            }
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check if a path should be ignored based on configured patterns.
    fn should_ignore(&self, path: &Path, is_dir: bool, gitignore: &Option<Gitignore>) -> bool {
        if let Some(gi) = gitignore {
            // Gitignore matching expects paths relative to the root,
            // with forward slashes even on Windows.
            let relative_path = path.strip_prefix(&self.root).unwrap_or(path);

            let path_str = relative_path.to_string_lossy();
            let normalized_path = if cfg!(windows) {
                path_str.replace('\\', "/")
            } else {
                path_str.into_owned()
            };

            gi.matched(normalized_path, is_dir).is_ignore()
        } else {
            false
        }
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if let Some(min) = self.config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Returns an iterator over [`FileEntry`] results. Errors on
    /// individual entries are yielded as [`ScanError`] values rather
    /// than stopping iteration; the enclosing scan keeps going.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let gitignore = self.build_gitignore();
        let skip_hidden = self.config.skip_hidden;

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        walk_dir
            .into_iter()
            .filter_entry(move |entry| {
                // Never filter the root itself, even when it is hidden.
                !(skip_hidden && entry.depth() > 0 && is_hidden(entry.file_name()))
            })
            .filter_map(move |entry_result| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    return None;
                }

                match entry_result {
                    Ok(entry) => {
                        let path = entry.path();

                        // Skip the root directory itself; a root that is
                        // not a directory is a structural error.
                        if entry.depth() == 0 {
                            if path.is_dir() {
                                return None;
                            }
                            return Some(Err(ScanError::NotADirectory(path.to_path_buf())));
                        }

                        let file_type = entry.file_type();

                        if file_type.is_dir() {
                            if self.should_ignore(path, true, &gitignore) {
                                log::trace!("Ignoring directory: {}", path.display());
                            }
                            return None;
                        }

                        // Check ignore patterns
                        if self.should_ignore(path, false, &gitignore) {
                            log::trace!("Ignoring file: {}", path.display());
                            return None;
                        }

                        // Symlinks are skipped unless followed; when followed,
                        // walkdir resolves them and file_type reflects the target.
                        if file_type.is_symlink() {
                            log::trace!("Skipping symlink: {}", path.display());
                            return None;
                        }

                        // Exclude special files (sockets, fifos, devices)
                        if !file_type.is_file() {
                            return None;
                        }

                        let metadata = match entry.metadata() {
                            Ok(m) => m,
                            Err(e) => {
                                let source = e
                                    .into_io_error()
                                    .unwrap_or_else(|| std::io::Error::other("metadata error"));
                                return Some(self.handle_io_error(path, source));
                            }
                        };

                        let size = metadata.len();

                        if !self.passes_size_filter(size) {
                            log::trace!(
                                "Skipping file due to size filter ({}): {}",
                                size,
                                path.display()
                            );
                            return None;
                        }

                        Some(Ok(FileEntry::new(path.to_path_buf(), size)))
                    }
                    Err(e) => {
                        let path = e
                            .path()
                            .map_or_else(|| self.root.clone(), Path::to_path_buf);
                        let source = e
                            .into_io_error()
                            .unwrap_or_else(|| std::io::Error::other("walk error"));
                        Some(self.handle_io_error(&path, source))
                    }
                }
            })
    }

    /// Classify an I/O error encountered during traversal.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> Result<FileEntry, ScanError> {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                Err(ScanError::PermissionDenied(path.to_path_buf()))
            }
            ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                Err(ScanError::NotFound(path.to_path_buf()))
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                Err(ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                })
            }
        }
    }
}

/// Check whether a file name marks a hidden entry.
fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
