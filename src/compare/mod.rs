//! Cross-comparison of two directory trees by content.
//!
//! # Overview
//!
//! For every file in a "check" tree, decide whether a content-identical
//! file exists anywhere in a "target" tree. The target tree is indexed
//! once by (size, base name); each check file then only ever has its
//! digest compared against candidates from its own bucket, so files
//! with no same-size same-name counterpart are never digested at all.
//!
//! A check file never matches itself: candidate identity is tested with
//! `same_file` (device/inode), so overlapping or identical check and
//! target roots behave correctly.
//!
//! The invert flag is a display concern handled by the caller; the
//! matching algorithm here is identical in both modes and classifies
//! every check file exactly once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use same_file::is_same_file;

use crate::duplicates::groups::{bucket_index, BucketKey};
use crate::scanner::{Digest, FileEntry, HashError, Hasher, ScanError, Walker, WalkerConfig};

/// Outcome of comparing one check file against the target tree.
#[derive(Debug)]
pub enum MatchOutcome {
    /// No content-identical file exists in the target tree.
    NoMatch,
    /// A content-identical target file was found (the first by bucket order).
    Matched(FileEntry),
    /// The check file vanished or became unreadable before its digest
    /// could be computed; the comparison is unresolved, not a no-match.
    Unresolved(HashError),
}

/// Statistics from a cross-comparison run.
#[derive(Debug, Default)]
pub struct CompareStats {
    /// Number of files enumerated in the check tree
    pub check_files: usize,
    /// Number of files enumerated in the target tree
    pub target_files: usize,
    /// Check files with a content-identical target file
    pub matched: usize,
    /// Check files with no content-identical target file
    pub unmatched: usize,
    /// Check files whose own digest could not be computed
    pub unresolved: usize,
    /// Candidate digests that failed (the candidate is skipped)
    pub failed_candidates: usize,
    /// Non-fatal errors from scanning either tree
    pub scan_errors: Vec<ScanError>,
}

impl CompareStats {
    /// Whether any per-file error was tolerated during the run.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty() || self.unresolved > 0 || self.failed_candidates > 0
    }
}

/// Errors that can occur during cross-comparison.
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// The run was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Comparison interrupted by user")]
    Interrupted,

    /// A root path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// A root path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A structural scan error occurred.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Configuration for the cross-comparer.
#[derive(Debug, Clone, Default)]
pub struct CompareConfig {
    /// Walker configuration applied to both trees.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl CompareConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Cross-comparer for a check tree against a target tree.
pub struct CrossComparer {
    config: CompareConfig,
    hasher: Hasher,
}

impl CrossComparer {
    /// Create a new comparer with the given configuration.
    #[must_use]
    pub fn new(config: CompareConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Create a new comparer with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CompareConfig::default())
    }

    /// Compare every file in `check_root` against `target_root`.
    ///
    /// # Returns
    ///
    /// A tuple of:
    /// - `Vec<(FileEntry, MatchOutcome)>` - one classification per
    ///   check file, in scan order
    /// - [`CompareStats`] - statistics about the run
    ///
    /// # Errors
    ///
    /// Returns [`CompareError`] if either root does not exist or is not
    /// a directory (before any file is classified), or if the run is
    /// interrupted.
    pub fn compare(
        &self,
        check_root: &Path,
        target_root: &Path,
    ) -> Result<(Vec<(FileEntry, MatchOutcome)>, CompareStats), CompareError> {
        let mut stats = CompareStats::default();

        // Both roots are validated before anything is classified or
        // printed; a bad root is fatal, not a partial result.
        let mut check_walker = Walker::new(check_root, self.config.walker_config.clone());
        let mut target_walker = Walker::new(target_root, self.config.walker_config.clone());
        check_walker.validate_root().map_err(root_error)?;
        target_walker.validate_root().map_err(root_error)?;

        log::info!(
            "Comparing {} against {}",
            check_root.display(),
            target_root.display()
        );

        if self.config.is_shutdown_requested() {
            return Err(CompareError::Interrupted);
        }

        // Index the target tree by (size, base name). Singleton buckets
        // stay in: a lone target file is still a valid candidate.
        if let Some(ref flag) = self.config.shutdown_flag {
            target_walker = target_walker.with_shutdown_flag(flag.clone());
        }

        let mut target_files = Vec::new();
        for result in target_walker.walk() {
            match result {
                Ok(file) => target_files.push(file),
                Err(e) => {
                    log::warn!("Scan warning: {}", e);
                    stats.scan_errors.push(e);
                }
            }
        }
        stats.target_files = target_files.len();
        let index = bucket_index(target_files);

        if self.config.is_shutdown_requested() {
            return Err(CompareError::Interrupted);
        }

        // Target digests are memoized per run: a target file can be a
        // candidate for many check files. Failed digests memoize as
        // None so a vanished candidate is not retried.
        let mut target_digests: HashMap<PathBuf, Option<Digest>> = HashMap::new();

        if let Some(ref flag) = self.config.shutdown_flag {
            check_walker = check_walker.with_shutdown_flag(flag.clone());
        }

        let mut results = Vec::new();
        for result in check_walker.walk() {
            if self.config.is_shutdown_requested() {
                return Err(CompareError::Interrupted);
            }

            let check_file = match result {
                Ok(file) => file,
                Err(e) => {
                    log::warn!("Scan warning: {}", e);
                    stats.scan_errors.push(e);
                    continue;
                }
            };
            stats.check_files += 1;

            let outcome =
                self.classify(&check_file, &index, &mut target_digests, &mut stats);
            match &outcome {
                MatchOutcome::Matched(_) => stats.matched += 1,
                MatchOutcome::NoMatch => stats.unmatched += 1,
                MatchOutcome::Unresolved(_) => stats.unresolved += 1,
            }
            results.push((check_file, outcome));
        }

        log::info!(
            "Comparison complete: {} checked, {} matched, {} unmatched, {} unresolved",
            stats.check_files,
            stats.matched,
            stats.unmatched,
            stats.unresolved
        );

        Ok((results, stats))
    }

    /// Classify a single check file against the target index.
    fn classify(
        &self,
        check_file: &FileEntry,
        index: &HashMap<BucketKey, Vec<FileEntry>>,
        target_digests: &mut HashMap<PathBuf, Option<Digest>>,
        stats: &mut CompareStats,
    ) -> MatchOutcome {
        let Some(candidates) = index.get(&BucketKey::of(check_file)) else {
            return MatchOutcome::NoMatch;
        };

        // At least one candidate shares the bucket, so the digest is
        // worth paying for. Computed once per check file.
        let check_digest = match self.hasher.digest_file(&check_file.path) {
            Ok(digest) => digest,
            Err(e) => {
                log::warn!(
                    "Could not digest {}: {}",
                    check_file.path.display(),
                    e
                );
                return MatchOutcome::Unresolved(e);
            }
        };

        for candidate in candidates {
            // Identity, not attribute equality: the same file reached
            // through overlapping roots must never match itself.
            if is_same_file(&check_file.path, &candidate.path).unwrap_or(false) {
                log::trace!(
                    "Skipping self-candidate {} for {}",
                    candidate.path.display(),
                    check_file.path.display()
                );
                continue;
            }

            let digest = match target_digests.entry(candidate.path.clone()) {
                std::collections::hash_map::Entry::Occupied(e) => *e.get(),
                std::collections::hash_map::Entry::Vacant(slot) => {
                    match self.hasher.digest_file(&candidate.path) {
                        Ok(d) => *slot.insert(Some(d)),
                        Err(e) => {
                            log::warn!(
                                "Could not digest candidate {}: {}",
                                candidate.path.display(),
                                e
                            );
                            stats.failed_candidates += 1;
                            slot.insert(None);
                            None
                        }
                    }
                }
            };

            if digest == Some(check_digest) {
                // First match wins; the rest of the bucket is not scanned.
                return MatchOutcome::Matched(candidate.clone());
            }
        }

        MatchOutcome::NoMatch
    }
}

/// Promote a root validation failure to the comparer's own error type.
fn root_error(e: ScanError) -> CompareError {
    match e {
        ScanError::NotFound(p) => CompareError::PathNotFound(p),
        ScanError::NotADirectory(p) => CompareError::NotADirectory(p),
        other => CompareError::Scan(other),
    }
}
