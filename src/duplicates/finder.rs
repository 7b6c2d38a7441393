//! Duplicate finder implementation with two-stage detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: collect all regular files under the root
//! 2. **Bucket**: group files by (size, base name) — metadata only
//! 3. **Digest**: within each bucket of 2+ files, digest every member
//!    and sub-partition by digest; sub-partitions of 2+ files are
//!    confirmed duplicate sets
//!
//! Buckets with a single member are skipped without digesting: the
//! content digest is the expensive step the staging exists to avoid.
//! The duplicate criterion is same size AND same base name AND same
//! digest; same-size files with different names are never compared.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (sets, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! println!("Found {} duplicate sets", sets.len());
//! println!("Reclaimable: {} bytes", summary.reclaimable_space);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::scanner::{
    digest_to_hex, Digest, FileEntry, HashError, Hasher, ScanError, Walker, WalkerConfig,
};

use super::groups::{candidate_groups, DuplicateSet};

/// Configuration for the duplicate finder.
#[derive(Debug, Clone, Default)]
pub struct FinderConfig {
    /// Walker configuration for the scan stage.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl FinderConfig {
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

/// Summary statistics from a duplicate scan.
///
/// Not `Clone`: the retained error values carry `io::Error` sources.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of files eliminated by bucketing (no candidate peer)
    pub eliminated_by_bucket: usize,
    /// Number of files successfully digested
    pub digested_files: usize,
    /// Number of files whose digest failed (I/O errors)
    pub failed_digests: usize,
    /// Digest errors encountered (the affected files are skipped)
    pub digest_errors: Vec<HashError>,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Total number of duplicate files (excluding one original per set)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Non-fatal errors encountered during the scan stage
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Whether any per-file error was tolerated during the run.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty() || !self.digest_errors.is_empty()
    }

    /// Fill the duplicate counters from the final sets.
    fn record_sets(&mut self, sets: &[DuplicateSet]) {
        self.duplicate_sets = sets.len();
        self.duplicate_files = sets.iter().map(|s| s.len() - 1).sum();
        self.reclaimable_space = sets.iter().map(DuplicateSet::wasted_space).sum();
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A structural scan error occurred.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Duplicate finder that orchestrates the two-stage detection pipeline.
///
/// Bad roots are structural errors surfaced before any output; per-file
/// errors during scan or digest are recorded in the [`ScanSummary`] and
/// never abort the run.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate sets under the given root.
    ///
    /// # Returns
    ///
    /// A tuple of:
    /// - `Vec<DuplicateSet>` - confirmed duplicate sets
    /// - [`ScanSummary`] - statistics about the scan
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if the root does not exist, is not a
    /// directory, or the run is interrupted by the shutdown signal.
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let mut summary = ScanSummary::default();

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        walker.validate_root().map_err(root_error)?;
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        log::info!("Starting duplicate scan of {}", path.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Stage 1: walk and collect, tolerating per-entry errors
        let mut files = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => files.push(file),
                Err(e) => {
                    log::warn!("Scan warning: {}", e);
                    summary.scan_errors.push(e);
                }
            }
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Stage 2: bucket by (size, base name) without touching content
        let (buckets, grouping) = candidate_groups(files);
        summary.total_files = grouping.total_files;
        summary.total_size = grouping.total_size;
        summary.eliminated_by_bucket = grouping.eliminated_unique;

        log::info!(
            "Bucketing: {} files -> {} candidates in {} buckets ({:.1}% eliminated)",
            grouping.total_files,
            grouping.candidate_files,
            grouping.candidate_buckets,
            grouping.elimination_rate()
        );

        // Stage 3: digest within each bucket, refine by digest
        let mut sets = Vec::new();
        for (key, bucket) in buckets {
            if self.config.is_shutdown_requested() {
                return Err(FinderError::Interrupted);
            }

            let mut by_digest: HashMap<Digest, Vec<FileEntry>> = HashMap::new();
            for file in bucket {
                match self.hasher.digest_file(&file.path) {
                    Ok(digest) => {
                        summary.digested_files += 1;
                        by_digest.entry(digest).or_default().push(file);
                    }
                    Err(e) => {
                        // The file changed under us after enumeration;
                        // drop it from the bucket and keep going.
                        log::warn!("Digest failed for {}: {}", file.path.display(), e);
                        summary.failed_digests += 1;
                        summary.digest_errors.push(e);
                    }
                }
            }

            for (digest, members) in by_digest {
                if members.len() > 1 {
                    log::debug!(
                        "Duplicate set {}: {} files of {} bytes",
                        digest_to_hex(&digest),
                        members.len(),
                        key.size
                    );
                    sets.push(DuplicateSet::new(digest, key.size, members));
                }
            }
        }

        summary.record_sets(&sets);

        log::info!(
            "Scan complete: {} sets, {} duplicate files, {} bytes reclaimable",
            summary.duplicate_sets,
            summary.duplicate_files,
            summary.reclaimable_space
        );

        Ok((sets, summary))
    }
}

/// Promote a root validation failure to the finder's own error type.
fn root_error(e: ScanError) -> FinderError {
    match e {
        ScanError::NotFound(p) => FinderError::PathNotFound(p),
        ScanError::NotADirectory(p) => FinderError::NotADirectory(p),
        other => FinderError::Scan(other),
    }
}
