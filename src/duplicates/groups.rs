//! Bucket index and duplicate set structures.
//!
//! # Overview
//!
//! Bucketing is the cheap first stage of both pipelines. Files are
//! partitioned by attributes readable from metadata alone — exact size
//! and base name — so that the expensive content digest is only ever
//! computed for files that share a bucket with at least one other file.
//! Files in different buckets cannot satisfy the match criterion, so
//! they are never digested.
//!
//! # Example
//!
//! ```
//! use dupescan::scanner::FileEntry;
//! use dupescan::duplicates::candidate_groups;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/a/report.pdf"), 1024),
//!     FileEntry::new(PathBuf::from("/b/report.pdf"), 1024),
//!     FileEntry::new(PathBuf::from("/c/notes.txt"), 2048),
//! ];
//!
//! // Only buckets with 2+ files survive as duplicate candidates
//! let (groups, stats) = candidate_groups(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.candidate_files, 2);  // the two report.pdf copies
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::ffi::OsString;

use crate::scanner::{digest_to_hex, Digest, FileEntry};

/// Key for the cheap bucketing stage: exact size plus base name.
///
/// Both pipelines bucket on this key; two files in different buckets
/// are never compared by content. Equality of the key is exact, not
/// approximate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    /// File size in bytes
    pub size: u64,
    /// Base name of the file
    pub name: OsString,
}

impl BucketKey {
    /// Derive the bucket key for a file entry.
    #[must_use]
    pub fn of(entry: &FileEntry) -> Self {
        Self {
            size: entry.size,
            name: entry.file_name.clone(),
        }
    }
}

/// A set of files proven pairwise content-identical.
///
/// All members share the same size, the same base name, and the same
/// content digest; a set always has at least two members. The set is
/// never mutated after creation — deleting a member on disk makes the
/// set stale, and stale sets must not be reused.
#[derive(Debug, Clone)]
pub struct DuplicateSet {
    /// BLAKE3 digest shared by every member
    pub digest: Digest,
    /// File size in bytes shared by every member
    pub size: u64,
    /// Member files, in the order the scan produced them
    pub files: Vec<FileEntry>,
}

impl DuplicateSet {
    /// Create a new duplicate set.
    #[must_use]
    pub fn new(digest: Digest, size: u64, files: Vec<FileEntry>) -> Self {
        debug_assert!(files.len() >= 2, "a duplicate set has at least two members");
        Self {
            digest,
            size,
            files,
        }
    }

    /// Number of files in this set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Space reclaimable by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * (self.files.len() as u64).saturating_sub(1)
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        digest_to_hex(&self.digest)
    }

    /// Get just the paths of files in this set.
    #[must_use]
    pub fn paths(&self) -> Vec<std::path::PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Statistics from the bucketing stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct (size, name) buckets seen
    pub unique_buckets: usize,
    /// Number of files that could be duplicates (in buckets of 2+)
    pub candidate_files: usize,
    /// Number of files eliminated as unique (singleton buckets)
    pub eliminated_unique: usize,
    /// Number of buckets with 2+ files
    pub candidate_buckets: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated without any content I/O.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Build the bucket index over a set of file entries.
///
/// Single pass, O(n) in the number of entries; each entry is appended
/// to its bucket in scan order. No file content is read here — this
/// stage exists purely to shrink the candidate set before the
/// O(file size) digest stage.
#[must_use]
pub fn bucket_index(
    files: impl IntoIterator<Item = FileEntry>,
) -> HashMap<BucketKey, Vec<FileEntry>> {
    let mut index: HashMap<BucketKey, Vec<FileEntry>> = HashMap::new();
    for file in files {
        index.entry(BucketKey::of(&file)).or_default().push(file);
    }
    index
}

/// Bucket files and keep only buckets with candidate peers.
///
/// This is the duplicate-detection front end: buckets with a single
/// member are dropped (and counted) so their file is never digested.
///
/// # Returns
///
/// A tuple of:
/// - `HashMap<BucketKey, Vec<FileEntry>>` - buckets with 2+ files
/// - [`GroupingStats`] - statistics about the bucketing operation
#[must_use]
pub fn candidate_groups(
    files: impl IntoIterator<Item = FileEntry>,
) -> (HashMap<BucketKey, Vec<FileEntry>>, GroupingStats) {
    let mut stats = GroupingStats::default();

    let mut index: HashMap<BucketKey, Vec<FileEntry>> = HashMap::new();
    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        index.entry(BucketKey::of(&file)).or_default().push(file);
    }

    stats.unique_buckets = index.len();

    let filtered: HashMap<BucketKey, Vec<FileEntry>> = index
        .into_iter()
        .filter(|(key, files)| {
            if files.len() == 1 {
                stats.eliminated_unique += 1;
                log::trace!(
                    "Eliminated singleton bucket ({} bytes, {:?}): {}",
                    key.size,
                    key.name,
                    files[0].path.display()
                );
                false
            } else {
                stats.candidate_files += files.len();
                stats.candidate_buckets += 1;
                log::debug!(
                    "Candidate bucket ({} bytes, {:?}): {} files",
                    key.size,
                    key.name,
                    files.len()
                );
                true
            }
        })
        .collect();

    (filtered, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(path: &str, size: u64) -> FileEntry {
        FileEntry::new(PathBuf::from(path), size)
    }

    #[test]
    fn test_bucket_key_requires_size_and_name() {
        let a = BucketKey::of(&entry("/x/report.pdf", 500));
        let b = BucketKey::of(&entry("/y/report.pdf", 500));
        let c = BucketKey::of(&entry("/z/report.pdf", 501));
        let d = BucketKey::of(&entry("/z/other.pdf", 500));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_bucket_index_appends_in_scan_order() {
        let index = bucket_index(vec![
            entry("/a/f.txt", 10),
            entry("/b/f.txt", 10),
            entry("/c/f.txt", 10),
        ]);

        let key = BucketKey {
            size: 10,
            name: OsString::from("f.txt"),
        };
        let bucket = &index[&key];

        assert_eq!(bucket.len(), 3);
        assert_eq!(bucket[0].path, PathBuf::from("/a/f.txt"));
        assert_eq!(bucket[1].path, PathBuf::from("/b/f.txt"));
        assert_eq!(bucket[2].path, PathBuf::from("/c/f.txt"));
    }

    #[test]
    fn test_bucket_membership_is_exact() {
        let index = bucket_index(vec![
            entry("/a/f.txt", 10),
            entry("/b/f.txt", 11),
            entry("/c/g.txt", 10),
        ]);

        assert_eq!(index.len(), 3);
        for (key, files) in &index {
            for file in files {
                assert_eq!(file.size, key.size);
                assert_eq!(file.file_name, key.name);
            }
        }
    }

    #[test]
    fn test_candidate_groups_drops_singletons() {
        let (groups, stats) = candidate_groups(vec![
            entry("/a/dup.bin", 64),
            entry("/b/dup.bin", 64),
            entry("/c/unique.bin", 64),
            entry("/d/dup.bin", 65),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(stats.total_files, 4);
        assert_eq!(stats.unique_buckets, 3);
        assert_eq!(stats.candidate_files, 2);
        assert_eq!(stats.candidate_buckets, 1);
        assert_eq!(stats.eliminated_unique, 2);
    }

    #[test]
    fn test_candidate_groups_same_size_different_name_not_grouped() {
        // Same size, identical prospective content, different base
        // names: never bucketed together. This is a contract of the
        // duplicate criterion, not an oversight.
        let (groups, stats) = candidate_groups(vec![
            entry("/a/one.dat", 128),
            entry("/b/two.dat", 128),
        ]);

        assert!(groups.is_empty());
        assert_eq!(stats.eliminated_unique, 2);
        assert_eq!(stats.candidate_files, 0);
    }

    #[test]
    fn test_candidate_groups_empty_input() {
        let (groups, stats) = candidate_groups(Vec::new());

        assert!(groups.is_empty());
        assert_eq!(stats, GroupingStats::default());
    }

    #[test]
    fn test_grouping_stats_elimination_rate() {
        let stats = GroupingStats {
            total_files: 4,
            eliminated_unique: 2,
            ..Default::default()
        };
        assert!((stats.elimination_rate() - 50.0).abs() < f64::EPSILON);

        let empty = GroupingStats::default();
        assert!((empty.elimination_rate() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duplicate_set_accessors() {
        let set = DuplicateSet::new(
            [7u8; 32],
            500,
            vec![entry("/x/report.pdf", 500), entry("/y/report.pdf", 500)],
        );

        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert_eq!(set.size, 500);
        assert_eq!(set.wasted_space(), 500);
        assert_eq!(set.digest_hex().len(), 64);
        assert_eq!(
            set.paths(),
            vec![PathBuf::from("/x/report.pdf"), PathBuf::from("/y/report.pdf")]
        );
    }
}
