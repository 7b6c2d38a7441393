//! BLAKE3 file digesting with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing BLAKE3
//! digests of file contents. Files are read in fixed-size chunks so
//! memory use stays bounded regardless of file size.
//!
//! Two files are treated as content-identical iff their digests are
//! equal. Digests are computed lazily by the pipelines, only for files
//! that share a candidate bucket with at least one other file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::HashError;

/// A BLAKE3 content digest (32 bytes).
pub type Digest = [u8; 32];

/// Read chunk size for streaming digests.
pub const CHUNK_SIZE: usize = 4096;

/// Streaming file digester.
///
/// Stateless; a single instance can digest any number of files.
#[derive(Debug, Default)]
pub struct Hasher;

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compute the digest of a file's full content.
    ///
    /// Streams the file in [`CHUNK_SIZE`] blocks; a file larger than
    /// memory digests in constant space.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or becomes
    /// unreadable mid-stream (deleted or permission revoked after the
    /// walker observed it). The error propagates to the caller; it is
    /// never treated as an empty or missing digest.
    pub fn digest_file(&self, path: &Path) -> Result<Digest, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buf = [0u8; CHUNK_SIZE];

        loop {
            let n = file.read(&mut buf).map_err(|e| HashError::from_io(path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        Ok(*hasher.finalize().as_bytes())
    }
}

/// Render a digest as a lowercase hex string.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_digest_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.txt", b"some stable content");

        let hasher = Hasher::new();
        let first = hasher.digest_file(&path).unwrap();
        let second = hasher.digest_file(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_equal_content_equal_digest() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.bin", b"identical bytes");
        let b = write_file(&dir, "b.bin", b"identical bytes");

        let hasher = Hasher::new();
        assert_eq!(
            hasher.digest_file(&a).unwrap(),
            hasher.digest_file(&b).unwrap()
        );
    }

    #[test]
    fn test_different_content_different_digest() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.bin", b"content one");
        let b = write_file(&dir, "b.bin", b"content two");

        let hasher = Hasher::new();
        assert_ne!(
            hasher.digest_file(&a).unwrap(),
            hasher.digest_file(&b).unwrap()
        );
    }

    #[test]
    fn test_digest_spans_multiple_chunks() {
        let dir = TempDir::new().unwrap();

        // Three full chunks plus a partial tail
        let content: Vec<u8> = (0..CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        let path = write_file(&dir, "big.bin", &content);

        let hasher = Hasher::new();
        let streamed = hasher.digest_file(&path).unwrap();
        let whole = *blake3::hash(&content).as_bytes();

        assert_eq!(streamed, whole);
    }

    #[test]
    fn test_digest_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty", b"");

        let hasher = Hasher::new();
        let digest = hasher.digest_file(&path).unwrap();

        assert_eq!(digest, *blake3::hash(b"").as_bytes());
    }

    #[test]
    fn test_digest_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never-created");

        let hasher = Hasher::new();
        let err = hasher.digest_file(&path).unwrap_err();

        assert!(matches!(err, HashError::NotFound(_)));
    }

    #[test]
    fn test_digest_to_hex() {
        let mut digest: Digest = [0u8; 32];
        digest[0] = 0xab;
        digest[31] = 0x01;

        let hex = digest_to_hex(&digest);

        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("ab"));
        assert!(hex.ends_with("01"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Streamed digests agree with the one-shot library digest
            // for arbitrary content, including chunk-boundary sizes.
            #[test]
            fn streamed_digest_matches_oneshot(content in proptest::collection::vec(any::<u8>(), 0..(CHUNK_SIZE * 2 + 3))) {
                let dir = TempDir::new().unwrap();
                let path = write_file(&dir, "prop.bin", &content);

                let hasher = Hasher::new();
                let streamed = hasher.digest_file(&path).unwrap();

                prop_assert_eq!(streamed, *blake3::hash(&content).as_bytes());
            }
        }
    }
}
