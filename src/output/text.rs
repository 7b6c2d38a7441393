//! Plain-text reporter.
//!
//! Renders results as one line per item to an injected sink:
//!
//! - `No match: <path>` for a check file without a content-identical
//!   target file (normal comparison mode)
//! - `Match: <path> - <target path>` for one with (inverted mode)
//! - duplicate sets as their member paths joined by two spaces
//!
//! The lines are data, frequently piped into other tools, so they are
//! left uncolored.

use std::io::{self, Write};

use crate::duplicates::DuplicateSet;
use crate::scanner::FileEntry;

/// Line-oriented reporter over any writer.
#[derive(Debug)]
pub struct TextReporter<W: Write> {
    writer: W,
}

impl<W: Write> TextReporter<W> {
    /// Create a reporter writing to the given sink.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Report a check file with no content-identical target file.
    pub fn no_match(&mut self, file: &FileEntry) -> io::Result<()> {
        writeln!(self.writer, "No match: {}", file.path.display())
    }

    /// Report a check file together with its matching target file.
    pub fn matched(&mut self, file: &FileEntry, target: &FileEntry) -> io::Result<()> {
        writeln!(
            self.writer,
            "Match: {} - {}",
            file.path.display(),
            target.path.display()
        )
    }

    /// Report a duplicate set as its member paths joined by two spaces.
    pub fn duplicate_set(&mut self, set: &DuplicateSet) -> io::Result<()> {
        let joined = set
            .files
            .iter()
            .map(|f| f.path.display().to_string())
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(self.writer, "{}", joined)
    }

    /// Consume the reporter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
