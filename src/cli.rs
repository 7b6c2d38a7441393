//! Command-line interface definitions for dupescan.
//!
//! This module defines all CLI arguments, subcommands, and options using
//! the clap derive API. The CLI follows standard conventions with global
//! options (verbosity, color) and one subcommand per operation.
//!
//! # Example
//!
//! ```bash
//! # Report files in ./incoming with no content-identical copy in ./archive
//! dupescan compare ./incoming ./archive
//!
//! # Report the files that DO have a copy
//! dupescan compare ./incoming ./archive --invert
//!
//! # List duplicate sets within a tree
//! dupescan find ~/Pictures
//!
//! # Interactively delete one member per duplicate set
//! dupescan find ~/Pictures --delete
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::scanner::WalkerConfig;

/// Content-based directory comparison and duplicate file finder.
///
/// dupescan identifies byte-identical files using a cheap size/name
/// pre-filter before a streaming BLAKE3 content digest, so only files
/// with a plausible counterpart are ever read.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Emit errors as JSON on stderr (for scripting)
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for dupescan.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare a check tree against a target tree by content
    Compare(CompareArgs),
    /// Find duplicate sets within a single tree
    Find(FindArgs),
}

/// Arguments for the compare subcommand.
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Directory whose files are checked for a counterpart
    #[arg(value_name = "CHECK_DIR")]
    pub check: PathBuf,

    /// Reference directory searched for content-identical files
    #[arg(value_name = "TARGET_DIR")]
    pub target: PathBuf,

    /// Report files which match instead of files which don't
    #[arg(short, long, visible_alias = "inverse")]
    pub invert: bool,

    /// Shared scan filters
    #[command(flatten)]
    pub walk: WalkArgs,
}

/// Arguments for the find subcommand.
#[derive(Debug, Args)]
pub struct FindArgs {
    /// Directory to scan for duplicate files
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Interactively select one member of each duplicate set to delete
    #[arg(short, long)]
    pub delete: bool,

    /// Move deleted files to the system trash instead of unlinking
    #[arg(long, requires = "delete")]
    pub trash: bool,

    /// Shared scan filters
    #[command(flatten)]
    pub walk: WalkArgs,
}

/// Scan filters shared by both subcommands.
#[derive(Debug, Args)]
pub struct WalkArgs {
    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// These patterns are added to any .gitignore patterns found.
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,
}

impl WalkArgs {
    /// Convert CLI filters into a walker configuration.
    #[must_use]
    pub fn to_walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.follow_symlinks,
            self.skip_hidden,
            self.min_size,
            self.max_size,
            self.ignore_patterns.clone(),
        )
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB.
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    // Find where the number ends and the suffix begins
    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
