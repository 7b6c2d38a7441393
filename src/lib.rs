//! dupescan - content-based directory comparison and duplicate detection.
//!
//! Identifies byte-identical files using a two-stage filter: a cheap
//! (size, base name) bucket index first, then a streaming BLAKE3 digest
//! computed only for files sharing a bucket. Two tools are built on the
//! shared engine: `compare` (does each file in one tree have a
//! content-identical copy in another?) and `find` (duplicate sets
//! within a tree, with optional interactive deletion).

pub mod actions;
pub mod cli;
pub mod compare;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod signal;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::actions::{select_delete, DeleteConfig};
use crate::cli::{Cli, Commands, CompareArgs, FindArgs};
use crate::compare::{CompareConfig, CrossComparer, MatchOutcome};
use crate::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use crate::error::ExitCode;
use crate::output::TextReporter;

/// Run the application with parsed CLI arguments.
///
/// # Errors
///
/// Returns an error for structural failures (bad roots, interruption);
/// per-file failures are tolerated and reflected in the exit code.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.no_color {
        yansi::disable();
    }

    let shutdown = match signal::install_shutdown_flag() {
        Ok(flag) => Some(flag),
        Err(e) => {
            log::warn!("Could not install Ctrl+C handler: {}", e);
            None
        }
    };

    match cli.command {
        Commands::Compare(args) => run_compare(&args, shutdown),
        Commands::Find(args) => run_find(&args, shutdown),
    }
}

/// Cross-compare a check tree against a target tree and report.
fn run_compare(
    args: &CompareArgs,
    shutdown: Option<Arc<AtomicBool>>,
) -> anyhow::Result<ExitCode> {
    let mut config = CompareConfig::default().with_walker_config(args.walk.to_walker_config());
    if let Some(flag) = shutdown {
        config = config.with_shutdown_flag(flag);
    }

    let comparer = CrossComparer::new(config);
    let (results, stats) = comparer.compare(&args.check, &args.target)?;

    // The invert flag picks which half of the classification is shown;
    // both halves always exist and are exact complements.
    let stdout = io::stdout();
    let mut reporter = TextReporter::new(stdout.lock());
    for (file, outcome) in &results {
        match outcome {
            MatchOutcome::Matched(target) if args.invert => reporter.matched(file, target)?,
            MatchOutcome::NoMatch if !args.invert => reporter.no_match(file)?,
            _ => {}
        }
    }

    if stats.has_errors() {
        Ok(ExitCode::PartialSuccess)
    } else {
        Ok(ExitCode::Success)
    }
}

/// Find duplicate sets and either report them or run the delete dialog.
fn run_find(args: &FindArgs, shutdown: Option<Arc<AtomicBool>>) -> anyhow::Result<ExitCode> {
    let mut config = FinderConfig::default().with_walker_config(args.walk.to_walker_config());
    if let Some(flag) = shutdown.clone() {
        config = config.with_shutdown_flag(flag);
    }

    let finder = DuplicateFinder::new(config);
    let (sets, summary) = finder.find_duplicates(&args.path)?;

    if args.delete {
        let delete_config = if args.trash {
            DeleteConfig::trash()
        } else {
            DeleteConfig::default()
        };

        let stdin = io::stdin();
        let mut input = stdin.lock();
        let stdout = io::stdout();
        let mut output = stdout.lock();

        for set in &sets {
            if shutdown
                .as_ref()
                .is_some_and(|f| f.load(Ordering::SeqCst))
            {
                return Err(FinderError::Interrupted.into());
            }
            select_delete(set, &mut input, &mut output, &delete_config)?;
        }
    } else {
        let stdout = io::stdout();
        let mut reporter = TextReporter::new(stdout.lock());
        for set in &sets {
            reporter.duplicate_set(set)?;
        }
    }

    if summary.has_errors() {
        Ok(ExitCode::PartialSuccess)
    } else if sets.is_empty() {
        Ok(ExitCode::NothingFound)
    } else {
        Ok(ExitCode::Success)
    }
}
