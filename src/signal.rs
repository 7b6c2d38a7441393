//! Ctrl+C handling.
//!
//! Installs a signal handler that flips a shared atomic flag. The
//! walker and both pipelines poll the flag between operations, so an
//! interrupt never leaves a half-deleted file or a partial match
//! result; the run aborts at the next operation boundary with exit
//! code 130.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Install a Ctrl+C handler and return the shutdown flag it sets.
///
/// # Errors
///
/// Returns an error if the process-wide handler cannot be installed
/// (e.g., it was already set). Callers may proceed without one; the
/// flag simply never fires.
pub fn install_shutdown_flag() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);

    ctrlc::set_handler(move || {
        log::warn!("Interrupt received, stopping at the next operation boundary");
        handler_flag.store(true, Ordering::SeqCst);
    })?;

    Ok(flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_starts_unset() {
        // The handler itself can only be installed once per process,
        // so only the initial state is asserted here.
        let flag = Arc::new(AtomicBool::new(false));
        assert!(!flag.load(Ordering::SeqCst));
    }
}
