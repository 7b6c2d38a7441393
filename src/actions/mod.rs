//! File actions module.
//!
//! This module provides the destructive half of the tool:
//! - Interactive selection over a duplicate set
//! - Deletion of exactly one chosen member (permanent or to trash)
//! - Snapshot verification so a file modified after the scan is
//!   refused rather than deleted
//!
//! The interaction is an explicit request/response contract: render
//! the choices, accept one discrete input, map it to at most one
//! action. Input and output are injected so the dialog is testable
//! without a terminal.

pub mod delete;

pub use delete::{
    select_delete, DeleteConfig, DeleteError, DeleteResult, FileSnapshot, SelectionError,
};
