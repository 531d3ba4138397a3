//! Subcommand implementations.

pub mod check;
pub mod lint;
pub mod list;
pub mod list_checkers;
pub mod output;
pub mod write;
