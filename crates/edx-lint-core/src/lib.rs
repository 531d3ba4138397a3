//! # edx-lint-core
//!
//! Core framework for Python static analysis based on a lowered
//! tree-sitter syntax tree.
//!
//! This crate provides the foundational traits and types for building
//! checkers. It includes:
//!
//! - [`Checker`] trait for node-visiting checkers
//! - [`Analyzer`] for orchestrating lint execution
//! - [`tree`] and [`inference`] for syntax and best-effort type queries
//! - [`annotations`] for structured `.. token:` comment blocks
//! - [`tamper_evident`] for self-certifying generated files
//!
//! ## Example
//!
//! ```ignore
//! use edx_lint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./lms")
//!     .checker(RangeChecker)
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! result.print_report();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod checker;
mod config;
mod context;
mod types;

pub mod annotations;
pub mod inference;
pub mod tamper_evident;
pub mod tree;

/// Utility modules for checker implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use checker::{
    check_unique, register, Checker, CheckerBox, Handler, RegisteredChecker, RegistryError,
    Visitors,
};
pub use config::{AnalyzerConfig, CheckerConfig, Config, ConfigError, MessagesConfig};
pub use context::{CheckContext, FileContext};
pub use inference::{ClassId, Resolution, Value};
pub use tree::{Literal, Node, NodeKind, SourceTree};
pub use types::{Diagnostic, DiagnosticReport, LintResult, Location, MessageDef, Severity};
