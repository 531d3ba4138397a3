//! Structured `.. token: value` comment annotations.
//!
//! [`AnnotationIndex`] reads a file's comment blocks once. Configurations
//! such as [`FEATURE_TOGGLE`] select and validate the tokens of one
//! family, and [`AnnotationMatcher`] pairs annotated names with the calls
//! that define the documented entities.

mod config;
mod index;
mod matcher;

pub use config::{
    builtin_configs, AnnotationConfig, AnnotationProblem, TokenSpec, FEATURE_TOGGLE,
    OPENEDX_EVENT, SETTING,
};
pub use index::{AnnotationEntry, AnnotationGroup, AnnotationIndex};
pub use matcher::{AnnotationMatcher, CallSite, MatchOutcome};
