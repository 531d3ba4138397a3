//! Utility functions for checker implementations.

pub mod pragma;

#[doc(inline)]
pub use pragma::{parse_disable_directive, PragmaMap};
