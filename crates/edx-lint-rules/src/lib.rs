//! # edx-lint-rules
//!
//! Built-in checkers for edx-lint.
//!
//! Each checker is an independent [`Checker`] implementation covering one
//! Open edX convention. Presets bundle them for common setups.
//!
//! ## Available Checkers
//!
//! | Checker | Messages |
//! |---------|----------|
//! | `unit-test-super-checker` | E7601 `super-method-not-called`, E7602 `non-parent-method-called` |
//! | `layered-test-class-checker` | E7603 `test-inherits-tests` |
//! | `translation-string-checker` | E7610 `translation-of-non-string` |
//! | `range-checker` | C7620 `simplifiable-range` |
//! | `getattr-literal-checker` | C7630 `literal-used-as-attribute` |
//! | `feature-toggle-checker` | E7640 `feature-toggle-needs-doc`, E7641 `illegal-waffle-usage` |
//! | `required-base-class-checker` | E7645 `missing-required-base-class` |
//! | `code-annotations` | E7650-E7653 annotation group validation |
//! | `toggle-annotations` | E7660-E7666 feature toggle annotations |
//! | `setting-annotations` | E7670 `setting-boolean-default-value` |
//! | `events-annotations` | E7680-E7686 Open edX event annotations |
//! | `docstring-format-checker` | E7690-E7692 filter docstring sections |
//! | `assert-checker` | C7690 `wrong-assert-type` |
//! | `unittest-assert-checker` | C7699 `avoid-unittest-asserts` |
//! | `yaml-load-checker` | C7657 `unsafe-yaml-load` |
//! | `module-tracing-checker` | records visited modules |
//!
//! ## Usage
//!
//! ```ignore
//! use edx_lint_core::Analyzer;
//! use edx_lint_rules::{RangeChecker, UnitTestSuperChecker};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./lms")
//!     .checker(UnitTestSuperChecker::new())
//!     .checker(RangeChecker::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod annotations_check;
pub mod events_annotation;
pub mod feature_toggle_check;
pub mod filters_docstring;
pub mod getattr_check;
pub mod i18n_check;
pub mod module_trace;
mod presets;
pub mod range_check;
pub mod required_base_class;
pub mod right_assert;
pub mod super_check;
pub mod unittest_assert;
pub mod yaml_load;

#[cfg(test)]
mod testing;

pub use annotations_check::{
    CodeAnnotationChecker, FeatureToggleAnnotationChecker, SettingAnnotationChecker,
};
pub use events_annotation::EventsAnnotationChecker;
pub use feature_toggle_check::FeatureToggleChecker;
pub use filters_docstring::FiltersDocstringFormatChecker;
pub use getattr_check::GetSetAttrLiteralChecker;
pub use i18n_check::TranslationStringChecker;
pub use layered_test::LayeredTestClassChecker;
pub use module_trace::ModuleTracingChecker;
pub use presets::{all_checkers, minimal_checkers, recommended_checkers, Preset};
pub use range_check::RangeChecker;
pub use required_base_class::RequiredBaseClassChecker;
pub use right_assert::AssertChecker;
pub use super_check::UnitTestSuperChecker;
pub use unittest_assert::UnittestAssertChecker;
pub use yaml_load::YamlLoadChecker;

/// Re-export core types for convenience.
pub use edx_lint_core::{Checker, Diagnostic, Severity};
