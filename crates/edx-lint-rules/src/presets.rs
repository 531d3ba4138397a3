//! Checker presets for common configurations.

use crate::{
    AssertChecker, CodeAnnotationChecker, EventsAnnotationChecker, FeatureToggleAnnotationChecker,
    FeatureToggleChecker, FiltersDocstringFormatChecker, GetSetAttrLiteralChecker,
    LayeredTestClassChecker, ModuleTracingChecker, RangeChecker, RequiredBaseClassChecker,
    SettingAnnotationChecker, TranslationStringChecker, UnitTestSuperChecker,
    UnittestAssertChecker, YamlLoadChecker,
};
use edx_lint_core::{register, CheckerBox, Config, RegistryError};

/// Preset configurations for edx-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Every convention checker except the opt-in ones.
    Recommended,
    /// Every checker, including pytest-style asserts and module tracing.
    All,
    /// Minimal checkers for gradual adoption.
    Minimal,
}

impl Preset {
    /// Parses a preset name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "recommended" => Some(Self::Recommended),
            "all" => Some(Self::All),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }

    /// Builds the checkers of this preset.
    ///
    /// # Errors
    ///
    /// Returns an error if a checker fails to register.
    pub fn checkers(self, config: &Config) -> Result<Vec<CheckerBox>, RegistryError> {
        match self {
            Self::Recommended => recommended_checkers(config),
            Self::All => all_checkers(config),
            Self::Minimal => minimal_checkers(config),
        }
    }
}

/// Returns the recommended set of checkers.
///
/// Everything except `unittest-assert-checker`, which only suits pytest
/// suites, and `module-tracing-checker`, a diagnostic aid.
///
/// # Errors
///
/// Returns an error if a checker fails to register.
pub fn recommended_checkers(config: &Config) -> Result<Vec<CheckerBox>, RegistryError> {
    Ok(vec![
        register(UnitTestSuperChecker::from_config(
            config.checker(crate::super_check::NAME),
        ))?,
        register(LayeredTestClassChecker::new())?,
        register(TranslationStringChecker::new())?,
        register(RangeChecker::new())?,
        register(GetSetAttrLiteralChecker::new())?,
        register(FeatureToggleChecker::new())?,
        register(RequiredBaseClassChecker::from_config(
            config.checker(crate::required_base_class::NAME),
        ))?,
        register(CodeAnnotationChecker::new())?,
        register(FeatureToggleAnnotationChecker::new())?,
        register(SettingAnnotationChecker::new())?,
        register(EventsAnnotationChecker::new())?,
        register(FiltersDocstringFormatChecker::new())?,
        register(AssertChecker::new())?,
        register(YamlLoadChecker::new())?,
    ])
}

/// Returns every available checker.
///
/// # Errors
///
/// Returns an error if a checker fails to register.
pub fn all_checkers(config: &Config) -> Result<Vec<CheckerBox>, RegistryError> {
    let mut checkers = recommended_checkers(config)?;
    checkers.push(register(UnittestAssertChecker::new())?);
    checkers.push(register(ModuleTracingChecker::from_config(
        config.checker(crate::module_trace::NAME),
    ))?);
    Ok(checkers)
}

/// Returns the minimal set of checkers.
///
/// For gradual adoption, only includes:
/// - `unit-test-super-checker`
/// - `translation-string-checker`
/// - `yaml-load-checker`
///
/// # Errors
///
/// Returns an error if a checker fails to register.
pub fn minimal_checkers(config: &Config) -> Result<Vec<CheckerBox>, RegistryError> {
    Ok(vec![
        register(UnitTestSuperChecker::from_config(
            config.checker(crate::super_check::NAME),
        ))?,
        register(TranslationStringChecker::new())?,
        register(YamlLoadChecker::new())?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use edx_lint_core::check_unique;

    #[test]
    fn test_preset_checkers() {
        let config = Config::default();
        assert_eq!(Preset::Recommended.checkers(&config).unwrap().len(), 14);
        assert_eq!(Preset::All.checkers(&config).unwrap().len(), 16);
        assert_eq!(Preset::Minimal.checkers(&config).unwrap().len(), 3);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Preset::from_name("Recommended"), Some(Preset::Recommended));
        assert_eq!(Preset::from_name("all"), Some(Preset::All));
        assert_eq!(Preset::from_name("strict"), None);
    }

    #[test]
    fn test_all_checkers_are_unique() {
        let checkers = all_checkers(&Config::default()).unwrap();
        check_unique(&checkers).unwrap();
    }

    #[test]
    fn test_checker_listing() {
        let checkers = all_checkers(&Config::default()).unwrap();
        let listing: Vec<String> = checkers
            .iter()
            .map(|c| {
                let codes: Vec<&str> = c.messages().iter().map(|m| m.code).collect();
                format!("{} [{}]", c.name(), codes.join(", "))
            })
            .collect();
        insta::assert_snapshot!(listing.join("\n"), @r"
        unit-test-super-checker [E7601, E7602]
        layered-test-class-checker [E7603]
        translation-string-checker [E7610]
        range-checker [C7620]
        getattr-literal-checker [C7630]
        feature-toggle-checker [E7640, E7641]
        required-base-class-checker [E7645]
        code-annotations [E7650, E7651, E7652, E7653]
        toggle-annotations [E7660, E7661, E7662, E7663, E7664, E7665, E7666]
        setting-annotations [E7670]
        events-annotations [E7680, E7681, E7682, E7683, E7684, E7685, E7686]
        docstring-format-checker [E7690, E7691, E7692]
        assert-checker [C7690]
        yaml-load-checker [C7657]
        unittest-assert-checker [C7699]
        module-tracing-checker []
        ");
    }
}
