//! Built-in annotation configurations and group validation.

use super::index::{AnnotationGroup, AnnotationIndex};

/// One token accepted by an [`AnnotationConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpec {
    /// Normalized token, e.g. `.. toggle_name:`.
    pub token: &'static str,
    /// Whether the token may be omitted.
    pub optional: bool,
    /// Allowed values. Empty means free text.
    pub choices: &'static [&'static str],
}

impl TokenSpec {
    const fn required(token: &'static str) -> Self {
        Self {
            token,
            optional: false,
            choices: &[],
        }
    }

    const fn optional(token: &'static str) -> Self {
        Self {
            token,
            optional: true,
            choices: &[],
        }
    }

    const fn choice(token: &'static str, choices: &'static [&'static str]) -> Self {
        Self {
            token,
            optional: false,
            choices,
        }
    }
}

/// A family of annotation tokens documenting one kind of entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationConfig {
    /// Short name of the family.
    pub name: &'static str,
    /// Token holding the documented entity's name.
    pub name_token: &'static str,
    /// Accepted tokens.
    pub tokens: &'static [TokenSpec],
}

/// Problem found while validating a group against its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationProblem {
    /// Token appears more than once.
    Duplicate(String),
    /// Required token is absent.
    Missing(String),
    /// Value outside the token's choices.
    InvalidChoice {
        /// Offending value.
        value: String,
        /// Token it was given for.
        token: String,
        /// Comma-separated allowed values.
        expected: String,
    },
}

impl AnnotationConfig {
    /// Spec for `token`, if accepted.
    #[must_use]
    pub fn spec(&self, token: &str) -> Option<&TokenSpec> {
        self.tokens.iter().find(|t| t.token == token)
    }

    /// Returns true if `token` belongs to this family.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.spec(token).is_some()
    }

    /// Groups of `index` restricted to this family's tokens.
    #[must_use]
    pub fn groups(&self, index: &AnnotationIndex) -> Vec<AnnotationGroup> {
        index
            .groups()
            .iter()
            .filter_map(|g| g.restrict(|t| self.contains(t)))
            .collect()
    }

    /// `(line, name)` for every group of this family.
    #[must_use]
    pub fn named_groups(&self, index: &AnnotationIndex) -> Vec<(usize, String)> {
        self.groups(index)
            .into_iter()
            .map(|g| (g.line, g.get(self.name_token).unwrap_or_default().to_string()))
            .collect()
    }

    /// Validates a restricted group.
    #[must_use]
    pub fn validate(&self, group: &AnnotationGroup) -> Vec<AnnotationProblem> {
        let mut problems: Vec<_> = group
            .duplicates()
            .into_iter()
            .map(|t| AnnotationProblem::Duplicate(t.to_string()))
            .collect();

        for spec in self.tokens {
            match group.get(spec.token) {
                None if !spec.optional => {
                    problems.push(AnnotationProblem::Missing(spec.token.to_string()));
                }
                Some(value) if !spec.choices.is_empty() => {
                    for choice in value.split([',', ' ', '\t']).filter(|c| !c.is_empty()) {
                        if !spec.choices.contains(&choice) {
                            problems.push(AnnotationProblem::InvalidChoice {
                                value: choice.to_string(),
                                token: spec.token.to_string(),
                                expected: spec.choices.join(", "),
                            });
                        }
                    }
                }
                _ => {}
            }
        }
        problems
    }
}

/// Feature toggle documentation.
pub static FEATURE_TOGGLE: AnnotationConfig = AnnotationConfig {
    name: "feature_toggle",
    name_token: ".. toggle_name:",
    tokens: &[
        TokenSpec::required(".. toggle_name:"),
        TokenSpec::choice(
            ".. toggle_implementation:",
            &[
                "ExperimentWaffleFlag",
                "WaffleFlag",
                "WaffleSample",
                "WaffleSwitch",
                "CourseWaffleFlag",
                "ConfigurationModel",
                "DjangoSetting",
                "EnvironmentSetting",
            ],
        ),
        TokenSpec::required(".. toggle_default:"),
        TokenSpec::required(".. toggle_description:"),
        TokenSpec::optional(".. toggle_warning:"),
        TokenSpec::choice(
            ".. toggle_use_cases:",
            &[
                "temporary",
                "circuit_breaker",
                "vip",
                "opt_out",
                "opt_in",
                "open_edx",
            ],
        ),
        TokenSpec::required(".. toggle_creation_date:"),
        TokenSpec::optional(".. toggle_target_removal_date:"),
        TokenSpec::optional(".. toggle_tickets:"),
    ],
};

/// Django setting documentation.
pub static SETTING: AnnotationConfig = AnnotationConfig {
    name: "setting",
    name_token: ".. setting_name:",
    tokens: &[
        TokenSpec::required(".. setting_name:"),
        TokenSpec::required(".. setting_default:"),
        TokenSpec::required(".. setting_description:"),
        TokenSpec::optional(".. setting_warning:"),
    ],
};

/// Open edX event documentation.
pub static OPENEDX_EVENT: AnnotationConfig = AnnotationConfig {
    name: "openedx_event",
    name_token: ".. event_type:",
    tokens: &[
        TokenSpec::required(".. event_type:"),
        TokenSpec::required(".. event_name:"),
        TokenSpec::required(".. event_description:"),
        TokenSpec::required(".. event_data:"),
        TokenSpec::optional(".. event_key_field:"),
        TokenSpec::optional(".. event_warning:"),
        TokenSpec::optional(".. event_trigger_repository:"),
    ],
};

/// All built-in configurations.
#[must_use]
pub fn builtin_configs() -> [&'static AnnotationConfig; 3] {
    [&FEATURE_TOGGLE, &SETTING, &OPENEDX_EVENT]
}
