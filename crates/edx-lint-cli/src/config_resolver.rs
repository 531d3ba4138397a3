//! Locating the configuration for a lint run.
//!
//! The first configuration found wins:
//!
//! 1. `--config` (or `EDX_LINT_CONFIG`), taken as given
//! 2. `edx-lint.toml`, then `.edx-lint.toml`, in the linted directory or the
//!    nearest parent up to the repository root (the first directory holding
//!    `.git`)
//! 3. `config.toml` in `$EDX_LINT_CONFIG_DIR`, else in `~/.edx-lint/`
//!
//! When nothing is found the built-in defaults apply.

use anyhow::Context;
use edx_lint_core::Config;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line.
    Explicit(PathBuf),
    /// Found next to the linted code or in a parent directory.
    Project(PathBuf),
    /// The per-user file.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the file to load, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` for the per-user file.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["edx-lint.toml", ".edx-lint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Finds the configuration for linting `lint_path`.
#[must_use]
pub fn resolve(lint_path: &Path, explicit: Option<&Path>) -> ConfigSource {
    Lookup {
        global_dir: global_config_dir(),
    }
    .resolve(lint_path, explicit)
}

/// Resolution with the per-user directory fixed up front, so tests never
/// touch the environment.
struct Lookup {
    global_dir: Option<PathBuf>,
}

impl Lookup {
    fn resolve(&self, lint_path: &Path, explicit: Option<&Path>) -> ConfigSource {
        if let Some(path) = explicit {
            return ConfigSource::Explicit(path.to_path_buf());
        }

        if let Some(found) = find_project_config(lint_path) {
            tracing::debug!("Found project config: {}", found.display());
            return ConfigSource::Project(found);
        }

        self.global_dir
            .as_deref()
            .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
            .filter(|path| path.is_file())
            .map_or(ConfigSource::Default, ConfigSource::Global)
    }
}

/// Walks from `lint_path` towards the repository root looking for a
/// project config file.
fn find_project_config(lint_path: &Path) -> Option<PathBuf> {
    let start = if lint_path.is_file() {
        lint_path.parent().unwrap_or(lint_path)
    } else {
        lint_path
    };
    let start = if start.as_os_str().is_empty() {
        Path::new(".")
    } else {
        start
    };
    let start = fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());

    for dir in start.ancestors() {
        let found = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if found.is_some() {
            return found;
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

/// Per-user config directory: `$EDX_LINT_CONFIG_DIR`, else `~/.edx-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("EDX_LINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".edx-lint"))
}

/// Loads the configuration named by `source`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(source: &ConfigSource) -> anyhow::Result<Config> {
    let Some(path) = source.path() else {
        return Ok(Config::default());
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", path.display());
    }
    Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// A repository with `lms/djangoapps/courseware` inside it.
    fn repo() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let root = fs::canonicalize(tmp.path()).unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("lms/djangoapps/courseware")).unwrap();
        (tmp, root)
    }

    fn no_global() -> Lookup {
        Lookup { global_dir: None }
    }

    #[test]
    fn command_line_path_is_used_unchecked() {
        let (_tmp, root) = repo();
        fs::write(root.join("edx-lint.toml"), "").unwrap();

        let source = no_global().resolve(&root, Some(Path::new("/nonexistent.toml")));
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("/nonexistent.toml")));
    }

    #[test]
    fn repo_config_found_from_subdirectory() {
        let (_tmp, root) = repo();
        fs::write(root.join("edx-lint.toml"), "").unwrap();

        let source = no_global().resolve(&root.join("lms/djangoapps/courseware"), None);
        assert_eq!(source, ConfigSource::Project(root.join("edx-lint.toml")));
    }

    #[test]
    fn nearest_config_wins() {
        let (_tmp, root) = repo();
        fs::write(root.join("edx-lint.toml"), "").unwrap();
        fs::write(root.join("lms/.edx-lint.toml"), "").unwrap();

        let source = no_global().resolve(&root.join("lms/djangoapps"), None);
        assert_eq!(source, ConfigSource::Project(root.join("lms/.edx-lint.toml")));
    }

    #[test]
    fn plain_name_preferred_in_same_directory() {
        let (_tmp, root) = repo();
        fs::write(root.join("edx-lint.toml"), "").unwrap();
        fs::write(root.join(".edx-lint.toml"), "").unwrap();

        let source = no_global().resolve(&root, None);
        assert_eq!(source, ConfigSource::Project(root.join("edx-lint.toml")));
    }

    #[test]
    fn linted_file_starts_at_its_directory() {
        let (_tmp, root) = repo();
        let module = root.join("lms/djangoapps/courseware/views.py");
        fs::write(&module, "").unwrap();
        fs::write(root.join("lms/edx-lint.toml"), "").unwrap();

        let source = no_global().resolve(&module, None);
        assert_eq!(source, ConfigSource::Project(root.join("lms/edx-lint.toml")));
    }

    #[test]
    fn search_stops_at_repository_root() {
        let outer = TempDir::new().unwrap();
        let outer_root = fs::canonicalize(outer.path()).unwrap();
        fs::write(outer_root.join("edx-lint.toml"), "").unwrap();
        let checkout = outer_root.join("edx-platform");
        fs::create_dir_all(checkout.join(".git")).unwrap();

        assert_eq!(no_global().resolve(&checkout, None), ConfigSource::Default);
    }

    #[test]
    fn user_config_used_without_project_config() {
        let (_tmp, root) = repo();
        let user = TempDir::new().unwrap();
        fs::write(user.path().join("config.toml"), "").unwrap();

        let lookup = Lookup {
            global_dir: Some(user.path().to_path_buf()),
        };
        assert_eq!(
            lookup.resolve(&root, None),
            ConfigSource::Global(user.path().join("config.toml"))
        );

        fs::write(root.join("edx-lint.toml"), "").unwrap();
        assert!(matches!(lookup.resolve(&root, None), ConfigSource::Project(_)));
    }

    #[test]
    fn empty_user_dir_falls_back_to_defaults() {
        let (_tmp, root) = repo();
        let user = TempDir::new().unwrap();

        let lookup = Lookup {
            global_dir: Some(user.path().to_path_buf()),
        };
        assert_eq!(lookup.resolve(&root, None), ConfigSource::Default);
        assert!(ConfigSource::Default.path().is_none());
    }

    #[test]
    fn load_default_source_gives_default_config() {
        let config = load(&ConfigSource::Default).unwrap();
        assert!(config.preset.is_none());
    }

    #[test]
    fn load_reads_checker_options() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("edx-lint.toml");
        fs::write(
            &path,
            "preset = \"all\"\n\n[checkers.unit-test-super-checker]\nmethod_names = [\"setUp\"]\n",
        )
        .unwrap();

        let config = load(&ConfigSource::Project(path)).unwrap();
        assert_eq!(config.preset.as_deref(), Some("all"));
        let options = config.checker("unit-test-super-checker").unwrap();
        assert_eq!(options.get_str_array("method_names"), vec!["setUp".to_string()]);
    }

    #[test]
    fn load_reports_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("edx-lint.toml");
        fs::write(&path, "[analyzer\n").unwrap();

        let err = load(&ConfigSource::Explicit(path)).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config"));
    }
}
