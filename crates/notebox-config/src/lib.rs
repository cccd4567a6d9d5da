//! Where the notebox workspace lives.
//!
//! The workspace is chosen in this order: a path given on the command line,
//! the `workspace_path` in `~/.config/notebox/config.toml`, and finally
//! `./Workspace`. Paths in the config file may use `~` and `$VARS`, and a
//! relative path there is taken relative to the config file itself.

use notebox_engine::DEFAULT_WORKSPACE_DIR;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    Read {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    Parse {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Which rule picked the workspace directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceSource {
    CommandLine,
    ConfigFile,
    Default,
}

impl fmt::Display for WorkspaceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceSource::CommandLine => write!(f, "command line"),
            WorkspaceSource::ConfigFile => write!(f, "config file"),
            WorkspaceSource::Default => write!(f, "default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWorkspace {
    pub path: PathBuf,
    pub source: WorkspaceSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the notes and the `pictures/` upload folder
    pub workspace_path: PathBuf,
}

impl Config {
    pub fn new(workspace_path: impl Into<PathBuf>) -> Self {
        Self {
            workspace_path: workspace_path.into(),
        }
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/notebox");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Load the user's config file; `Ok(None)` when there isn't one
    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::read(&Self::config_path())
    }

    pub fn read(config_path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match std::fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    config_path: config_path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        Ok(Some(Self {
            workspace_path: expand_workspace_path(&config.workspace_path, config_path.parent()),
        }))
    }

    pub fn write(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.write(&Self::config_path())
    }

    /// Pick the workspace directory for this run
    pub fn resolve_workspace(
        cli_workspace: Option<PathBuf>,
    ) -> Result<ResolvedWorkspace, ConfigError> {
        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        Self::resolve_workspace_from(cli_workspace, &Self::config_path(), &cwd)
    }

    pub fn resolve_workspace_from(
        cli_workspace: Option<PathBuf>,
        config_path: &Path,
        cwd: &Path,
    ) -> Result<ResolvedWorkspace, ConfigError> {
        let resolved = if let Some(path) = cli_workspace {
            ResolvedWorkspace {
                path,
                source: WorkspaceSource::CommandLine,
            }
        } else if let Some(config) = Self::read(config_path)? {
            ResolvedWorkspace {
                path: config.workspace_path,
                source: WorkspaceSource::ConfigFile,
            }
        } else {
            ResolvedWorkspace {
                path: cwd.join(DEFAULT_WORKSPACE_DIR),
                source: WorkspaceSource::Default,
            }
        };

        log::info!(
            "Using workspace {} ({})",
            resolved.path.display(),
            resolved.source
        );
        Ok(resolved)
    }
}

/// Expand `~` and `$VARS`, then anchor relative results at `base`.
///
/// A path that fails to expand (an unset variable, say) is used literally.
fn expand_workspace_path(raw: &Path, base: Option<&Path>) -> PathBuf {
    let raw_str = raw.to_string_lossy();
    let expanded = match shellexpand::full(&raw_str) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            log::warn!("Could not expand workspace path {raw_str}: {e}");
            raw.to_path_buf()
        }
    };

    match base {
        Some(base) if expanded.is_relative() => base.join(expanded),
        _ => expanded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let config_file = dir.path().join("config.toml");
        std::fs::write(&config_file, content).unwrap();
        config_file
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/notebox/config.toml"));
    }

    #[test]
    fn test_command_line_wins_over_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, r#"workspace_path = "/from/config""#);

        let resolved = Config::resolve_workspace_from(
            Some(PathBuf::from("/from/cli")),
            &config_file,
            Path::new("/cwd"),
        )
        .unwrap();

        assert_eq!(
            resolved,
            ResolvedWorkspace {
                path: PathBuf::from("/from/cli"),
                source: WorkspaceSource::CommandLine,
            }
        );
    }

    #[test]
    fn test_config_file_used_without_command_line() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, r#"workspace_path = "/from/config""#);

        let resolved =
            Config::resolve_workspace_from(None, &config_file, Path::new("/cwd")).unwrap();

        assert_eq!(resolved.path, PathBuf::from("/from/config"));
        assert_eq!(resolved.source, WorkspaceSource::ConfigFile);
    }

    #[test]
    fn test_default_workspace_without_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let resolved = Config::resolve_workspace_from(
            None,
            &temp_dir.path().join("missing.toml"),
            Path::new("/cwd"),
        )
        .unwrap();

        assert_eq!(resolved.path, PathBuf::from("/cwd/Workspace"));
        assert_eq!(resolved.source, WorkspaceSource::Default);
    }

    #[test]
    fn test_broken_config_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, "workspace_path = [unterminated");

        let result = Config::resolve_workspace_from(None, &config_file, Path::new("/cwd"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_relative_config_path_is_anchored_at_config_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, r#"workspace_path = "notes/Workspace""#);

        let config = Config::read(&config_file).unwrap().unwrap();
        assert_eq!(
            config.workspace_path,
            temp_dir.path().join("notes/Workspace")
        );
    }

    #[test]
    fn test_tilde_in_config_is_expanded() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, r#"workspace_path = "~/notes/Workspace""#);

        let config = Config::read(&config_file).unwrap().unwrap();
        let path = config.workspace_path.to_string_lossy();
        assert!(!path.starts_with('~'));
        assert!(path.ends_with("notes/Workspace"));
    }

    #[test]
    fn test_env_var_in_config_is_expanded() {
        unsafe {
            env::set_var("NOTEBOX_TEST_ROOT", "/srv/notebox");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file =
            write_config(&temp_dir, r#"workspace_path = "$NOTEBOX_TEST_ROOT/Workspace""#);
        let config = Config::read(&config_file).unwrap().unwrap();
        assert_eq!(config.workspace_path, PathBuf::from("/srv/notebox/Workspace"));

        unsafe {
            env::remove_var("NOTEBOX_TEST_ROOT");
        }
    }

    #[test]
    fn test_unexpandable_path_is_used_literally() {
        let expanded = expand_workspace_path(Path::new("/$NOTEBOX_SURELY_UNSET_VAR/x"), None);
        assert_eq!(expanded, PathBuf::from("/$NOTEBOX_SURELY_UNSET_VAR/x"));
    }

    #[test]
    fn test_write_and_read_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let config = Config::new("/tmp/notebox/Workspace");

        config.write(&config_file).unwrap();

        assert_eq!(Config::read(&config_file).unwrap(), Some(config));
    }
}
