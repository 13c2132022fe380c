//! Configuration management for Sift.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sift_git::DiffOptions;

use crate::error::Result;

/// File name of the config inside the git dir.
pub const CONFIG_FILE: &str = "sift.toml";

/// Sift configuration loaded from `<git-dir>/sift.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Status query settings.
    #[serde(default)]
    pub status: StatusConfig,

    /// Diff query settings.
    #[serde(default)]
    pub diff: DiffConfig,
}

impl Config {
    /// Location of the config for a repository.
    #[must_use]
    pub fn path_in(git_dir: &Path) -> PathBuf {
        git_dir.join(CONFIG_FILE)
    }

    /// Load config from a TOML file, or defaults if it does not exist.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save config to a TOML file.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| std::io::Error::other(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Timeout for local git commands.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.general.timeout_secs)
    }

    /// Timeout for git commands that reach a remote.
    #[must_use]
    pub const fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.general.remote_timeout_secs)
    }

    /// Diff options seeded from the `[diff]` table.
    #[must_use]
    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            context_lines: Some(self.diff.context_lines),
            detect_renames: self.diff.detect_renames,
            ..DiffOptions::default()
        }
    }
}

/// General Sift settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Git executable to run.
    #[serde(default = "default_git_program")]
    pub git_program: String,

    /// Seconds before a local git command is killed.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Seconds before fetch/pull/push is killed.
    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            git_program: default_git_program(),
            timeout_secs: default_timeout_secs(),
            remote_timeout_secs: default_remote_timeout_secs(),
        }
    }
}

fn default_git_program() -> String {
    "git".into()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_remote_timeout_secs() -> u64 {
    120
}

/// Status settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfig {
    /// List ignored files as well.
    #[serde(default)]
    pub include_ignored: bool,
}

/// Diff settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Lines of context around each change.
    #[serde(default = "default_context_lines")]
    pub context_lines: u32,

    /// Pair deletions and additions into renames.
    #[serde(default = "default_true")]
    pub detect_renames: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
            detect_renames: true,
        }
    }
}

const fn default_context_lines() -> u32 {
    3
}

const fn default_true() -> bool {
    true
}
