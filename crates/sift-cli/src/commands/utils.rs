use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use sift_core::Config;
use sift_git::{GitCli, OperationOutcome, Repository};

use crate::output;

/// Flags shared by every subcommand.
#[derive(Debug, Default)]
pub struct GlobalArgs {
    pub directory: Option<PathBuf>,
    pub timeout: Option<u64>,
}

/// Helper to open the repository and its config.
///
/// The runner and timeouts come from `sift.toml`, with `--timeout`
/// overriding the local one.
pub fn open_repo_and_config(global: &GlobalArgs) -> Result<(Repository, Config)> {
    let start = global.directory.clone().unwrap_or_else(|| PathBuf::from("."));
    let found = Repository::open(&start).context("Not inside a git repository")?;

    let config = Config::load(Config::path_in(found.git_dir()))
        .context("Failed to load sift.toml")?;

    let timeout = global
        .timeout
        .map_or_else(|| config.timeout(), Duration::from_secs);
    let repo = Repository::from_parts(
        found.workdir().to_path_buf(),
        found.git_dir().to_path_buf(),
        GitCli::with_program(&config.general.git_program),
    )
    .with_timeouts(timeout, config.remote_timeout());

    Ok((repo, config))
}

/// Pass a successful record through; otherwise explain and fail.
///
/// Conflicts get a hint on how to proceed before the error.
pub fn finish<T: OperationOutcome>(operation: &str, record: T) -> Result<T> {
    match sift_core::require_success(operation, record) {
        Ok(record) => Ok(record),
        Err(sift_core::Error::UnresolvedConflicts(paths)) => {
            output::warn(&format!("{operation} stopped with conflicts:"));
            for path in &paths {
                output::detail(&format!("  → {path}"));
            }
            output::info("Resolve them with `sift resolve`, then run `sift continue`");
            output::info("Or abort with: sift abort");
            bail!("{operation} has {} unresolved conflict(s)", paths.len())
        }
        Err(e) => Err(e.into()),
    }
}

/// Print a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    output::essential(&serde_json::to_string_pretty(value)?);
    Ok(())
}
