//! Repository handle and read-only queries.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::blame::{BlameLine, parse_blame_porcelain};
use crate::diff::{Diff, DiffOptions};
use crate::error::{Error, Result};
use crate::runner::{CommandOutput, CommandRunner, GitCli};
use crate::status::{StatusSnapshot, UnmergedStage, parse_status_z, parse_unmerged_stages};

/// Default timeout for local commands.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for commands that talk to a remote.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(120);

/// A working tree plus the runner used to drive git inside it.
///
/// Holds no repository state of its own: every query re-runs git.
pub struct Repository<R: CommandRunner = GitCli> {
    workdir: PathBuf,
    git_dir: PathBuf,
    runner: R,
    timeout: Duration,
    remote_timeout: Duration,
}

impl Repository<GitCli> {
    /// Open the repository containing `path`, driving the `git` on `PATH`.
    ///
    /// # Errors
    /// Returns error if no repository found at path or any parent, or the
    /// repository is bare.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, GitCli::new())
    }

    /// Open the repository containing the current directory.
    ///
    /// # Errors
    /// Returns error if not inside a git repository.
    pub fn open_current() -> Result<Self> {
        Self::open(".")
    }
}

impl<R: CommandRunner> Repository<R> {
    /// Open the repository containing `path` with a custom runner.
    ///
    /// Discovery resolves linked worktrees to their own git dir, so marker
    /// files are looked up where git writes them.
    ///
    /// # Errors
    /// Returns error if no repository is found or it has no working tree.
    pub fn open_with(path: impl AsRef<Path>, runner: R) -> Result<Self> {
        let inner = git2::Repository::discover(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::NotARepository
            } else {
                Error::Git2(e)
            }
        })?;
        let workdir = inner.workdir().ok_or(Error::BareRepository)?.to_path_buf();
        Ok(Self::from_parts(workdir, inner.path().to_path_buf(), runner))
    }

    /// Build a handle from already-known paths without touching the disk.
    #[must_use]
    pub const fn from_parts(workdir: PathBuf, git_dir: PathBuf, runner: R) -> Self {
        Self {
            workdir,
            git_dir,
            runner,
            timeout: DEFAULT_TIMEOUT,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Override the local and remote command timeouts.
    #[must_use]
    pub const fn with_timeouts(mut self, timeout: Duration, remote_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.remote_timeout = remote_timeout;
        self
    }

    /// Root of the working tree.
    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// The git dir (`.git`, or `.git/worktrees/<name>` for linked worktrees).
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The runner that spawns git.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Timeout applied to local commands.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run git in the working tree with the local timeout.
    pub(crate) async fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner.run(args, &self.workdir, self.timeout).await
    }

    /// Run git in the working tree with the remote timeout.
    pub(crate) async fn git_remote(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner.run(args, &self.workdir, self.remote_timeout).await
    }

    /// Run git and turn a non-zero exit into [`Error::CommandFailed`].
    pub(crate) async fn git_checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.git(args).await?;
        if !output.success() {
            return Err(Error::CommandFailed {
                command: args.join(" "),
                code: output.exit_code,
                message: output.error_message(),
            });
        }
        Ok(output)
    }

    // === Read queries ===

    /// Current status including branch tracking info.
    ///
    /// # Errors
    /// Returns error if git cannot be run or exits non-zero.
    pub async fn status(&self, include_ignored: bool) -> Result<StatusSnapshot> {
        let mut args = vec![
            "status",
            "--porcelain=v1",
            "--branch",
            "-z",
            "--untracked-files=all",
        ];
        if include_ignored {
            args.push("--ignored");
        }
        let output = self.git_checked(&args).await?;
        Ok(parse_status_z(&output.stdout, include_ignored))
    }

    /// Diff selected by `options`.
    ///
    /// # Errors
    /// Returns error if git cannot be run or exits non-zero.
    pub async fn diff(&self, options: &DiffOptions) -> Result<Diff> {
        let args = options.to_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.git_checked(&args).await?;
        Ok(Diff::parse(&output.stdout))
    }

    /// Line-by-line attribution of `path` at `HEAD` plus working-tree edits.
    ///
    /// # Errors
    /// Returns [`Error::FileNotBlamable`] if git refuses the path or its
    /// output is incoherent.
    pub async fn blame(&self, path: &str) -> Result<Vec<BlameLine>> {
        let output = self.git(&["blame", "--porcelain", "--", path]).await?;
        if !output.success() {
            return Err(Error::FileNotBlamable {
                path: path.to_string(),
                reason: output.error_message(),
            });
        }
        parse_blame_porcelain(path, &output.stdout)
    }

    /// Index stages recorded for an unmerged path.
    ///
    /// # Errors
    /// Returns error if git cannot be run or exits non-zero.
    pub async fn unmerged_stages(&self, path: &str) -> Result<Vec<UnmergedStage>> {
        let output = self.git_checked(&["ls-files", "-u", "-z", "--", path]).await?;
        Ok(parse_unmerged_stages(&output.stdout))
    }
}

impl<R: CommandRunner> std::fmt::Debug for Repository<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("workdir", &self.workdir)
            .field("git_dir", &self.git_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays canned output and records the arguments it was given.
    #[derive(Default)]
    struct ScriptedRunner {
        output: CommandOutput,
        calls: Mutex<Vec<String>>,
    }

    impl CommandRunner for ScriptedRunner {
        async fn run(
            &self,
            args: &[&str],
            _cwd: &Path,
            _timeout: Duration,
        ) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(args.join(" "));
            Ok(self.output.clone())
        }
    }

    fn repo(output: CommandOutput) -> Repository<ScriptedRunner> {
        Repository::from_parts(
            PathBuf::from("/work"),
            PathBuf::from("/work/.git"),
            ScriptedRunner {
                output,
                ..ScriptedRunner::default()
            },
        )
    }

    #[tokio::test]
    async fn test_status_uses_nul_porcelain() {
        let repo = repo(CommandOutput::new("## main\0 M a.rs\0", "", 0));
        let snapshot = repo.status(true).await.unwrap();
        assert_eq!(snapshot.entries.len(), 1);

        let calls = repo.runner.calls.lock().unwrap();
        assert_eq!(
            calls[0],
            "status --porcelain=v1 --branch -z --untracked-files=all --ignored"
        );
    }

    #[tokio::test]
    async fn test_failed_query_is_command_failed() {
        let repo = repo(CommandOutput::new("", "fatal: bad revision\n", 128));
        let err = repo.diff(&DiffOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::CommandFailed { code: 128, .. }));
        assert!(err.is_process_error());
    }

    #[tokio::test]
    async fn test_blame_refusal_is_not_blamable() {
        let repo = repo(CommandOutput::new(
            "",
            "fatal: no such path 'missing.rs' in HEAD\n",
            128,
        ));
        let err = repo.blame("missing.rs").await.unwrap_err();
        assert!(matches!(err, Error::FileNotBlamable { .. }));
    }

    #[test]
    fn test_open_outside_repository() {
        let temp = tempfile::TempDir::new().unwrap();
        // A fresh temp dir may still sit below a repository on some machines
        if git2::Repository::discover(temp.path()).is_err() {
            assert!(matches!(
                Repository::open(temp.path()),
                Err(Error::NotARepository)
            ));
        }
    }

    #[test]
    fn test_open_bare_repository() {
        let temp = tempfile::TempDir::new().unwrap();
        git2::Repository::init_bare(temp.path()).unwrap();
        assert!(matches!(
            Repository::open(temp.path()),
            Err(Error::BareRepository)
        ));
    }

    #[test]
    fn test_open_finds_workdir_and_git_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        git2::Repository::init(temp.path()).unwrap();
        let nested = temp.path().join("src");
        std::fs::create_dir(&nested).unwrap();

        let repo = Repository::open(&nested).unwrap();
        assert_eq!(
            repo.workdir().canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
        assert!(repo.git_dir().ends_with(".git/") || repo.git_dir().ends_with(".git"));
    }
}
