//! Command-line definitions and dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

pub mod blame;
pub mod completions;
pub mod diff;
pub mod integrate;
pub mod remote;
pub mod resolve;
pub mod state;
pub mod status;
pub mod utils;

/// Inspect git output and drive stopped merges, rebases and cherry-picks.
#[derive(Debug, Parser)]
#[command(name = "sift", version, about, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log more (-v debug, -vv trace). `SIFT_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors and machine-readable output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Run as if started in PATH.
    #[arg(short = 'C', global = true, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Seconds before a local git command is killed.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show working-tree status.
    Status {
        /// Include ignored files.
        #[arg(long)]
        ignored: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show a parsed diff.
    Diff {
        /// Compare the index to HEAD.
        #[arg(long, conflicts_with = "commit")]
        staged: bool,

        /// Show what a commit introduced.
        #[arg(long, value_name = "REV")]
        commit: Option<String>,

        /// Lines of context.
        #[arg(short = 'U', long = "unified", value_name = "N")]
        context: Option<u32>,

        /// Ignore changes in the amount of whitespace.
        #[arg(short = 'b', long)]
        ignore_space_change: bool,

        /// Ignore all whitespace.
        #[arg(short = 'w', long)]
        ignore_all_space: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Restrict to one path.
        path: Option<String>,
    },

    /// Show who last changed each line of a file.
    Blame {
        path: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the merge, rebase, cherry-pick or revert in progress.
    State {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Settle conflicted paths.
    Resolve {
        #[arg(value_enum)]
        action: ResolveAction,

        /// Paths to resolve; prompts when omitted.
        paths: Vec<String>,
    },

    /// Continue the stopped operation after resolving conflicts.
    Continue,

    /// Abort the stopped operation.
    Abort,

    /// Skip the current commit of a rebase, cherry-pick or revert.
    Skip,

    /// Fetch from a remote.
    Fetch {
        /// Remote to fetch; all remotes when omitted.
        remote: Option<String>,

        /// Remove remote-tracking refs that no longer exist.
        #[arg(short, long)]
        prune: bool,
    },

    /// Pull into the current branch.
    Pull {
        remote: Option<String>,

        branch: Option<String>,

        /// Rebase instead of merging.
        #[arg(short, long)]
        rebase: bool,
    },

    /// Push to a remote.
    Push {
        remote: Option<String>,

        refspec: Option<String>,

        /// Overwrite the remote ref if it matches our tracking ref.
        #[arg(long)]
        force_with_lease: bool,

        /// Record the pushed branch as upstream.
        #[arg(short = 'u', long)]
        set_upstream: bool,
    },

    /// Merge a revision into the current branch.
    Merge {
        rev: String,

        /// Always create a merge commit.
        #[arg(long)]
        no_ff: bool,
    },

    /// Rebase the current branch onto an upstream.
    Rebase { upstream: String },

    /// Apply a commit onto the current branch.
    #[command(name = "cherry-pick")]
    CherryPick { commit: String },

    /// Create a commit undoing another.
    Revert { commit: String },

    /// Move HEAD to a target.
    Reset {
        #[arg(default_value = "HEAD")]
        target: String,

        /// Keep index and working tree.
        #[arg(long, conflicts_with = "hard")]
        soft: bool,

        /// Discard index and working-tree changes.
        #[arg(long)]
        hard: bool,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Which side wins, or keep the hand-edited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolveAction {
    /// Keep the current branch's version.
    Ours,
    /// Take the incoming version.
    Theirs,
    /// Stage the working-tree file as resolved.
    Mark,
}

/// Run the parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let global = utils::GlobalArgs {
        directory: cli.directory,
        timeout: cli.timeout,
    };

    match cli.command {
        Commands::Status { ignored, json } => status::run(&global, ignored, json).await,
        Commands::Diff {
            staged,
            commit,
            context,
            ignore_space_change,
            ignore_all_space,
            json,
            path,
        } => {
            let args = diff::DiffArgs {
                staged,
                commit,
                context,
                ignore_space_change,
                ignore_all_space,
                path,
            };
            diff::run(&global, args, json).await
        }
        Commands::Blame { path, json } => blame::run(&global, &path, json).await,
        Commands::State { json } => state::run(&global, json).await,
        Commands::Resolve { action, paths } => resolve::run(&global, action, paths).await,
        Commands::Continue => state::run_continue(&global).await,
        Commands::Abort => state::run_abort(&global).await,
        Commands::Skip => state::run_skip(&global).await,
        Commands::Fetch { remote, prune } => remote::fetch(&global, remote.as_deref(), prune).await,
        Commands::Pull {
            remote,
            branch,
            rebase,
        } => remote::pull(&global, remote.as_deref(), branch.as_deref(), rebase).await,
        Commands::Push {
            remote,
            refspec,
            force_with_lease,
            set_upstream,
        } => {
            let options = sift_git::PushOptions {
                remote,
                refspec,
                force_with_lease,
                set_upstream,
            };
            remote::push(&global, &options).await
        }
        Commands::Merge { rev, no_ff } => integrate::merge(&global, &rev, no_ff).await,
        Commands::Rebase { upstream } => integrate::rebase(&global, &upstream).await,
        Commands::CherryPick { commit } => integrate::cherry_pick(&global, &commit).await,
        Commands::Revert { commit } => integrate::revert(&global, &commit).await,
        Commands::Reset { target, soft, hard } => {
            let mode = if soft {
                sift_git::ResetMode::Soft
            } else if hard {
                sift_git::ResetMode::Hard
            } else {
                sift_git::ResetMode::Mixed
            };
            integrate::reset(&global, &target, mode).await
        }
        Commands::Completions { shell } => completions::run(shell),
    }
}
