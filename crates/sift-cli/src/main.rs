//! Sift CLI - inspect git output and drive stopped merges, rebases and picks.

use anyhow::Context;
use clap::Parser;

mod commands;
mod logging;
mod output;

use commands::Cli;

fn main() {
    let cli = Cli::parse();
    output::set_quiet(cli.quiet);
    logging::init(cli.verbose);

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
        .and_then(|runtime| runtime.block_on(commands::run(cli)));

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
