// src/bin/follownet.rs
use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use follownet_core::cli::{self, Cli};
use follownet_core::exit::FollownetExit;

fn main() -> FollownetExit {
    match run() {
        Ok(()) => FollownetExit::Success,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            FollownetExit::from_error(&e)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    cli::dispatch(&cli)
}
