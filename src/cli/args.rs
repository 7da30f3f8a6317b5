use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "follownet", version, about = "Personal follow graph manager")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    /// Store file (overrides `store.path` from the config)
    #[arg(long, global = true, value_name = "FILE")]
    pub store: Option<PathBuf>,
    /// Config file (defaults to ./follownet.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a seeded store file and a default follownet.toml
    Init {
        /// Overwrite an existing store file
        #[arg(long, short)]
        force: bool,
    },
    /// List every registered user
    Users,
    /// Register a new user
    Register { username: String },
    /// Follow TARGET as USER
    Follow {
        target: String,
        #[arg(long = "as", short = 'u', value_name = "USER")]
        user: String,
    },
    /// Stop following TARGET as USER
    Unfollow {
        target: String,
        #[arg(long = "as", short = 'u', value_name = "USER")]
        user: String,
    },
    /// List who follows USER
    Followers { user: String },
    /// List who USER follows
    Following { user: String },
    /// Show a user's counts and both lists
    Profile { user: String },
    /// List users USER could still follow
    Suggest { user: String },
    /// Print every follow relation
    Edges {
        #[arg(long)]
        json: bool,
    },
    /// Export the follow graph as Graphviz DOT
    Graph {
        /// Write to FILE instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Check the store file for one-sided, self or dangling relations
    Check {
        /// Repair the file in place (keeps a .bak copy if enabled)
        #[arg(long)]
        fix: bool,
    },
    /// Interactive shell
    Shell {
        /// Start with this user selected
        #[arg(long = "as", short = 'u', value_name = "USER")]
        user: Option<String>,
    },
}
