// src/cli/handlers.rs
use crate::config::{Config, CONFIG_FILE};
use crate::render;
use crate::session::UserSession;
use crate::shell::{Shell, ShellCommand};
use crate::store::{self, RelationshipStore};
use crate::types::ConsistencyPolicy;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};

use super::args::{Cli, Commands};
use super::display;

/// Settings resolved from the command line and `follownet.toml`.
pub struct AppContext {
    pub config: Config,
    store_override: Option<PathBuf>,
    explicit_config: bool,
}

impl AppContext {
    /// # Errors
    /// Returns error if the config file is unreadable or invalid.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Ok(Self {
            config: Config::load(cli.config.as_deref())?,
            store_override: cli.store.clone(),
            explicit_config: cli.config.is_some(),
        })
    }

    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.store_override
            .clone()
            .unwrap_or_else(|| self.config.store_path())
    }

    /// Loads the store, reporting any repairs made on the way in.
    ///
    /// # Errors
    /// Returns error if the store file is unreadable or corrupt.
    pub fn open_store(&self) -> Result<RelationshipStore> {
        let path = self.store_path();
        let store = RelationshipStore::load(&path, &self.config.load_options())
            .with_context(|| format!("Failed to open store {}", path.display()))?;

        if !store.repairs().is_empty() {
            display::print_repairs(store.repairs());
        }
        Ok(store)
    }
}

/// Runs one CLI invocation.
///
/// # Errors
/// Returns error if the subcommand fails.
pub fn dispatch(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;

    match &cli.command {
        Commands::Init { force } => run_init(&ctx, *force),
        Commands::Users => run_users(&ctx),
        Commands::Register { username } => run_register(&ctx, username),
        Commands::Follow { target, user } => run_follow(&ctx, user, target),
        Commands::Unfollow { target, user } => run_unfollow(&ctx, user, target),
        Commands::Followers { user } => run_followers(&ctx, user),
        Commands::Following { user } => run_following(&ctx, user),
        Commands::Profile { user } => run_profile(&ctx, user),
        Commands::Suggest { user } => run_suggest(&ctx, user),
        Commands::Edges { json } => run_edges(&ctx, *json),
        Commands::Graph { output } => run_graph(&ctx, output.as_deref()),
        Commands::Check { fix } => run_check(&ctx, *fix),
        Commands::Shell { user } => run_shell(&ctx, user.as_deref()),
    }
}

fn run_init(ctx: &AppContext, force: bool) -> Result<()> {
    let path = ctx.store_path();
    if path.exists() && !force {
        bail!("{} already exists. Use --force to reseed it.", path.display());
    }

    let mut store = RelationshipStore::in_memory(ctx.config.directory.seed.iter().cloned())?;
    if let Some(events) = ctx.config.event_logger() {
        store = store.with_events(events);
    }
    store
        .save_as(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "{} Created {} with {} user(s)",
        "✓".green(),
        path.display(),
        store.len()
    );

    let config_path = Path::new(CONFIG_FILE);
    if !ctx.explicit_config && !config_path.exists() {
        std::fs::write(config_path, ctx.config.to_toml()?)
            .with_context(|| format!("Failed to write {CONFIG_FILE}"))?;
        println!("{} Created {CONFIG_FILE}", "✓".green());
    }
    Ok(())
}

fn run_users(ctx: &AppContext) -> Result<()> {
    let store = ctx.open_store()?;
    let users: Vec<&str> = store.users().collect();
    print!("{}", display::format_users(&users, None));
    Ok(())
}

fn run_register(ctx: &AppContext, username: &str) -> Result<()> {
    let mut store = ctx.open_store()?;
    store.register(username)?;
    println!("{} Registered @{username}", "✓".green());
    Ok(())
}

fn run_follow(ctx: &AppContext, user: &str, target: &str) -> Result<()> {
    let mut store = ctx.open_store()?;
    let mut session = UserSession::open(&mut store, user)?;
    session.follow(target)?;
    println!("{} @{user} is now following {target}", "✓".green());
    Ok(())
}

fn run_unfollow(ctx: &AppContext, user: &str, target: &str) -> Result<()> {
    let mut store = ctx.open_store()?;
    let mut session = UserSession::open(&mut store, user)?;
    session.unfollow(target)?;
    println!("{} @{user} is no longer following {target}", "✓".green());
    Ok(())
}

fn run_followers(ctx: &AppContext, user: &str) -> Result<()> {
    let mut store = ctx.open_store()?;
    let session = UserSession::open(&mut store, user)?;
    print!("{}", display::format_followers(&session.list_followers()));
    Ok(())
}

fn run_following(ctx: &AppContext, user: &str) -> Result<()> {
    let mut store = ctx.open_store()?;
    let session = UserSession::open(&mut store, user)?;
    print!("{}", display::format_following(&session.list_following()));
    Ok(())
}

fn run_profile(ctx: &AppContext, user: &str) -> Result<()> {
    let mut store = ctx.open_store()?;
    let session = UserSession::open(&mut store, user)?;
    display::print_profile(
        session.username(),
        &session.list_following(),
        &session.list_followers(),
    );
    Ok(())
}

fn run_suggest(ctx: &AppContext, user: &str) -> Result<()> {
    let mut store = ctx.open_store()?;
    let session = UserSession::open(&mut store, user)?;
    print!("{}", display::format_suggestions(&session.suggestions()));
    Ok(())
}

fn run_edges(ctx: &AppContext, json: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let edges = store.edges();

    if json {
        println!("{}", serde_json::to_string_pretty(&edges)?);
    } else {
        display::print_edges(&edges);
    }
    Ok(())
}

fn run_graph(ctx: &AppContext, output: Option<&Path>) -> Result<()> {
    let store = ctx.open_store()?;
    let dot = render::to_dot(&store);

    match output {
        Some(path) => {
            std::fs::write(path, dot)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} Wrote {}", "✓".green(), path.display());
            println!(
                "  {}",
                format!("render with: dot -Tpng {} -o graph.png", path.display()).dimmed()
            );
        }
        None => print!("{dot}"),
    }
    Ok(())
}

fn run_check(ctx: &AppContext, fix: bool) -> Result<()> {
    let path = ctx.store_path();
    display::print_check_header(&path.display().to_string());

    let Some(report) = store::inspect_file(&path)
        .with_context(|| format!("Failed to read store {}", path.display()))?
    else {
        println!("{} No store file yet; nothing to check.", "✓".green());
        return Ok(());
    };

    for issue in &report.issues {
        display::print_issue(issue);
    }

    if report.is_ok() {
        println!("{} Store is consistent.", "✓".green());
        return Ok(());
    }

    if !fix {
        bail!(
            "{} issue(s) found. Run `follownet check --fix` to repair.",
            report.issues.len()
        );
    }

    repair_file(ctx, &path)
}

fn repair_file(ctx: &AppContext, path: &Path) -> Result<()> {
    let mut options = ctx.config.load_options();
    options.policy = ConsistencyPolicy::Repair;
    let store = RelationshipStore::load(path, &options)?;

    let backup = if ctx.config.store.backup {
        store.save_with_backup()?
    } else {
        store.save()?;
        None
    };

    println!(
        "\n{} Repaired {} issue(s)",
        "✓".green(),
        store.repairs().len()
    );
    if let Some(backup) = backup {
        println!("  {}", format!("backup: {}", backup.display()).dimmed());
    }
    Ok(())
}

fn run_shell(ctx: &AppContext, user: Option<&str>) -> Result<()> {
    let mut store = ctx.open_store()?;
    let mut shell = Shell::new(&mut store);
    let mut stdout = io::stdout();

    if let Some(name) = user {
        shell.execute(&ShellCommand::Select(name.to_string()), &mut stdout)?;
    }

    shell.run(io::stdin().lock(), &mut stdout)
}
