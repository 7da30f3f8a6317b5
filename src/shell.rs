// src/shell.rs
//! Line-oriented front end: pick a user, then follow, unfollow and inspect.

use std::io::{BufRead, Write};

use anyhow::{bail, Result};
use colored::Colorize;

use crate::cli::display;
use crate::render;
use crate::session::UserSession;
use crate::store::RelationshipStore;

/// Commands accepted at the `follownet>` prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Select(String),
    Create(String),
    Follow(String),
    Unfollow(String),
    Followers,
    Following,
    Suggest,
    Users,
    Graph,
    WhoAmI,
    Help,
    Quit,
}

const HELP: &str = "\
select NAME    switch to an existing user
create NAME    register a new user and switch to them
follow NAME    follow a user
unfollow NAME  stop following a user
followers      list who follows you
following      list who you follow
suggest        list users you could follow
users          list every registered user
graph          print the follow graph as Graphviz DOT
whoami         show the selected user
help           show this message
quit           leave the shell";

/// Parses one input line. Blank lines and `#` comments yield `None`.
///
/// # Errors
/// Returns error for an unknown keyword or a missing/extra argument.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((k, r)) => (k, r.trim()),
        None => (trimmed, ""),
    };

    let cmd = match keyword.to_lowercase().as_str() {
        "select" | "open" => ShellCommand::Select(require_name(keyword, rest)?),
        "create" | "register" => ShellCommand::Create(require_name(keyword, rest)?),
        "follow" => ShellCommand::Follow(require_name(keyword, rest)?),
        "unfollow" => ShellCommand::Unfollow(require_name(keyword, rest)?),
        "followers" => no_args(keyword, rest, ShellCommand::Followers)?,
        "following" => no_args(keyword, rest, ShellCommand::Following)?,
        "suggest" => no_args(keyword, rest, ShellCommand::Suggest)?,
        "users" => no_args(keyword, rest, ShellCommand::Users)?,
        "graph" | "visualize" => no_args(keyword, rest, ShellCommand::Graph)?,
        "whoami" => no_args(keyword, rest, ShellCommand::WhoAmI)?,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => bail!("Unknown command: {other} (try `help`)"),
    };

    Ok(Some(cmd))
}

fn require_name(keyword: &str, rest: &str) -> Result<String> {
    if rest.is_empty() {
        bail!("`{keyword}` needs a username");
    }
    Ok(rest.to_string())
}

fn no_args(keyword: &str, rest: &str, cmd: ShellCommand) -> Result<ShellCommand> {
    if !rest.is_empty() {
        bail!("`{keyword}` takes no arguments");
    }
    Ok(cmd)
}

/// Interactive state: the store and the currently selected user, if any.
pub struct Shell<'a> {
    store: &'a mut RelationshipStore,
    selected: Option<String>,
}

impl<'a> Shell<'a> {
    #[must_use]
    pub fn new(store: &'a mut RelationshipStore) -> Self {
        Self {
            store,
            selected: None,
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Reads commands until `quit` or end of input. Command failures are
    /// printed and the loop continues.
    ///
    /// # Errors
    /// Returns error only if reading input or writing output fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        write_prompt(out, self.selected())?;

        for line in input.lines() {
            let line = line?;
            match parse_line(&line) {
                Ok(Some(ShellCommand::Quit)) => return Ok(()),
                Ok(Some(cmd)) => {
                    if let Err(e) = self.execute(&cmd, out) {
                        writeln!(out, "{} {e}", "✗".red())?;
                    }
                }
                Ok(None) => {}
                Err(e) => writeln!(out, "{} {e}", "✗".red())?,
            }
            write_prompt(out, self.selected())?;
        }

        writeln!(out)?;
        Ok(())
    }

    /// Runs a single command against the store.
    ///
    /// # Errors
    /// Returns the domain error when the store rejects the command, or an
    /// error when a command needs a selected user and none is selected.
    pub fn execute<W: Write>(&mut self, cmd: &ShellCommand, out: &mut W) -> Result<()> {
        match cmd {
            ShellCommand::Select(name) => {
                let session = UserSession::open(self.store, name)?;
                writeln!(out, "{} Now acting as @{}", "✓".green(), session.username())?;
                self.selected = Some(name.clone());
            }
            ShellCommand::Create(name) => {
                self.store.register(name)?;
                writeln!(out, "{} Created @{name}", "✓".green())?;
                self.selected = Some(name.clone());
            }
            ShellCommand::Follow(target) => {
                self.session()?.follow(target)?;
                writeln!(out, "{} You are now following {target}", "✓".green())?;
            }
            ShellCommand::Unfollow(target) => {
                self.session()?.unfollow(target)?;
                writeln!(out, "{} You are no longer following {target}", "✓".green())?;
            }
            ShellCommand::Followers => {
                let session = self.session()?;
                write!(out, "{}", display::format_followers(&session.list_followers()))?;
            }
            ShellCommand::Following => {
                let session = self.session()?;
                write!(out, "{}", display::format_following(&session.list_following()))?;
            }
            ShellCommand::Suggest => {
                let session = self.session()?;
                write!(out, "{}", display::format_suggestions(&session.suggestions()))?;
            }
            ShellCommand::Users => {
                let users: Vec<&str> = self.store.users().collect();
                write!(out, "{}", display::format_users(&users, self.selected()))?;
            }
            ShellCommand::Graph => write!(out, "{}", render::to_dot(self.store))?,
            ShellCommand::WhoAmI => match self.selected() {
                Some(name) => writeln!(out, "@{name}")?,
                None => writeln!(out, "{}", "No user selected.".dimmed())?,
            },
            ShellCommand::Help => writeln!(out, "{HELP}")?,
            ShellCommand::Quit => {}
        }
        Ok(())
    }

    fn session(&mut self) -> Result<UserSession<'_>> {
        let Some(name) = self.selected.as_deref() else {
            bail!("No user selected. Use `select NAME` or `create NAME` first.");
        };
        Ok(UserSession::open(self.store, name)?)
    }
}

fn write_prompt<W: Write>(out: &mut W, selected: Option<&str>) -> Result<()> {
    match selected {
        Some(name) => write!(out, "follownet @{name}> ")?,
        None => write!(out, "follownet> ")?,
    }
    out.flush()?;
    Ok(())
}
