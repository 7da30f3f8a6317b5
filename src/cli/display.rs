// src/cli/display.rs
use crate::store::ConsistencyIssue;
use crate::types::Edge;
use colored::Colorize;
use std::fmt::Write;

const NO_FOLLOWERS: &str = "No followers yet.";
const NO_FOLLOWING: &str = "You are not following anyone yet.";

#[must_use]
pub fn format_followers(names: &[&str]) -> String {
    format_list("Followers", names, NO_FOLLOWERS)
}

#[must_use]
pub fn format_following(names: &[&str]) -> String {
    format_list("Following", names, NO_FOLLOWING)
}

#[must_use]
pub fn format_suggestions(names: &[&str]) -> String {
    format_list("You could follow", names, "Nobody left to follow.")
}

/// Lists the directory, marking the selected user.
#[must_use]
pub fn format_users(names: &[&str], selected: Option<&str>) -> String {
    let mut out = format!("{} ({})\n", "Users".bold(), names.len());
    for name in names {
        if Some(*name) == selected {
            let _ = writeln!(out, "  {} {}", "*".green(), name.green());
        } else {
            let _ = writeln!(out, "    {name}");
        }
    }
    out
}

fn format_list(title: &str, names: &[&str], empty: &str) -> String {
    if names.is_empty() {
        return format!("{}\n", empty.dimmed());
    }

    let mut out = format!("{} ({})\n", title.bold(), names.len());
    for name in names {
        let _ = writeln!(out, "  {name}");
    }
    out
}

pub fn print_profile(username: &str, following: &[&str], followers: &[&str]) {
    println!("{}", format!("@{username}").bold());
    println!(
        "   Following: {}   Followers: {}\n",
        following.len(),
        followers.len()
    );
    print!("{}", format_following(following));
    println!();
    print!("{}", format_followers(followers));
}

pub fn print_edges(edges: &[Edge]) {
    if edges.is_empty() {
        println!("{}", "No follow relations yet.".dimmed());
        return;
    }
    for edge in edges {
        println!("{} {} {}", edge.follower, "->".dimmed(), edge.followed);
    }
}

pub fn print_repairs(issues: &[ConsistencyIssue]) {
    eprintln!(
        "{} Store was inconsistent; repaired {} issue(s):",
        "warning:".yellow().bold(),
        issues.len()
    );
    for issue in issues {
        eprintln!("    {} {issue}", "~".yellow());
    }
}

pub fn print_check_header(path: &str) {
    println!("\n{} {}", "Consistency check".bold(), path.dimmed());
    println!("{}\n", "-".repeat(40));
}

pub fn print_issue(issue: &ConsistencyIssue) {
    println!("  {} {issue}", "✗".red());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lists_use_friendly_messages() {
        assert!(format_followers(&[]).contains("No followers yet."));
        assert!(format_following(&[]).contains("You are not following anyone yet."));
    }

    #[test]
    fn lists_one_name_per_line() {
        let text = format_following(&["Ama", "Siaw"]);
        assert!(text.contains("  Ama\n"));
        assert!(text.contains("  Siaw\n"));
    }
}
