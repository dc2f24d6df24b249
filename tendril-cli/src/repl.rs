//! Line prompt driving an [`Explorer`] session.

use crate::handlers::{parse_seed_url, toggle_message};
use anyhow::{Result, bail};
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;
use tendril_core::report;
use tendril_core::{Explorer, NodeId, ToggleOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};

pub const HELP: &str = "\
Commands:
  toggle <id>, t <id>, <id>   expand or collapse a node
  collapse                    collapse everything but the root
  tree                        show the tree
  stats                       show session statistics
  json [PATH]                 print the session as JSON, or save it
  explore <url>               start over from a new seed
  clear                       discard the tree
  help                        show this help
  quit                        leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Toggle(NodeId),
    Collapse,
    Tree,
    Stats,
    Json(Option<PathBuf>),
    Explore(String),
    Clear,
    Help,
    Quit,
}

fn parse_id(raw: &str) -> Result<NodeId, String> {
    raw.trim_start_matches('#')
        .parse::<u64>()
        .map(NodeId)
        .map_err(|_| format!("'{}' is not a node id", raw))
}

pub fn parse_repl_command(line: &str) -> Result<ReplCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Err("empty command".to_string());
    };
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("too many arguments for '{}'", command));
    }
    let command = command.to_lowercase();

    let bare = |parsed: ReplCommand| match arg {
        None => Ok(parsed),
        Some(_) => Err(format!("'{}' takes no arguments", command)),
    };

    match command.as_str() {
        "toggle" | "t" => match arg {
            Some(id) => parse_id(id).map(ReplCommand::Toggle),
            None => Err("usage: toggle <id>".to_string()),
        },
        "collapse" => bare(ReplCommand::Collapse),
        "tree" | "ls" => bare(ReplCommand::Tree),
        "stats" => bare(ReplCommand::Stats),
        "json" => Ok(ReplCommand::Json(arg.map(PathBuf::from))),
        "explore" | "open" => match arg {
            Some(url) => Ok(ReplCommand::Explore(url.to_string())),
            None => Err("usage: explore <url>".to_string()),
        },
        "clear" => bare(ReplCommand::Clear),
        "help" | "h" | "?" => bare(ReplCommand::Help),
        "quit" | "exit" | "q" => bare(ReplCommand::Quit),
        other if arg.is_none() && parse_id(other).is_ok() => parse_id(other).map(ReplCommand::Toggle),
        other => Err(format!("unknown command '{}', try 'help'", other)),
    }
}

fn print_tree(snapshot: &tendril_core::SessionSnapshot) {
    print!("{}", report::render_tree(snapshot, true));
}

/// Run one command. Quit is handled by the caller.
pub async fn execute(explorer: &Explorer, command: ReplCommand) -> Result<()> {
    match command {
        ReplCommand::Toggle(id) => {
            let outcome = explorer.toggle(id).await?;
            println!("{}", toggle_message(id, &outcome));
            if outcome != ToggleOutcome::NotFound {
                print_tree(&explorer.snapshot().await);
            }
        }
        ReplCommand::Collapse => {
            if explorer.collapse_all().await {
                print_tree(&explorer.snapshot().await);
            } else {
                println!("Nothing to collapse");
            }
        }
        ReplCommand::Tree => print_tree(&explorer.snapshot().await),
        ReplCommand::Stats => println!("{}", report::render_stats(&explorer.stats().await)),
        ReplCommand::Json(path) => {
            let json = report::generate_json_report(&explorer.snapshot().await)?;
            match path {
                Some(path) => {
                    report::save_report(&json, &path)?;
                    println!("{} Saved to {}", "✓".green().bold(), path.display());
                }
                None => println!("{}", json),
            }
        }
        ReplCommand::Explore(raw) => {
            let Some(seed) = parse_seed_url(&raw) else {
                bail!("Invalid URL '{}'", raw);
            };
            let snapshot = explorer.explore(&seed).await?;
            print_tree(&snapshot);
        }
        ReplCommand::Clear => {
            explorer.clear().await;
            println!("Session cleared");
        }
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Quit => {}
    }
    Ok(())
}

pub async fn run(explorer: &Explorer) -> Result<()> {
    println!("\nType {} for commands.", "help".bright_cyan());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "tendril>".bright_cyan().bold());
        let _ = io::stdout().flush();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_repl_command(line) {
            Ok(ReplCommand::Quit) => break,
            Ok(command) => {
                if let Err(e) = execute(explorer, command).await {
                    eprintln!("{} {:#}", "✗".red().bold(), e);
                }
            }
            Err(message) => eprintln!("{} {}", "✗".red().bold(), message),
        }
    }
    println!();
    Ok(())
}
