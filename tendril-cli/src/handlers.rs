use crate::commands::DEFAULT_CONFIG_PATH;
use crate::repl;
use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tendril_core::report::{self, ReportFormat};
use tendril_core::{
    EventCallback, ExploreEvent, Explorer, LoadOutcome, NodeId, SessionSnapshot, ToggleOutcome,
};
use tendril_scanner::ExplorerConfig;
use tendril_scanner::normalize::normalize_str;
use tracing::{debug, info};

/// Parse a seed URL typed by the user, assuming https:// for a bare host.
pub fn parse_seed_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.contains("://") {
        return normalize_str(raw, None);
    }
    normalize_str(&format!("https://{}", raw), None)
}

/// `EnvFilter` directives for a `-v` count.
pub fn verbosity_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!(
        "tendril={},tendril_cli={},tendril_core={},tendril_scanner={}",
        level, level, level, level
    )
}

/// Load the explorer configuration.
///
/// An explicit path must exist. Without one, the default location is used
/// when present, otherwise the built-in defaults.
pub fn load_config(path: Option<&str>) -> Result<ExplorerConfig> {
    let explicit = path.is_some();
    let expanded = shellexpand::tilde(path.unwrap_or(DEFAULT_CONFIG_PATH));
    let config_path = Path::new(expanded.as_ref());

    if !explicit && !config_path.exists() {
        debug!("No config at {}, using defaults", config_path.display());
        return Ok(ExplorerConfig::default());
    }

    info!("Loading config from {}", config_path.display());
    ExplorerConfig::from_file(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))
}

/// Write the default configuration to `path`.
///
/// Returns `false` without touching anything when the file exists and
/// `overwrite` is not set.
pub fn init_config(path: &Path, overwrite: bool) -> Result<bool> {
    if path.exists() && !overwrite {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = ExplorerConfig::default().to_json()?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

pub fn toggle_message(id: NodeId, outcome: &ToggleOutcome) -> String {
    match outcome {
        ToggleOutcome::NotFound => format!("No node #{}", id),
        ToggleOutcome::Collapsed => format!("Collapsed #{}", id),
        ToggleOutcome::Expanded => format!("Expanded #{}", id),
        ToggleOutcome::Loaded(LoadOutcome::Loaded {
            children,
            total_found,
            was_truncated,
        }) => {
            if *was_truncated {
                format!("Loaded #{}: {} of {} links", id, children, total_found)
            } else {
                format!("Loaded #{}: {} links", id, children)
            }
        }
        ToggleOutcome::Loaded(LoadOutcome::Failed(message)) => {
            format!("Failed to load #{}: {}", id, message)
        }
        ToggleOutcome::Loaded(LoadOutcome::Skipped) => format!("Expanded #{} (already loading)", id),
    }
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> String {
    print!("{} ", msg.bright_cyan().bold());
    let _ = io::stdout().flush();
    let mut response = String::new();
    if io::stdin().read_line(&mut response).is_err() {
        return String::new();
    }
    response.trim().to_lowercase()
}

fn new_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);
    spinner
}

/// Shows a spinner between a fetch starting and its outcome event.
pub fn spinner_callback() -> EventCallback {
    let active: Arc<Mutex<Option<ProgressBar>>> = Arc::new(Mutex::new(None));
    Arc::new(move |event: &ExploreEvent| {
        let Ok(mut slot) = active.lock() else {
            return;
        };
        if let Some(spinner) = slot.take() {
            spinner.finish_and_clear();
        }
        match event {
            ExploreEvent::Exploring { url } => {
                *slot = Some(new_spinner(format!("Exploring {}", url)));
            }
            ExploreEvent::NodeLoading { id, url } => {
                *slot = Some(new_spinner(format!("Loading #{} {}", id, url)));
            }
            _ => {}
        }
    })
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    print_divider();
    println!("{}", "  TENDRIL INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let raw_path = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_PATH);
    let force = args.get_flag("force");
    let expanded = shellexpand::tilde(raw_path);
    let config_path = Path::new(expanded.as_ref());

    println!(
        "{} Target: {}",
        "→".blue(),
        config_path.display().to_string().bright_white()
    );
    println!();

    if config_path.exists() && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("A configuration file already exists:");
        println!(
            "  {} {}",
            "•".yellow(),
            config_path.display().to_string().bright_white()
        );
        println!();

        let response = print_prompt("Overwrite it? [y/N]:");
        println!();
        if response != "y" && response != "yes" {
            println!("{} Initialization cancelled.", "✗".red().bold());
            return Ok(());
        }
    }

    init_config(config_path, true)?;

    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!(
        "{} Config: {}",
        "✓".green().bold(),
        config_path.display().to_string().bright_white()
    );
    println!();
    Ok(())
}

/// Render the session in `format` and print it or save it to `output`.
pub fn emit_report(
    snapshot: &SessionSnapshot,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let content = match format {
        ReportFormat::Text => report::generate_text_report(snapshot, output.is_none()),
        ReportFormat::Json => report::generate_json_report(snapshot)?,
    };

    match output {
        Some(path) => {
            report::save_report(&content, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", content),
    }
    Ok(())
}

pub async fn handle_explore(args: &ArgMatches, config_path: Option<&str>, quiet: bool) -> Result<()> {
    let raw_url = args
        .get_one::<String>("URL")
        .map(String::as_str)
        .unwrap_or_default();
    let Some(seed) = parse_seed_url(raw_url) else {
        bail!("Invalid URL '{}': expected an http(s) address", raw_url);
    };

    let mut config = load_config(config_path)?;
    if args.get_flag("direct") {
        config = config.with_direct_fetch();
    }
    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = args.get_one::<PathBuf>("output");
    let expand: Vec<NodeId> = args
        .get_many::<u64>("expand")
        .map(|ids| ids.copied().map(NodeId).collect())
        .unwrap_or_default();
    let interactive = !args.get_flag("no-interactive") && io::stdin().is_terminal();

    let mut explorer = Explorer::new(&config).context("Invalid explorer configuration")?;
    info!(
        "Fetching through {} template(s), cap {} links per page",
        explorer.fetcher().templates().len(),
        config.max_links_per_page
    );
    if !quiet {
        explorer = explorer.with_event_callback(spinner_callback());
    }

    explorer
        .explore(&seed)
        .await
        .with_context(|| format!("Exploration of {} failed", seed))?;

    for id in expand {
        let outcome = explorer.toggle(id).await?;
        let message = toggle_message(id, &outcome);
        match outcome {
            ToggleOutcome::NotFound | ToggleOutcome::Loaded(LoadOutcome::Failed(_)) => {
                eprintln!("{} {}", "✗".red().bold(), message)
            }
            _ => println!("{} {}", "✓".green().bold(), message),
        }
    }

    let snapshot = explorer.snapshot().await;
    emit_report(&snapshot, format, output.map(PathBuf::as_path))?;

    if interactive {
        repl::run(&explorer).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filter() {
        assert_eq!(
            verbosity_filter(0),
            "tendril=warn,tendril_cli=warn,tendril_core=warn,tendril_scanner=warn"
        );
        assert!(verbosity_filter(2).starts_with("tendril=debug"));
        assert!(verbosity_filter(9).starts_with("tendril=trace"));
    }

    #[test]
    fn test_toggle_messages() {
        let id = NodeId(4);
        assert_eq!(toggle_message(id, &ToggleOutcome::NotFound), "No node #4");
        assert_eq!(
            toggle_message(
                id,
                &ToggleOutcome::Loaded(LoadOutcome::Loaded {
                    children: 50,
                    total_found: 75,
                    was_truncated: true,
                })
            ),
            "Loaded #4: 50 of 75 links"
        );
        assert_eq!(
            toggle_message(id, &ToggleOutcome::Loaded(LoadOutcome::Failed("boom".into()))),
            "Failed to load #4: boom"
        );
    }
}
