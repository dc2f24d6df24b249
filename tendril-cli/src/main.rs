use colored::Colorize;
use tendril_cli::commands::command_argument_builder;
use tendril_cli::handlers::{handle_explore, handle_init};
use tendril_cli::verbosity_filter;
use tracing_subscriber::EnvFilter;

fn print_banner() {
    println!(
        "{}",
        r#"
  _                 _      _ _
 | |_ ___ _ __   __| |_ __(_) |
 | __/ _ \ '_ \ / _` | '__| | |
 | ||  __/ | | | (_| | |  | | |
  \__\___|_| |_|\__,_|_|  |_|_|
"#
        .bright_green()
        .bold()
    );
    println!(
        "  {} {}\n",
        "progressive link explorer".dimmed(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}

/// Logs go to stderr so they never mix with a report on stdout.
fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_filter(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();

    // Globals are readable from whichever level they were given at
    let scoped = chosen_command
        .subcommand()
        .map(|(_, sub)| sub)
        .unwrap_or(&chosen_command);
    let quiet = scoped.get_flag("quiet");
    init_tracing(scoped.get_count("verbose"));
    let config_path = scoped.get_one::<String>("config").map(String::as_str);

    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("init", primary_command)) => handle_init(primary_command),
        Some(("explore", primary_command)) => {
            handle_explore(primary_command, config_path, quiet).await
        }
        _ => {
            println!(
                "Run {} to start, or {} for options.",
                "tendril explore <URL>".bright_cyan(),
                "tendril --help".bright_cyan()
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
