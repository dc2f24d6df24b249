use crate::CLAP_STYLING;
use clap::{arg, command};

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/tendril/config.json";

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("tendril")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("tendril")
        .about("Explore a website's link structure one node at a time")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(clap::ArgAction::Count)
                .global(true),
        )
        .arg(
            arg!(-c --"config" <PATH>)
                .required(false)
                .global(true)
                .help("Path to a JSON explorer configuration file"),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes a default explorer configuration file")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location of the configuration file")
                        .default_value(DEFAULT_CONFIG_PATH),
                )
                .arg(
                    arg!(-f - -"force")
                        .help("Overwrite an existing configuration file without asking")
                        .required(false),
                ),
        )
        .subcommand(
            command!("explore")
                .about(
                    "Fetch a seed page and explore its links as a tree, expanding nodes on \
                demand.",
                )
                .arg(
                    arg!(<URL>)
                        .required(true)
                        .help("The seed URL (https:// is assumed when no scheme is given)"),
                )
                .arg(
                    arg!(--"direct")
                        .required(false)
                        .help("Try fetching pages directly before falling back to the proxies")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-e --"expand" <ID>)
                        .required(false)
                        .help("Expand the node with this id after loading (repeatable, applied in order)")
                        .value_parser(clap::value_parser!(u64))
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the tree to a file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"no-interactive")
                        .required(false)
                        .help("Print the tree and exit instead of starting the prompt")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
