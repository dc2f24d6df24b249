pub mod commands;
pub mod handlers;
pub mod repl;

// Re-export commonly used handler functions for convenience
pub use handlers::{init_config, load_config, parse_seed_url, verbosity_filter};
pub use repl::{ReplCommand, parse_repl_command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
