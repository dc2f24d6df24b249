use std::io::Write;
use tempfile::NamedTempFile;
use tendril_cli::handlers::*;
use tendril_cli::{ReplCommand, parse_repl_command};
use tendril_core::NodeId;
use tendril_scanner::ExplorerConfig;

#[test]
fn test_parse_seed_url_with_scheme() {
    assert_eq!(
        parse_seed_url("https://example.com/docs#intro"),
        Some("https://example.com/docs".to_string())
    );
}

#[test]
fn test_parse_seed_url_without_scheme() {
    assert_eq!(
        parse_seed_url("  example.com "),
        Some("https://example.com/".to_string())
    );
    assert_eq!(
        parse_seed_url("docs.rs/tokio"),
        Some("https://docs.rs/tokio".to_string())
    );
}

#[test]
fn test_parse_seed_url_invalid() {
    assert_eq!(parse_seed_url(""), None);
    assert_eq!(parse_seed_url("not a valid url!!!"), None);
    assert_eq!(parse_seed_url("ftp://example.com/file"), None);
}

#[test]
fn test_load_config_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(
        temp_file,
        r#"{{ "max_links_per_page": 10, "proxies": ["{{raw}}"] }}"#
    )?;

    let path = temp_file.path().to_string_lossy().to_string();
    let config = load_config(Some(&path))?;
    assert_eq!(config.max_links_per_page, 10);
    assert_eq!(config.proxies, vec!["{raw}".to_string()]);
    // Unset fields keep their defaults
    assert_eq!(config.timeout_secs, ExplorerConfig::default().timeout_secs);
    Ok(())
}

#[test]
fn test_load_config_missing_explicit_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.json");
    let result = load_config(Some(path.to_str().unwrap()));
    assert!(result.is_err());
}

#[test]
fn test_load_config_rejects_invalid_values() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, r#"{{ "proxies": [] }}"#).unwrap();
    let path = temp_file.path().to_string_lossy().to_string();
    let error = load_config(Some(&path)).unwrap_err();
    assert!(format!("{:#}", error).contains("proxy"));
}

#[test]
fn test_init_config_writes_loadable_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    assert!(init_config(&path, false).unwrap());
    let loaded = load_config(Some(path.to_str().unwrap())).unwrap();
    let defaults = ExplorerConfig::default();
    assert_eq!(loaded.proxies, defaults.proxies);
    assert_eq!(loaded.max_links_per_page, defaults.max_links_per_page);
}

#[test]
fn test_init_config_respects_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{}").unwrap();

    assert!(!init_config(&path, false).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

    assert!(init_config(&path, true).unwrap());
    assert_ne!(std::fs::read_to_string(&path).unwrap(), "{}");
}

#[test]
fn test_parse_repl_commands() {
    assert_eq!(parse_repl_command("toggle 3"), Ok(ReplCommand::Toggle(NodeId(3))));
    assert_eq!(parse_repl_command("t #12"), Ok(ReplCommand::Toggle(NodeId(12))));
    assert_eq!(parse_repl_command("7"), Ok(ReplCommand::Toggle(NodeId(7))));
    assert_eq!(parse_repl_command("  TREE "), Ok(ReplCommand::Tree));
    assert_eq!(parse_repl_command("collapse"), Ok(ReplCommand::Collapse));
    assert_eq!(parse_repl_command("stats"), Ok(ReplCommand::Stats));
    assert_eq!(parse_repl_command("json"), Ok(ReplCommand::Json(None)));
    assert_eq!(
        parse_repl_command("json out.json"),
        Ok(ReplCommand::Json(Some("out.json".into())))
    );
    assert_eq!(
        parse_repl_command("explore example.com"),
        Ok(ReplCommand::Explore("example.com".to_string()))
    );
    assert_eq!(parse_repl_command("clear"), Ok(ReplCommand::Clear));
    assert_eq!(parse_repl_command("?"), Ok(ReplCommand::Help));
    assert_eq!(parse_repl_command("exit"), Ok(ReplCommand::Quit));
}

#[test]
fn test_parse_repl_command_errors() {
    assert!(parse_repl_command("").is_err());
    assert!(parse_repl_command("toggle").is_err());
    assert!(parse_repl_command("toggle abc").is_err());
    assert!(parse_repl_command("tree now").is_err());
    assert!(parse_repl_command("explore").is_err());
    assert!(parse_repl_command("json a b").is_err());
    assert!(parse_repl_command("frobnicate").is_err());
}
