// Tree rendering and JSON export of an exploration session

use crate::session::SessionSnapshot;
use crate::stats::Stats;
use crate::tree::Node;
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "tree" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// One-character state marker shown in front of every node.
pub fn node_marker(node: &Node, expanded: bool) -> &'static str {
    if node.is_loading {
        "[~]"
    } else if node.error.is_some() {
        "[!]"
    } else if node.children.is_loaded() && node.children.is_empty() {
        "[ ]"
    } else if expanded && node.children.is_loaded() {
        "[-]"
    } else {
        "[+]"
    }
}

fn paint(text: &str, color: bool, style: impl Fn(&str) -> ColoredString) -> String {
    if color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

fn node_line(node: &Node, snapshot: &SessionSnapshot, color: bool) -> String {
    let expanded = snapshot.is_expanded(node.id);
    let marker = node_marker(node, expanded);
    let marker = match marker {
        "[!]" => paint(marker, color, |s| s.red().bold()),
        "[~]" => paint(marker, color, |s| s.yellow()),
        "[-]" => paint(marker, color, |s| s.green()),
        _ => paint(marker, color, |s| s.normal()),
    };

    let mut line = format!(
        "{} {} {}",
        marker,
        paint(&format!("#{}", node.id), color, |s| s.dimmed()),
        if node.is_root {
            paint(&node.text, color, |s| s.bold())
        } else {
            node.text.clone()
        }
    );

    if node.is_external {
        line.push_str(&paint(&format!(" ({})", node.domain), color, |s| s.cyan()));
    }
    if let Some(ref error) = node.error {
        line.push_str(&paint(&format!(" ! {}", error), color, |s| s.red()));
    }
    line
}

fn render_children(
    node: &Node,
    snapshot: &SessionSnapshot,
    prefix: &str,
    color: bool,
    out: &mut String,
) {
    if !snapshot.is_expanded(node.id) {
        return;
    }
    let children = node.children.as_slice();

    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1 && !node.was_truncated;
        let connector = if is_last { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(&node_line(child, snapshot, color));
        out.push('\n');

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        render_children(child, snapshot, &child_prefix, color, out);
    }

    if node.was_truncated && !children.is_empty() {
        let note = format!("… showing {} of {} links", children.len(), node.total_found);
        out.push_str(prefix);
        out.push_str("└── ");
        out.push_str(&paint(&note, color, |s| s.dimmed()));
        out.push('\n');
    }
}

/// Render the visible part of the tree: expanded nodes show their children.
pub fn render_tree(snapshot: &SessionSnapshot, color: bool) -> String {
    let Some(ref root) = snapshot.root else {
        return String::from("(no exploration)\n");
    };

    let mut out = String::new();
    out.push_str(&node_line(root, snapshot, color));
    out.push('\n');
    out.push_str(&paint(&root.url, color, |s| s.dimmed()));
    out.push('\n');
    render_children(root, snapshot, "", color, &mut out);
    out
}

pub fn render_stats(stats: &Stats) -> String {
    format!(
        "{} nodes · {} expanded · {} domains · {} URLs discovered",
        stats.total_nodes, stats.expanded_nodes, stats.unique_domains, stats.discovered_urls
    )
}

pub fn generate_text_report(snapshot: &SessionSnapshot, color: bool) -> String {
    let mut report = render_tree(snapshot, color);
    report.push('\n');
    report.push_str(&render_stats(&snapshot.stats));
    report.push('\n');
    report
}

pub fn generate_json_report(snapshot: &SessionSnapshot) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "metadata": {
            "generator": "Tendril",
            "version": env!("CARGO_PKG_VERSION"),
            "generated_at": chrono::Utc::now().to_rfc3339(),
        },
        "session": {
            "seed": snapshot.seed,
            "phase": snapshot.phase,
            "preferred_proxy": snapshot.preferred_proxy,
            "expanded": snapshot.expanded,
        },
        "stats": snapshot.stats,
        "tree": snapshot.root,
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
