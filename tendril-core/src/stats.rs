// Statistics derived from the exploration tree

use crate::tree::{Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_nodes: usize,
    pub expanded_nodes: usize,
    pub unique_domains: usize,
    pub discovered_urls: usize,
}

impl Stats {
    pub fn compute(root: Option<&Node>, expanded: &HashSet<NodeId>, discovered_urls: usize) -> Self {
        Self {
            total_nodes: total_nodes(root),
            expanded_nodes: expanded_nodes(root, expanded),
            unique_domains: unique_domains(root),
            discovered_urls,
        }
    }
}

pub fn total_nodes(root: Option<&Node>) -> usize {
    let mut count = 0;
    if let Some(root) = root {
        root.visit(&mut |_| count += 1);
    }
    count
}

/// Expansion-set members that are actually present in the tree.
pub fn expanded_nodes(root: Option<&Node>, expanded: &HashSet<NodeId>) -> usize {
    let mut count = 0;
    if let Some(root) = root {
        root.visit(&mut |node| {
            if expanded.contains(&node.id) {
                count += 1;
            }
        });
    }
    count
}

pub fn unique_domains(root: Option<&Node>) -> usize {
    let mut domains: HashSet<&str> = HashSet::new();
    if let Some(root) = root {
        root.visit(&mut |node| {
            if !node.domain.is_empty() {
                domains.insert(node.domain.as_str());
            }
        });
    }
    domains.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeStore;
    use tendril_scanner::{Extraction, LinkRecord};

    fn link(url: &str, domain: &str) -> LinkRecord {
        LinkRecord {
            url: url.to_string(),
            text: url.to_string(),
            is_external: domain != "example.com",
            domain: domain.to_string(),
        }
    }

    fn tree() -> TreeStore {
        let mut tree = TreeStore::new();
        let extraction = Extraction {
            title: "Root".to_string(),
            links: vec![
                link("https://example.com/a", "example.com"),
                link("https://other.org/", "other.org"),
                link("https://example.com/b", "example.com"),
            ],
            total_found: 3,
            was_truncated: false,
        };
        let root = tree.create_root("https://example.com/", &extraction);
        tree.set_root(root);
        tree
    }

    #[test]
    fn test_empty_tree() {
        let stats = Stats::compute(None, &HashSet::new(), 0);
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn test_counts() {
        let tree = tree();
        let root = tree.root().unwrap();
        let mut expanded = HashSet::new();
        expanded.insert(root.id);
        expanded.insert(NodeId(4242)); // not in the tree

        let stats = Stats::compute(Some(root), &expanded, 4);
        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.expanded_nodes, 1);
        assert_eq!(stats.unique_domains, 2);
        assert_eq!(stats.discovered_urls, 4);
    }
}
