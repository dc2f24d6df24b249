//! The exploration tree.
//!
//! Nodes are plain owned values; every node is reachable from the single
//! root and addressed by a [`NodeId`] that is never reused.

use serde::{Deserialize, Serialize};
use std::fmt;
use tendril_scanner::{Extraction, LinkRecord};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Load state of a node's children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "nodes", rename_all = "snake_case")]
pub enum Children {
    /// No fetch has completed for this node yet.
    Unloaded,
    /// Fetched; empty when the page had no qualifying links or failed.
    Loaded(Vec<Node>),
}

impl Children {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Children::Loaded(_))
    }

    pub fn as_slice(&self) -> &[Node] {
        match self {
            Children::Loaded(nodes) => nodes,
            Children::Unloaded => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub url: String,
    pub text: String,
    pub is_external: bool,
    pub is_root: bool,
    pub domain: String,
    pub children: Children,
    pub is_loading: bool,
    pub error: Option<String>,
    pub total_found: usize,
    pub was_truncated: bool,
}

impl Node {
    /// Visit this node and all loaded descendants, depth first.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in self.children.as_slice() {
            child.visit(f);
        }
    }

    fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.as_slice().iter().find_map(|c| c.find(id))
    }

    fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.children {
            Children::Loaded(children) => children.iter_mut().find_map(|c| c.find_mut(id)),
            Children::Unloaded => None,
        }
    }

    fn apply(&mut self, children: Vec<Node>, extraction: &Extraction) {
        self.children = Children::Loaded(children);
        self.total_found = extraction.total_found;
        self.was_truncated = extraction.was_truncated;
        self.error = None;
        self.is_loading = false;
    }
}

/// Owner of the node graph for one explorer.
#[derive(Debug, Default)]
pub struct TreeStore {
    root: Option<Node>,
    next_id: u64,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node with unloaded children and the next free id.
    ///
    /// Roots are never external.
    pub fn create_node(&mut self, url: &str, text: &str, is_external: bool, is_root: bool) -> Node {
        self.next_id += 1;
        let domain = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(String::from))
            .unwrap_or_default();

        Node {
            id: NodeId(self.next_id),
            url: url.to_string(),
            text: text.to_string(),
            is_external: is_external && !is_root,
            is_root,
            domain,
            children: Children::Unloaded,
            is_loading: false,
            error: None,
            total_found: 0,
            was_truncated: false,
        }
    }

    fn node_from_link(&mut self, link: &LinkRecord) -> Node {
        let mut node = self.create_node(&link.url, &link.text, link.is_external, false);
        node.domain = link.domain.clone();
        node
    }

    fn build_children(&mut self, extraction: &Extraction) -> Vec<Node> {
        extraction
            .links
            .iter()
            .map(|link| self.node_from_link(link))
            .collect()
    }

    /// Create a root whose children are filled in from `extraction` right away.
    pub fn create_root(&mut self, url: &str, extraction: &Extraction) -> Node {
        let mut root = self.create_node(url, &extraction.title, false, true);
        let children = self.build_children(extraction);
        root.apply(children, extraction);
        root
    }

    pub fn set_root(&mut self, root: Node) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Drop the tree. Ids keep counting up so none is ever handed out twice.
    pub fn clear(&mut self) {
        self.root = None;
    }

    pub fn find_node(&self, id: NodeId) -> Option<&Node> {
        self.root.as_ref().and_then(|r| r.find(id))
    }

    pub fn find_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.root.as_mut().and_then(|r| r.find_mut(id))
    }

    /// Mark a node as loading and hand back the URL to fetch.
    ///
    /// Returns `None` when the node is unknown, already loading or already
    /// loaded, which is what keeps a node from being fetched twice.
    pub fn begin_load(&mut self, id: NodeId) -> Option<String> {
        let node = self.find_node_mut(id)?;
        if node.is_loading || node.children.is_loaded() {
            return None;
        }
        node.is_loading = true;
        Some(node.url.clone())
    }

    /// Finish a load started with [`begin_load`](Self::begin_load).
    ///
    /// A failure leaves the node loaded-empty with `error` set. Returns
    /// `false` if the node is gone or was not loading.
    pub fn complete_load(
        &mut self,
        id: NodeId,
        outcome: std::result::Result<Extraction, String>,
    ) -> bool {
        match self.find_node(id) {
            Some(node) if node.is_loading => {}
            _ => return false,
        }

        match outcome {
            Ok(extraction) => {
                let children = self.build_children(&extraction);
                if let Some(node) = self.find_node_mut(id) {
                    node.apply(children, &extraction);
                }
            }
            Err(message) => {
                if let Some(node) = self.find_node_mut(id) {
                    node.children = Children::Loaded(Vec::new());
                    node.error = Some(message);
                    node.is_loading = false;
                }
            }
        }
        true
    }
}
