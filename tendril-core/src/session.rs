//! Session control: one exploration at a time, expanded a node at a time.
//!
//! All session state sits behind a single async mutex that is never held
//! across a fetch. Every reset bumps a generation counter; a fetch that
//! completes under an older generation is dropped instead of applied,
//! including the proxy it succeeded through.

use crate::error::{ExploreError, Result};
use crate::event::{EventCallback, ExploreEvent};
use crate::stats::Stats;
use crate::tree::{Node, NodeId, TreeStore};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tendril_scanner::normalize::normalize_url;
use tendril_scanner::{Extraction, ExplorerConfig, LinkExtractor, ProxyFetcher, ScanError};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// What a call to [`Explorer::load_children`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded {
        children: usize,
        total_found: usize,
        was_truncated: bool,
    },
    /// The fetch failed; the error is recorded on the node.
    Failed(String),
    /// Already loading or loaded, or no such node. Nothing was fetched.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    NotFound,
    Collapsed,
    /// Expanded using children that were already loaded (or are loading).
    Expanded,
    /// Expanded and fetched the children.
    Loaded(LoadOutcome),
}

/// Read-only copy of the session for renderers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub seed: Option<String>,
    pub root: Option<Node>,
    pub expanded: BTreeSet<NodeId>,
    pub stats: Stats,
    pub preferred_proxy: usize,
}

impl SessionSnapshot {
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }
}

#[derive(Default)]
struct SessionState {
    phase: Phase,
    seed: Option<String>,
    tree: TreeStore,
    expanded: HashSet<NodeId>,
    discovered: HashSet<String>,
    /// Proxy index every fetch of this session starts from.
    preferred_proxy: usize,
    generation: u64,
}

impl SessionState {
    fn reset(&mut self, phase: Phase, seed: Option<String>) {
        self.generation += 1;
        self.phase = phase;
        self.seed = seed;
        self.tree.clear();
        self.expanded.clear();
        self.discovered.clear();
        self.preferred_proxy = 0;
    }

    fn stats(&self) -> Stats {
        Stats::compute(self.tree.root(), &self.expanded, self.discovered.len())
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase.clone(),
            seed: self.seed.clone(),
            root: self.tree.root().cloned(),
            expanded: self.expanded.iter().copied().collect(),
            stats: self.stats(),
            preferred_proxy: self.preferred_proxy,
        }
    }
}

pub struct Explorer {
    fetcher: ProxyFetcher,
    extractor: LinkExtractor,
    state: Mutex<SessionState>,
    callbacks: Vec<EventCallback>,
}

impl Explorer {
    pub fn new(config: &ExplorerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fetcher: ProxyFetcher::from_config(config)?,
            extractor: LinkExtractor::new(config)?,
            state: Mutex::new(SessionState::default()),
            callbacks: Vec::new(),
        })
    }

    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.callbacks.push(callback);
        self
    }

    pub fn fetcher(&self) -> &ProxyFetcher {
        &self.fetcher
    }

    fn emit(&self, event: ExploreEvent) {
        debug!("Event: {}", event.name());
        for callback in &self.callbacks {
            callback(&event);
        }
    }

    /// Returns the extraction and the index of the proxy that served it.
    async fn fetch_and_extract(
        &self,
        url: &str,
        start_proxy: usize,
    ) -> std::result::Result<(Extraction, usize), ScanError> {
        let source = Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
        let page = self.fetcher.fetch_from(url, start_proxy).await?;
        Ok((self.extractor.extract(&page.html, &source), page.proxy_index))
    }

    /// Start a fresh exploration from `raw_url`.
    ///
    /// An invalid URL is rejected before anything is reset. Otherwise the
    /// previous session is discarded, the seed is fetched and the root is
    /// created with its children already loaded and expanded.
    pub async fn explore(&self, raw_url: &str) -> Result<SessionSnapshot> {
        let Some(seed) = normalize_url(raw_url, None) else {
            warn!("Rejected invalid seed URL {:?}", raw_url);
            return Err(ExploreError::InvalidUrl(raw_url.trim().to_string()));
        };
        let seed = seed.to_string();

        let (generation, start_proxy) = {
            let mut state = self.state.lock().await;
            state.reset(Phase::Loading, Some(seed.clone()));
            self.emit(ExploreEvent::Exploring { url: seed.clone() });
            (state.generation, state.preferred_proxy)
        };

        info!("Exploring {}", seed);
        let result = self.fetch_and_extract(&seed, start_proxy).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("Discarding root result for {}: session changed", seed);
            return Err(ExploreError::Superseded);
        }

        match result {
            Ok((extraction, proxy_index)) => {
                state.preferred_proxy = proxy_index;
                let root = state.tree.create_root(&seed, &extraction);
                let root_id = root.id;
                state.discovered.insert(seed.clone());
                state
                    .discovered
                    .extend(extraction.links.iter().map(|l| l.url.clone()));
                state.tree.set_root(root);
                state.expanded.insert(root_id);
                state.phase = Phase::Ready;

                let snapshot = state.snapshot();
                info!(
                    "Root {} ready: {} internal, {} external ({} found)",
                    seed,
                    extraction.internal_count(),
                    extraction.external_count(),
                    extraction.total_found
                );
                self.emit(ExploreEvent::Ready {
                    root_id,
                    links: extraction.links.len(),
                    stats: snapshot.stats,
                });
                Ok(snapshot)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("Exploration of {} failed: {}", seed, reason);
                state.phase = Phase::Error(reason.clone());
                self.emit(ExploreEvent::Failed {
                    url: seed,
                    reason,
                });
                Err(e.into())
            }
        }
    }

    /// Fetch and attach the children of `id` unless that already happened
    /// or is in progress.
    ///
    /// A failed fetch is recorded on the node and reported as
    /// [`LoadOutcome::Failed`]; only a stale result is an `Err`.
    pub async fn load_children(&self, id: NodeId) -> Result<LoadOutcome> {
        let (url, generation, start_proxy) = {
            let mut state = self.state.lock().await;
            let Some(url) = state.tree.begin_load(id) else {
                debug!("Node {} already loading or loaded", id);
                return Ok(LoadOutcome::Skipped);
            };
            self.emit(ExploreEvent::NodeLoading {
                id,
                url: url.clone(),
            });
            (url, state.generation, state.preferred_proxy)
        };

        let result = self.fetch_and_extract(&url, start_proxy).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("Discarding stale result for node {} ({})", id, url);
            return Err(ExploreError::Superseded);
        }

        match result {
            Ok((extraction, proxy_index)) => {
                state.preferred_proxy = proxy_index;
                let children = extraction.links.len();
                let total_found = extraction.total_found;
                let was_truncated = extraction.was_truncated;
                let urls: Vec<String> = extraction.links.iter().map(|l| l.url.clone()).collect();
                state.tree.complete_load(id, Ok(extraction));
                state.discovered.extend(urls);

                info!("Node {} loaded {} of {} links", id, children, total_found);
                self.emit(ExploreEvent::NodeLoaded {
                    id,
                    children,
                    total_found,
                    was_truncated,
                    stats: state.stats(),
                });
                Ok(LoadOutcome::Loaded {
                    children,
                    total_found,
                    was_truncated,
                })
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Node {} ({}) failed: {}", id, url, message);
                state.tree.complete_load(id, Err(message.clone()));
                self.emit(ExploreEvent::NodeError {
                    id,
                    message: message.clone(),
                });
                Ok(LoadOutcome::Failed(message))
            }
        }
    }

    /// Collapse an expanded node, or expand a collapsed one, loading its
    /// children on first expansion.
    pub async fn toggle(&self, id: NodeId) -> Result<ToggleOutcome> {
        {
            let mut state = self.state.lock().await;
            let Some(node) = state.tree.find_node(id) else {
                return Ok(ToggleOutcome::NotFound);
            };
            let needs_load = !node.children.is_loaded() && !node.is_loading;

            if state.expanded.remove(&id) {
                debug!("Collapsed node {}", id);
                return Ok(ToggleOutcome::Collapsed);
            }
            state.expanded.insert(id);
            if !needs_load {
                debug!("Expanded node {} from cache", id);
                return Ok(ToggleOutcome::Expanded);
            }
        }

        let outcome = self.load_children(id).await?;
        Ok(ToggleOutcome::Loaded(outcome))
    }

    /// Collapse everything except the root. Returns `false` without a tree.
    pub async fn collapse_all(&self) -> bool {
        let mut state = self.state.lock().await;
        let Some(root_id) = state.tree.root().map(|r| r.id) else {
            return false;
        };
        state.expanded.clear();
        state.expanded.insert(root_id);
        true
    }

    /// Discard the tree and return to idle. Pending loads will be ignored.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.reset(Phase::Idle, None);
        info!("Session cleared");
        self.emit(ExploreEvent::Cleared);
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn stats(&self) -> Stats {
        self.state.lock().await.stats()
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase.clone()
    }

    pub async fn find_node(&self, id: NodeId) -> Option<Node> {
        self.state.lock().await.tree.find_node(id).cloned()
    }

    pub async fn is_expanded(&self, id: NodeId) -> bool {
        self.state.lock().await.expanded.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explorer() -> Explorer {
        Explorer::new(&ExplorerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let explorer = explorer();
        let snapshot = explorer.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(snapshot.root.is_none());
        assert_eq!(snapshot.stats, Stats::default());
    }

    #[tokio::test]
    async fn test_invalid_url_leaves_state_alone() {
        let explorer = explorer();
        let result = explorer.explore("not a url").await;
        assert!(matches!(result, Err(ExploreError::InvalidUrl(_))));
        let result = explorer.explore("ftp://example.com/").await;
        assert!(matches!(result, Err(ExploreError::InvalidUrl(_))));
        assert_eq!(explorer.phase().await, Phase::Idle);
    }

    #[tokio::test]
    async fn test_toggle_and_collapse_without_tree() {
        let explorer = explorer();
        assert_eq!(explorer.toggle(NodeId(1)).await.unwrap(), ToggleOutcome::NotFound);
        assert!(!explorer.collapse_all().await);
        assert_eq!(
            explorer.load_children(NodeId(1)).await.unwrap(),
            LoadOutcome::Skipped
        );
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let config = ExplorerConfig::default().with_proxies(vec![]);
        assert!(matches!(
            Explorer::new(&config),
            Err(ExploreError::Fetch(ScanError::Config(_)))
        ));
    }
}
