use crate::stats::Stats;
use crate::tree::NodeId;
use serde::Serialize;
use std::sync::Arc;

/// State transitions reported to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ExploreEvent {
    Exploring {
        url: String,
    },
    Ready {
        root_id: NodeId,
        links: usize,
        stats: Stats,
    },
    Failed {
        url: String,
        reason: String,
    },
    NodeLoading {
        id: NodeId,
        url: String,
    },
    NodeLoaded {
        id: NodeId,
        children: usize,
        total_found: usize,
        was_truncated: bool,
        stats: Stats,
    },
    NodeError {
        id: NodeId,
        message: String,
    },
    Cleared,
}

impl ExploreEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ExploreEvent::Exploring { .. } => "exploring",
            ExploreEvent::Ready { .. } => "ready",
            ExploreEvent::Failed { .. } => "failed",
            ExploreEvent::NodeLoading { .. } => "node-loading",
            ExploreEvent::NodeLoaded { .. } => "node-loaded",
            ExploreEvent::NodeError { .. } => "node-error",
            ExploreEvent::Cleared => "cleared",
        }
    }
}

/// Callback invoked for every event, in order.
pub type EventCallback = Arc<dyn Fn(&ExploreEvent) + Send + Sync>;
