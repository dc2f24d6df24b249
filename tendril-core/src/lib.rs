pub mod error;
pub mod event;
pub mod report;
pub mod session;
pub mod stats;
pub mod tree;

pub use error::ExploreError;
pub use event::{EventCallback, ExploreEvent};
pub use session::{Explorer, LoadOutcome, Phase, SessionSnapshot, ToggleOutcome};
pub use stats::Stats;
pub use tree::{Children, Node, NodeId, TreeStore};
