#![forbid(unsafe_code)]
//! Core of a block document editor where adjacent attachment blocks can be dragged
//! together into groups and split apart again.
//! The crate owns the document tree, atomic position-addressed batches, the repair pass
//! and the drag/drop state. Rendering and event delivery belong to the host.

pub mod config;
pub mod doc;
pub mod drag;
pub mod drop;
pub mod editor;
pub mod error;
pub mod grouping;
pub mod ids;
pub mod node;
pub mod ops;
pub mod repair;
pub mod traits;

pub use config::GroupingPolicy;
pub use doc::{Descendants, Document, NodeEntry, ResolvedPos};
pub use drag::{DragOrigin, DragState, DragTracker, Provenance};
pub use drop::{DropOutcome, DropResolver, Fallback};
pub use editor::{Command, Editor, FollowUp};
pub use error::{Error, Result};
pub use grouping::{DropGrouping, Side, Target};
pub use ids::GroupId;
pub use node::{Attrs, Block, Group, Leaf, Node, GROUP_TYPE, LEAF_TYPE};
pub use ops::{Batch, Edit};
pub use repair::{Fix, Violation};
pub use traits::{GroupIdSource, Point, PositionResolver, RandomGroupIds, SequentialGroupIds};
