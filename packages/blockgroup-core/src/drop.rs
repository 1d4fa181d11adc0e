use crate::config::GroupingPolicy;
use crate::doc::Document;
use crate::drag::DragOrigin;
use crate::error::{Error, Result};
use crate::grouping::{find_target, group_on_drop, DropGrouping, Target};
use crate::ids::GroupId;
use crate::traits::GroupIdSource;

/// Why a drop was left to the host's default move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// No armed drag: the dragged block was not groupable, or the drag already ended.
    NoSession,
    /// Pointer coordinates did not map inside the document.
    Unresolved,
    NoGroupingTarget,
    /// The document changed after the drag started.
    Stale,
    Failed(Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    Grouped { group: GroupId, created: bool },
    Fallback(Fallback),
}

impl DropOutcome {
    /// Whether the drop was consumed. When false the host performs its default move.
    pub fn handled(&self) -> bool {
        matches!(self, DropOutcome::Grouped { .. })
    }
}

/// Read-only classification of drops against one snapshot.
pub struct DropResolver<'p> {
    policy: &'p GroupingPolicy,
}

impl<'p> DropResolver<'p> {
    pub fn new(policy: &'p GroupingPolicy) -> Self {
        Self { policy }
    }

    /// Block to highlight while hovering `drop_pos`, if dropping there would group.
    pub fn highlight(
        &self,
        doc: &Document,
        origin: &DragOrigin,
        drop_pos: usize,
    ) -> Option<Target> {
        if origin.version != doc.version() {
            return None;
        }
        let dragged = doc.node_at(origin.pos)?;
        if !dragged.is_eligible(&self.policy.eligible_subtype) {
            return None;
        }
        find_target(doc, drop_pos, origin.pos, self.policy)
    }

    /// Build the grouping batch for a drop at `drop_pos`.
    pub fn resolve(
        &self,
        doc: &Document,
        origin: &DragOrigin,
        drop_pos: usize,
        ids: &mut impl GroupIdSource,
    ) -> Result<DropGrouping> {
        if origin.version != doc.version() {
            return Err(Error::StaleSession {
                armed: origin.version,
                current: doc.version(),
            });
        }
        group_on_drop(doc, origin.pos, drop_pos, self.policy, ids)
    }
}
