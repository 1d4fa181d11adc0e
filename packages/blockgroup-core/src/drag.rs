use crate::config::GroupingPolicy;
use crate::doc::Document;
use crate::ids::GroupId;

/// Where the dragged block sat inside a group when the drag started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Provenance {
    pub group_pos: usize,
    pub child_index: usize,
}

/// Origin of an armed drag, valid only against the snapshot it was captured from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragOrigin {
    pub pos: usize,
    pub provenance: Option<Provenance>,
    pub version: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Armed(DragOrigin),
    /// The drop was turned into a grouping. Origin and provenance are already cleared.
    Committed(GroupId),
}

/// Per-editor drag state machine: `Idle -> Armed -> (Idle | Committed)`.
#[derive(Clone, Debug, Default)]
pub struct DragTracker {
    state: DragState,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    pub fn origin(&self) -> Option<&DragOrigin> {
        match &self.state {
            DragState::Armed(origin) => Some(origin),
            _ => None,
        }
    }

    pub fn provenance(&self) -> Option<Provenance> {
        self.origin().and_then(|origin| origin.provenance)
    }

    /// Arm on pointer-down at `pos`. Only an eligible leaf arms the tracker; anything
    /// else leaves it idle. A previous session is always discarded first.
    pub fn arm(
        &mut self,
        doc: &Document,
        pos: usize,
        policy: &GroupingPolicy,
    ) -> Option<&DragOrigin> {
        self.state = DragState::Idle;
        let resolved = doc.resolve(pos).ok()?;
        let (start, node) = resolved.node_after()?;
        if !node.is_eligible(&policy.eligible_subtype) {
            tracing::trace!(pos, kind = node.type_name(), "drag start on ineligible block");
            return None;
        }

        let provenance = resolved.parent_group().map(|(group_pos, group)| {
            let mut end = group_pos + 1;
            let mut child_index = 0;
            for child in &group.children {
                end += child.size();
                if end > start {
                    break;
                }
                child_index += 1;
            }
            Provenance {
                group_pos,
                child_index,
            }
        });

        tracing::debug!(pos = start, ?provenance, version = doc.version(), "drag armed");
        self.state = DragState::Armed(DragOrigin {
            pos: start,
            provenance,
            version: doc.version(),
        });
        self.origin()
    }

    /// Record a successful grouping drop.
    pub fn commit(&mut self, group: GroupId) {
        tracing::debug!(%group, "drag committed");
        self.state = DragState::Committed(group);
    }

    /// Back to idle, dropping origin and provenance. Safe to call in any state.
    pub fn reset(&mut self) {
        if !self.is_idle() {
            tracing::trace!("drag reset");
        }
        self.state = DragState::Idle;
    }

    /// Take the armed origin, leaving the tracker idle.
    pub(crate) fn take_origin(&mut self) -> Option<DragOrigin> {
        match std::mem::take(&mut self.state) {
            DragState::Armed(origin) => Some(origin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Block, Group, Leaf, Node};

    fn chat(label: &str) -> Node {
        Leaf::new("CHATGPT", label).into()
    }

    fn doc() -> Document {
        // 0 A 1 [ 2 B 3 C 4 D 5 ] 6 "p" 9
        Document::new(vec![
            chat("A"),
            Group::new(
                GroupId::from_sequence(1),
                vec![chat("B"), chat("C"), chat("D")],
            )
            .into(),
            Block::paragraph("p").into(),
        ])
    }

    #[test]
    fn arms_on_top_level_leaf_without_provenance() {
        let mut tracker = DragTracker::new();
        let origin = tracker
            .arm(&doc(), 0, &GroupingPolicy::default())
            .cloned()
            .unwrap();
        assert_eq!(origin.pos, 0);
        assert_eq!(origin.provenance, None);
    }

    #[test]
    fn records_group_provenance_with_child_index() {
        let mut tracker = DragTracker::new();
        tracker.arm(&doc(), 4, &GroupingPolicy::default());
        assert_eq!(
            tracker.provenance(),
            Some(Provenance {
                group_pos: 1,
                child_index: 2,
            })
        );

        tracker.arm(&doc(), 2, &GroupingPolicy::default());
        assert_eq!(tracker.provenance().unwrap().child_index, 0);
    }

    #[test]
    fn ineligible_targets_leave_tracker_idle() {
        let mut tracker = DragTracker::new();
        tracker.arm(&doc(), 0, &GroupingPolicy::default());
        assert!(!tracker.is_idle());

        // the group itself, a paragraph, an out-of-range position, another subtype
        assert!(tracker.arm(&doc(), 1, &GroupingPolicy::default()).is_none());
        assert!(tracker.is_idle());
        assert!(tracker.arm(&doc(), 6, &GroupingPolicy::default()).is_none());
        assert!(tracker.arm(&doc(), 42, &GroupingPolicy::default()).is_none());
        let claude = GroupingPolicy::default().with_subtype("CLAUDE");
        assert!(tracker.arm(&doc(), 0, &claude).is_none());
        assert!(tracker.is_idle());
    }

    #[test]
    fn commit_and_reset_clear_origin() {
        let mut tracker = DragTracker::new();
        tracker.arm(&doc(), 3, &GroupingPolicy::default());
        tracker.commit(GroupId::from_sequence(9));
        assert!(tracker.origin().is_none());
        assert_eq!(tracker.state(), &DragState::Committed(GroupId::from_sequence(9)));
        tracker.reset();
        assert!(tracker.is_idle());
        assert!(tracker.provenance().is_none());
    }
}
