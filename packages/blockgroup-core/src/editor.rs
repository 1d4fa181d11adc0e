use std::collections::{HashSet, VecDeque};

use crate::config::GroupingPolicy;
use crate::doc::Document;
use crate::drag::DragTracker;
use crate::drop::{DropOutcome, DropResolver, Fallback};
use crate::error::{Error, Result};
use crate::grouping::{self, Target};
use crate::ids::GroupId;
use crate::node::Node;
use crate::ops::Batch;
use crate::repair;
use crate::traits::{GroupIdSource, Point, PositionResolver, SequentialGroupIds};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Work deferred to the next scheduler turn after a commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowUp {
    Repair,
}

/// Named operations the host can invoke.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "command", content = "args", rename_all = "camelCase")
)]
pub enum Command {
    GroupBlocks(Vec<usize>),
    UngroupBlock(usize),
    MoveBlock { from: usize, to: usize },
    Repair,
}

/// Single-session editor: owns the current snapshot, the drag tracker and the queue of
/// follow-ups. All host events and commands go through it.
///
/// Pending follow-ups are flushed at the start of every user-initiated entry point, so a
/// scheduled repair always lands before the next user mutation.
pub struct Editor<I = SequentialGroupIds>
where
    I: GroupIdSource,
{
    doc: Document,
    policy: GroupingPolicy,
    ids: I,
    drag: DragTracker,
    follow_ups: VecDeque<FollowUp>,
}

impl Editor<SequentialGroupIds> {
    pub fn new(doc: Document) -> Self {
        Self::with_parts(doc, GroupingPolicy::default(), SequentialGroupIds::default())
    }
}

impl<I> Editor<I>
where
    I: GroupIdSource,
{
    /// Loaded documents with duplicate group ids or nested groups are normalized first:
    /// repeated ids are re-minted and nested groups are flattened into their parent.
    pub fn with_parts(doc: Document, policy: GroupingPolicy, mut ids: I) -> Self {
        for id in doc.group_ids() {
            ids.observe(id);
        }
        let doc = normalize_loaded(doc, &mut ids);
        Self {
            doc,
            policy,
            ids,
            drag: DragTracker::new(),
            follow_ups: VecDeque::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn policy(&self) -> &GroupingPolicy {
        &self.policy
    }

    pub fn drag(&self) -> &DragTracker {
        &self.drag
    }

    pub fn pending_follow_ups(&self) -> usize {
        self.follow_ups.len()
    }

    /// Run everything scheduled for after the last commit. Returns how many ran.
    pub fn run_follow_ups(&mut self) -> usize {
        let mut ran = 0;
        while let Some(follow_up) = self.follow_ups.pop_front() {
            match follow_up {
                FollowUp::Repair => {
                    if let Err(err) = self.repair() {
                        tracing::warn!(%err, "deferred repair failed");
                    }
                }
            }
            ran += 1;
        }
        ran
    }

    /// Run the repair pass now. Returns whether anything changed.
    pub fn repair(&mut self) -> Result<bool> {
        match repair::repair(&self.doc)? {
            Some(repaired) => {
                self.doc = repaired;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn group_blocks(&mut self, positions: &[usize]) -> Result<GroupId> {
        self.run_follow_ups();
        let (batch, id) =
            grouping::group_blocks(&self.doc, positions, &self.policy, &mut self.ids)?;
        self.commit(&batch)?;
        self.repair()?;
        tracing::debug!(group = %id, members = positions.len(), "grouped selection");
        Ok(id)
    }

    pub fn ungroup_block(&mut self, pos: usize) -> Result<()> {
        self.run_follow_ups();
        let batch = grouping::ungroup(&self.doc, pos)?;
        self.commit(&batch)?;
        self.repair()?;
        Ok(())
    }

    /// Generic move, used for the host's default drop behavior.
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<()> {
        self.run_follow_ups();
        let batch = grouping::move_node(&self.doc, from, to)?;
        self.commit(&batch)?;
        self.repair()?;
        Ok(())
    }

    /// Command surface: true when the command changed the document or ran cleanly.
    pub fn execute(&mut self, command: Command) -> bool {
        let result = match command {
            Command::GroupBlocks(positions) => self.group_blocks(&positions).map(|_| ()),
            Command::UngroupBlock(pos) => self.ungroup_block(pos),
            Command::MoveBlock { from, to } => self.move_block(from, to),
            Command::Repair => {
                self.run_follow_ups();
                self.repair().map(|_| ())
            }
        };
        match result {
            Ok(()) => true,
            Err(err) if err.is_declined() => {
                tracing::debug!(%err, "command declined");
                false
            }
            Err(err) => {
                tracing::warn!(%err, "command failed");
                false
            }
        }
    }

    /// Pointer-down on the block at `pos`. Returns whether a drag session was armed.
    pub fn drag_start(&mut self, pos: usize) -> bool {
        self.run_follow_ups();
        self.drag.arm(&self.doc, pos, &self.policy).is_some()
    }

    /// Live feedback while hovering. Never mutates anything.
    pub fn drag_over(&self, resolver: &impl PositionResolver, point: Point) -> Option<Target> {
        self.drag_over_at(resolver.pos_at_coords(&self.doc, point))
    }

    pub fn drag_over_at(&self, drop_pos: Option<usize>) -> Option<Target> {
        let origin = self.drag.origin()?;
        let target = DropResolver::new(&self.policy).highlight(&self.doc, origin, drop_pos?);
        tracing::trace!(?drop_pos, ?target, "drag over");
        target
    }

    pub fn drop(&mut self, resolver: &impl PositionResolver, point: Point) -> DropOutcome {
        let drop_pos = resolver.pos_at_coords(&self.doc, point);
        self.drop_at(drop_pos)
    }

    /// Drop at an already resolved position. The tracker leaves `Armed` on every path.
    pub fn drop_at(&mut self, drop_pos: Option<usize>) -> DropOutcome {
        self.run_follow_ups();
        let Some(origin) = self.drag.take_origin() else {
            return DropOutcome::Fallback(Fallback::NoSession);
        };
        if origin.provenance.is_some() {
            // The source group may be left with one child by this drop or by the host's
            // default move.
            self.follow_ups.push_back(FollowUp::Repair);
        }
        let Some(drop_pos) = drop_pos else {
            tracing::trace!("drop outside the document");
            return DropOutcome::Fallback(Fallback::Unresolved);
        };

        let resolved = DropResolver::new(&self.policy).resolve(
            &self.doc,
            &origin,
            drop_pos,
            &mut self.ids,
        );
        match resolved.and_then(|grouping| self.commit(&grouping.batch).map(|()| grouping)) {
            Ok(grouping) => {
                tracing::debug!(
                    group = %grouping.group,
                    created = grouping.created,
                    from = origin.pos,
                    to = drop_pos,
                    "grouped on drop"
                );
                self.drag.commit(grouping.group.clone());
                DropOutcome::Grouped {
                    group: grouping.group,
                    created: grouping.created,
                }
            }
            Err(Error::NoGroupingTarget(_)) => DropOutcome::Fallback(Fallback::NoGroupingTarget),
            Err(Error::StaleSession { armed, current }) => {
                tracing::debug!(armed, current, "stale drag session");
                DropOutcome::Fallback(Fallback::Stale)
            }
            Err(err) => {
                tracing::warn!(%err, "grouping drop failed");
                DropOutcome::Fallback(Fallback::Failed(err))
            }
        }
    }

    /// End of the drag gesture, with or without a drop. Runs deferred work, which by
    /// now comes after any default move the host performed for the drop.
    pub fn drag_end(&mut self) {
        self.drag.reset();
        self.run_follow_ups();
    }

    fn commit(&mut self, batch: &Batch) -> Result<()> {
        self.doc = self.doc.apply(batch)?;
        Ok(())
    }
}

fn normalize_loaded(doc: Document, ids: &mut impl GroupIdSource) -> Document {
    match doc.validate_structure() {
        Ok(()) => return doc,
        Err(err) => tracing::warn!(%err, "normalizing loaded document"),
    }
    let mut seen = HashSet::new();
    let content = doc
        .content()
        .iter()
        .cloned()
        .map(|node| match node {
            Node::Group(mut group) => {
                if group.children.iter().any(Node::is_group) {
                    let mut flat = Vec::new();
                    flatten_into(std::mem::take(&mut group.children), &mut flat);
                    group.children = flat;
                }
                if !seen.insert(group.id.clone()) {
                    group.id = ids.next_id();
                    seen.insert(group.id.clone());
                }
                Node::Group(group)
            }
            other => other,
        })
        .collect();
    Document::with_version(content, doc.version())
}

fn flatten_into(nodes: Vec<Node>, out: &mut Vec<Node>) {
    for node in nodes {
        match node {
            Node::Group(group) => flatten_into(group.children, out),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::DragState;
    use crate::node::{Group, Leaf, Node};

    fn chat(label: &str) -> Node {
        Leaf::new("CHATGPT", label).into()
    }

    #[test]
    fn editor_observes_existing_group_ids() {
        let doc = Document::new(vec![
            Group::new(GroupId::from_sequence(7), vec![chat("A"), chat("B")]).into(),
            chat("C"),
            chat("D"),
        ]);
        let mut editor = Editor::new(doc);
        let id = editor.group_blocks(&[4, 5]).unwrap();
        assert_eq!(id, GroupId::from_sequence(8));
    }

    #[test]
    fn duplicate_ids_are_reminted_on_load() {
        let doc = Document::new(vec![
            Group::new(GroupId::from_sequence(1), vec![chat("A"), chat("B")]).into(),
            Group::new(GroupId::from_sequence(1), vec![chat("C"), chat("D")]).into(),
            chat("E"),
            chat("F"),
        ]);
        let mut editor = Editor::new(doc);
        let ids: Vec<&GroupId> = editor.document().group_ids();
        assert_eq!(ids, vec![&GroupId::from_sequence(1), &GroupId::from_sequence(2)]);

        let id = editor.group_blocks(&[8, 9]).unwrap();
        assert_eq!(id, GroupId::from_sequence(3));
        editor.move_block(8, 0).unwrap();
        editor.document().validate_invariants().unwrap();
    }

    #[test]
    fn nested_groups_are_flattened_on_load() {
        let inner = Group::new(GroupId::from_sequence(2), vec![chat("B"), chat("C")]);
        let doc = Document::new(vec![
            Group::new(GroupId::from_sequence(1), vec![chat("A"), inner.into()]).into(),
            chat("D"),
        ]);
        let editor = Editor::new(doc);
        let loaded = editor.into_document();
        assert_eq!(
            loaded.content(),
            &[
                Group::new(
                    GroupId::from_sequence(1),
                    vec![chat("A"), chat("B"), chat("C")]
                )
                .into(),
                chat("D"),
            ]
        );
        assert_eq!(loaded.version(), 0);
    }

    #[test]
    fn exhausted_sequence_ids_still_group() {
        let doc = Document::new(vec![
            Group::new(GroupId::new("group-18446744073709551615"), vec![chat("A"), chat("B")])
                .into(),
            chat("C"),
            chat("D"),
        ]);
        let mut editor = Editor::new(doc);
        let id = editor.group_blocks(&[4, 5]).unwrap();
        assert!(id.sequence().is_none());
        assert_eq!(editor.document().group_ids().len(), 2);
    }

    #[test]
    fn drop_without_session_falls_back() {
        let mut editor = Editor::new(Document::new(vec![chat("A"), chat("B")]));
        assert_eq!(
            editor.drop_at(Some(1)),
            DropOutcome::Fallback(Fallback::NoSession)
        );
        assert_eq!(editor.document().version(), 0);
    }

    #[test]
    fn unresolved_drop_clears_session() {
        let mut editor = Editor::new(Document::new(vec![chat("A"), chat("B")]));
        assert!(editor.drag_start(1));
        let outcome = editor.drop(
            &|_: &Document, _: Point| -> Option<usize> { None },
            Point::new(-5.0, -5.0),
        );
        assert_eq!(outcome, DropOutcome::Fallback(Fallback::Unresolved));
        assert_eq!(editor.drag().state(), &DragState::Idle);
        assert_eq!(editor.document().version(), 0);
    }

    #[test]
    fn execute_reports_success_as_bool() {
        let mut editor = Editor::new(Document::new(vec![chat("A"), chat("B")]));
        assert!(!editor.execute(Command::GroupBlocks(vec![0])));
        assert!(editor.execute(Command::GroupBlocks(vec![0, 1])));
        assert!(editor.execute(Command::UngroupBlock(0)));
        assert!(!editor.execute(Command::UngroupBlock(0)));
        assert!(editor.execute(Command::Repair));
        assert_eq!(editor.document().content(), &[chat("A"), chat("B")]);
    }
}
