//! Batch builders for the grouping gestures. Every builder reads one snapshot and
//! returns a single batch; nothing here mutates a document.

use crate::config::GroupingPolicy;
use crate::doc::Document;
use crate::error::{Error, Result};
use crate::ids::GroupId;
use crate::node::{Group, Node};
use crate::ops::Batch;
use crate::traits::GroupIdSource;

/// Which side of the drop position the grouping target sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Target ends at the drop position; the dragged block goes after it.
    Before,
    /// Target starts at the drop position; the dragged block goes before it.
    After,
}

/// Eligible block adjacent to a drop position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub pos: usize,
    pub side: Side,
    /// Start of the group the target already belongs to.
    pub group: Option<usize>,
}

/// Result of grouping on drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropGrouping {
    pub batch: Batch,
    pub group: GroupId,
    /// False when an existing group was extended.
    pub created: bool,
    pub target: Target,
}

/// Find the eligible block right before `drop_pos`, else right after it, skipping the
/// dragged block itself.
pub fn find_target(
    doc: &Document,
    drop_pos: usize,
    dragged_pos: usize,
    policy: &GroupingPolicy,
) -> Option<Target> {
    let resolved = doc.resolve(drop_pos).ok()?;
    let group = resolved.parent_group().map(|(pos, _)| pos);
    let eligible = |(pos, node): (usize, &Node)| {
        (pos != dragged_pos && node.is_eligible(&policy.eligible_subtype)).then_some(pos)
    };

    if let Some(pos) = resolved.node_before().and_then(eligible) {
        return Some(Target {
            pos,
            side: Side::Before,
            group,
        });
    }
    resolved.node_after().and_then(eligible).map(|pos| Target {
        pos,
        side: Side::After,
        group,
    })
}

/// Group the block dragged from `dragged_pos` with its neighbour at `drop_pos`.
///
/// A top-level target is replaced by a new group holding `[target, dragged]` or
/// `[dragged, target]`. A target already inside a group gets the dragged block inserted
/// next to it instead, since groups never nest. Either way the dragged block's original
/// range is deleted in the same batch.
pub fn group_on_drop(
    doc: &Document,
    dragged_pos: usize,
    drop_pos: usize,
    policy: &GroupingPolicy,
    ids: &mut impl GroupIdSource,
) -> Result<DropGrouping> {
    let dragged = doc
        .node_at(dragged_pos)
        .filter(|node| node.is_eligible(&policy.eligible_subtype))
        .ok_or_else(|| {
            Error::InvalidOperation(format!("no groupable block at {dragged_pos}"))
        })?;
    let target =
        find_target(doc, drop_pos, dragged_pos, policy).ok_or(Error::NoGroupingTarget(drop_pos))?;

    let mut batch = Batch::new();
    let (group, created) = match target.group {
        Some(group_pos) => {
            let id = doc
                .node_at(group_pos)
                .and_then(Node::as_group)
                .map(|group| group.id.clone())
                .ok_or(Error::NotAGroup(group_pos))?;
            batch.insert(drop_pos, vec![dragged.clone()]);
            (id, false)
        }
        None => {
            let target_node = doc
                .node_at(target.pos)
                .ok_or(Error::NoGroupingTarget(drop_pos))?;
            let children = match target.side {
                Side::Before => vec![target_node.clone(), dragged.clone()],
                Side::After => vec![dragged.clone(), target_node.clone()],
            };
            let id = ids.next_id();
            batch.replace(
                target.pos,
                target.pos + target_node.size(),
                vec![Group::new(id.clone(), children).into()],
            );
            (id, true)
        }
    };
    batch.delete(dragged_pos, dragged_pos + dragged.size());

    Ok(DropGrouping {
        batch,
        group,
        created,
        target,
    })
}

/// Explicit grouping of selected blocks into one new group.
///
/// The group lands where the lowest selected block was, members keep their relative
/// order, and the remaining members are deleted highest position first. Blocks that are
/// not eligible or already sit in a group are skipped.
pub fn group_blocks(
    doc: &Document,
    positions: &[usize],
    policy: &GroupingPolicy,
    ids: &mut impl GroupIdSource,
) -> Result<(Batch, GroupId)> {
    if !policy.accepts_selection_len(positions.len()) {
        return Err(Error::InvalidSelection(format!(
            "{} positions selected, expected {} to {}",
            positions.len(),
            policy.min_selection.max(2),
            policy.max_selection
        )));
    }

    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let members: Vec<(usize, &Node)> = sorted
        .into_iter()
        .filter_map(|pos| {
            let resolved = doc.resolve(pos).ok()?;
            if resolved.depth() > 0 {
                return None;
            }
            resolved
                .node_after()
                .filter(|(_, node)| node.is_eligible(&policy.eligible_subtype))
        })
        .collect();

    let [(first_pos, first), rest @ ..] = members.as_slice() else {
        return Err(Error::InvalidSelection("no groupable blocks selected".into()));
    };
    if rest.is_empty() {
        return Err(Error::InvalidSelection(
            "fewer than two groupable blocks selected".into(),
        ));
    }

    let id = ids.next_id();
    let children = members.iter().map(|(_, node)| (*node).clone()).collect();
    let mut batch = Batch::new();
    batch.replace(
        *first_pos,
        first_pos + first.size(),
        vec![Group::new(id.clone(), children).into()],
    );
    for (pos, node) in rest.iter().rev() {
        batch.delete(*pos, pos + node.size());
    }
    Ok((batch, id))
}

/// Replace the group at `pos` with its children, in order.
pub fn ungroup(doc: &Document, pos: usize) -> Result<Batch> {
    let group = doc
        .node_at(pos)
        .and_then(Node::as_group)
        .ok_or(Error::NotAGroup(pos))?;
    let mut batch = Batch::new();
    batch.replace(pos, pos + group.content_size() + 2, group.children.clone());
    Ok(batch)
}

/// Plain move of the node starting at `from` to position `to`.
pub fn move_node(doc: &Document, from: usize, to: usize) -> Result<Batch> {
    let node = doc
        .node_at(from)
        .ok_or_else(|| Error::InvalidOperation(format!("no block starts at {from}")))?;
    let mut batch = Batch::new();
    batch
        .insert(to, vec![node.clone()])
        .delete(from, from + node.size());
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Block, Leaf};
    use crate::traits::SequentialGroupIds;

    fn chat(label: &str) -> Node {
        Leaf::new("CHATGPT", label).into()
    }

    fn other(label: &str) -> Node {
        Leaf::new("FILE", label).into()
    }

    #[test]
    fn target_prefers_the_block_before() {
        let doc = Document::new(vec![chat("A"), chat("B"), chat("D")]);
        let policy = GroupingPolicy::default();
        assert_eq!(
            find_target(&doc, 1, 2, &policy),
            Some(Target {
                pos: 0,
                side: Side::Before,
                group: None,
            })
        );
    }

    #[test]
    fn target_skips_dragged_block_and_ineligible_neighbours() {
        let doc = Document::new(vec![other("F"), chat("D"), chat("B")]);
        let policy = GroupingPolicy::default();
        // before is the dragged block itself, after is B
        assert_eq!(
            find_target(&doc, 2, 1, &policy).map(|t| (t.pos, t.side)),
            Some((2, Side::After))
        );
        // before is an ineligible subtype, after is the dragged block
        assert_eq!(find_target(&doc, 1, 1, &policy), None);
        assert_eq!(find_target(&doc, 99, 1, &policy), None);
    }

    #[test]
    fn positions_inside_text_have_no_target() {
        let doc = Document::new(vec![chat("A"), Block::paragraph("hello").into(), chat("B")]);
        assert_eq!(find_target(&doc, 3, 8, &GroupingPolicy::default()), None);
    }

    #[test]
    fn drop_after_target_creates_group_in_target_order() {
        // 0 A 1 'x' 4 D 5
        let doc = Document::new(vec![chat("A"), Block::paragraph("x").into(), chat("D")]);
        let mut ids = SequentialGroupIds::default();
        let grouping =
            group_on_drop(&doc, 4, 1, &GroupingPolicy::default(), &mut ids).unwrap();
        assert!(grouping.created);
        let next = doc.apply(&grouping.batch).unwrap();
        assert_eq!(
            next.content(),
            &[
                Group::new(GroupId::from_sequence(1), vec![chat("A"), chat("D")]).into(),
                Block::paragraph("x").into(),
            ]
        );
    }

    #[test]
    fn drop_without_neighbour_is_declined() {
        let doc = Document::new(vec![chat("A"), Block::paragraph("x").into(), chat("D")]);
        let mut ids = SequentialGroupIds::default();
        // before is the dragged block, after is the paragraph
        let err = group_on_drop(&doc, 0, 1, &GroupingPolicy::default(), &mut ids).unwrap_err();
        assert_eq!(err, Error::NoGroupingTarget(1));
        assert!(err.is_declined());
        assert_eq!(ids.last(), 0);
    }

    #[test]
    fn explicit_grouping_rejects_bad_selection_sizes() {
        let doc = Document::new(vec![chat("A"), chat("B"), chat("C"), chat("D"), chat("E")]);
        let policy = GroupingPolicy::default();
        let mut ids = SequentialGroupIds::default();
        assert!(matches!(
            group_blocks(&doc, &[0], &policy, &mut ids),
            Err(Error::InvalidSelection(_))
        ));
        assert!(matches!(
            group_blocks(&doc, &[0, 1, 2, 3, 4], &policy, &mut ids),
            Err(Error::InvalidSelection(_))
        ));
        // two positions, but only one eligible
        let mixed = Document::new(vec![chat("A"), other("F")]);
        assert!(matches!(
            group_blocks(&mixed, &[0, 1], &policy, &mut ids),
            Err(Error::InvalidSelection(_))
        ));
    }

    #[test]
    fn ungroup_requires_a_group() {
        let doc = Document::new(vec![chat("A")]);
        assert_eq!(ungroup(&doc, 0).unwrap_err(), Error::NotAGroup(0));
    }

    #[test]
    fn move_requires_a_block_start() {
        let doc = Document::new(vec![Block::paragraph("abc").into(), chat("A")]);
        let batch = move_node(&doc, 5, 0).unwrap();
        let moved = doc.apply(&batch).unwrap();
        assert_eq!(moved.content()[0], chat("A"));
        assert!(move_node(&doc, 1, 0).is_err());
    }
}
