use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::ids::GroupId;
use crate::node::{Group, Node};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable snapshot of the document.
///
/// Positions are never stored on nodes; they are derived from the tree shape of one
/// snapshot and must be re-resolved after every applied batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Document {
    content: Vec<Node>,
    #[cfg_attr(feature = "serde", serde(default))]
    version: u64,
}

/// A node visited by [`Document::descendants`].
#[derive(Clone, Copy, Debug)]
pub struct NodeEntry<'a> {
    pub pos: usize,
    pub node: &'a Node,
    /// 0 for top-level nodes.
    pub depth: usize,
    /// Start position of the containing group, if any.
    pub parent: Option<usize>,
    /// Index among the siblings.
    pub index: usize,
}

impl NodeEntry<'_> {
    pub fn end(&self) -> usize {
        self.pos + self.node.size()
    }
}

/// Depth-first, pre-order traversal over one snapshot.
pub struct Descendants<'a> {
    stack: Vec<Level<'a>>,
}

struct Level<'a> {
    nodes: &'a [Node],
    index: usize,
    offset: usize,
    parent: Option<usize>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let depth = self.stack.len().checked_sub(1)?;
            let level = self.stack.last_mut()?;
            let nodes: &'a [Node] = level.nodes;
            let Some(node) = nodes.get(level.index) else {
                self.stack.pop();
                continue;
            };
            let entry = NodeEntry {
                pos: level.offset,
                node,
                depth,
                parent: level.parent,
                index: level.index,
            };
            level.index += 1;
            level.offset += node.size();
            if let Node::Group(group) = node {
                self.stack.push(Level {
                    nodes: &group.children,
                    index: 0,
                    offset: entry.pos + 1,
                    parent: Some(entry.pos),
                });
            }
            return Some(entry);
        }
    }
}

/// A position resolved against one snapshot.
#[derive(Clone, Debug)]
pub struct ResolvedPos<'a> {
    pos: usize,
    path: Vec<usize>,
    parent: Option<(usize, &'a Group)>,
    siblings: &'a [Node],
    index: usize,
    within: Option<usize>,
}

impl<'a> ResolvedPos<'a> {
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Number of enclosing groups.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Child indices of the enclosing groups, outermost first.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Index of the node after the position within its container. When the position
    /// falls inside a textblock this is the index of that block.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn siblings(&self) -> &'a [Node] {
        self.siblings
    }

    /// Innermost group containing the position, with the group's start position.
    pub fn parent_group(&self) -> Option<(usize, &'a Group)> {
        self.parent
    }

    /// True when the position sits between two nodes rather than inside a textblock.
    pub fn is_boundary(&self) -> bool {
        self.within.is_none()
    }

    /// Start of the textblock the position falls inside.
    pub fn within(&self) -> Option<usize> {
        self.within
    }

    /// Node ending exactly at this position, with its start.
    pub fn node_before(&self) -> Option<(usize, &'a Node)> {
        if self.within.is_some() || self.index == 0 {
            return None;
        }
        let node = &self.siblings[self.index - 1];
        Some((self.pos - node.size(), node))
    }

    /// Node starting exactly at this position.
    pub fn node_after(&self) -> Option<(usize, &'a Node)> {
        if self.within.is_some() {
            return None;
        }
        self.siblings.get(self.index).map(|node| (self.pos, node))
    }
}

enum Step<'a> {
    Found { index: usize, within: Option<usize> },
    Descend { index: usize, start: usize, group: &'a Group },
}

fn locate(siblings: &[Node], offset: usize, pos: usize) -> Step<'_> {
    let mut start = offset;
    for (index, node) in siblings.iter().enumerate() {
        if pos == start {
            return Step::Found {
                index,
                within: None,
            };
        }
        let end = start + node.size();
        if pos < end {
            return match node {
                Node::Group(group) => Step::Descend {
                    index,
                    start,
                    group,
                },
                _ => Step::Found {
                    index,
                    within: Some(start),
                },
            };
        }
        start = end;
    }
    Step::Found {
        index: siblings.len(),
        within: None,
    }
}

impl Document {
    pub fn new(content: Vec<Node>) -> Self {
        Self {
            content,
            version: 0,
        }
    }

    pub(crate) fn with_version(content: Vec<Node>, version: u64) -> Self {
        Self { content, version }
    }

    /// Top-level nodes.
    pub fn content(&self) -> &[Node] {
        &self.content
    }

    /// Incremented by every applied batch.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn size(&self) -> usize {
        self.content.iter().map(Node::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![Level {
                nodes: &self.content,
                index: 0,
                offset: 0,
                parent: None,
            }],
        }
    }

    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos<'_>> {
        let size = self.size();
        if pos > size {
            return Err(Error::PositionOutOfRange { pos, size });
        }

        let mut path = Vec::new();
        let mut parent = None;
        let mut siblings: &[Node] = &self.content;
        let mut offset = 0;
        loop {
            match locate(siblings, offset, pos) {
                Step::Found { index, within } => {
                    return Ok(ResolvedPos {
                        pos,
                        path,
                        parent,
                        siblings,
                        index,
                        within,
                    });
                }
                Step::Descend {
                    index,
                    start,
                    group,
                } => {
                    path.push(index);
                    parent = Some((start, group));
                    siblings = &group.children;
                    offset = start + 1;
                }
            }
        }
    }

    /// Node starting at `pos`, at the deepest level where `pos` is a boundary.
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        self.resolve(pos).ok()?.node_after().map(|(_, node)| node)
    }

    pub fn group_ids(&self) -> Vec<&GroupId> {
        self.descendants()
            .filter_map(|entry| entry.node.as_group().map(|group| &group.id))
            .collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.descendants()
            .filter(|entry| matches!(entry.node, Node::Leaf(_)))
            .count()
    }

    /// Steady-state invariants: groups hold at least two children, never nest, and have
    /// unique ids. Intended for tests and debugging.
    pub fn validate_invariants(&self) -> Result<()> {
        self.validate_structure()?;
        for entry in self.descendants() {
            if let Node::Group(group) = entry.node {
                if group.child_count() < 2 {
                    return Err(Error::InvalidOperation(format!(
                        "group {} at {} has {} children",
                        group.id,
                        entry.pos,
                        group.child_count()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Invariants that must hold after every batch, including transient states.
    pub(crate) fn validate_structure(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in self.descendants() {
            if let Node::Group(group) = entry.node {
                if entry.depth > 0 {
                    return Err(Error::InvalidOperation(format!(
                        "group {} at {} is nested inside another group",
                        group.id, entry.pos
                    )));
                }
                if !seen.insert(&group.id) {
                    return Err(Error::InvalidOperation(format!(
                        "duplicate group id {}",
                        group.id
                    )));
                }
            }
        }
        Ok(())
    }
}

impl From<Vec<Node>> for Document {
    fn from(content: Vec<Node>) -> Self {
        Self::new(content)
    }
}
