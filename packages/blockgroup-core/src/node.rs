use std::collections::BTreeMap;

use crate::ids::GroupId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const LEAF_TYPE: &str = "attachmentBlock";
pub const GROUP_TYPE: &str = "attachmentGroup";

/// Attribute key/value pairs carried by every node.
pub type Attrs = BTreeMap<String, String>;

/// A block-level node of the document.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Node {
    #[cfg_attr(feature = "serde", serde(rename = "attachmentBlock"))]
    Leaf(Leaf),
    #[cfg_attr(feature = "serde", serde(rename = "attachmentGroup"))]
    Group(Group),
    #[cfg_attr(feature = "serde", serde(rename = "block"))]
    Other(Block),
}

/// Atomic attachment block. `subtype` names the tool that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Leaf {
    pub subtype: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attrs: Attrs,
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: String,
}

/// Ordered container of leaves and other blocks.
///
/// A group with fewer than two children only exists between a mutation and the next
/// repair pass. Groups never contain groups.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Group {
    pub id: GroupId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attrs: Attrs,
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<Node>,
}

/// Any other block-level content, e.g. a paragraph. Its text is addressable but opaque.
///
/// In JSON every such block carries the tag `"type": "block"`; its own type name, as
/// returned by [`Node::type_name`], travels in `name`, e.g.
/// `{"type": "block", "name": "paragraph", "text": "hi"}`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Block {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attrs: Attrs,
    #[cfg_attr(feature = "serde", serde(default))]
    pub text: String,
}

impl Leaf {
    pub fn new(subtype: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            subtype: subtype.into(),
            attrs: Attrs::new(),
            content: content.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

impl Group {
    pub fn new(id: GroupId, children: Vec<Node>) -> Self {
        Self {
            id,
            attrs: Attrs::new(),
            children,
        }
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Size of the children alone, without the open and close tokens.
    pub fn content_size(&self) -> usize {
        self.children.iter().map(Node::size).sum()
    }
}

impl Block {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
            text: text.into(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new("paragraph", text)
    }
}

impl Node {
    /// Number of position units the node spans. Leaves are atomic; containers and
    /// textblocks count an open and a close token around their content.
    pub fn size(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Group(group) => group.content_size() + 2,
            Node::Other(block) => block.text.chars().count() + 2,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Node::Leaf(_) => LEAF_TYPE,
            Node::Group(_) => GROUP_TYPE,
            Node::Other(block) => &block.name,
        }
    }

    pub fn attrs(&self) -> &Attrs {
        match self {
            Node::Leaf(leaf) => &leaf.attrs,
            Node::Group(group) => &group.attrs,
            Node::Other(block) => &block.attrs,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    /// Whether this is a leaf of the given groupable subtype.
    pub fn is_eligible(&self, subtype: &str) -> bool {
        self.as_leaf().is_some_and(|leaf| leaf.subtype == subtype)
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Node::Other(block)
    }
}
