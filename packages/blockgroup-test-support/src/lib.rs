//! Fixtures shared by the editor conformance tests.

use blockgroup_core::{Block, Document, Group, GroupId, Leaf, Node, Point, PositionResolver};

pub const CHAT: &str = "CHATGPT";

/// Groupable attachment block whose content is `label`.
pub fn chat(label: &str) -> Node {
    Leaf::new(CHAT, label).into()
}

pub fn leaf(subtype: &str, label: &str) -> Node {
    Leaf::new(subtype, label).into()
}

pub fn paragraph(text: &str) -> Node {
    Block::paragraph(text).into()
}

pub fn group(n: u64, children: Vec<Node>) -> Node {
    Group::new(GroupId::from_sequence(n), children).into()
}

pub fn doc(nodes: Vec<Node>) -> Document {
    Document::new(nodes)
}

/// Compact rendering of the top level: leaves by content, paragraphs quoted, groups as
/// `[a b]`.
pub fn labels(doc: &Document) -> Vec<String> {
    doc.content().iter().map(label).collect()
}

fn label(node: &Node) -> String {
    match node {
        Node::Leaf(leaf) => leaf.content.clone(),
        Node::Other(block) => format!("'{}'", block.text),
        Node::Group(group) => {
            let inner: Vec<String> = group.children.iter().map(label).collect();
            format!("[{}]", inner.join(" "))
        }
    }
}

/// Start position of every top-level node, in order.
pub fn top_level_positions(doc: &Document) -> Vec<usize> {
    doc.content()
        .iter()
        .scan(0, |pos, node| {
            let start = *pos;
            *pos += node.size();
            Some(start)
        })
        .collect()
}

/// Resolver with a fixed table of pointer points. Unknown points resolve to nothing.
#[derive(Debug, Default)]
pub struct ScriptedResolver {
    hits: Vec<(Point, usize)>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(mut self, point: Point, pos: usize) -> Self {
        self.hits.push((point, pos));
        self
    }
}

impl PositionResolver for ScriptedResolver {
    fn pos_at_coords(&self, _doc: &Document, point: Point) -> Option<usize> {
        self.hits.iter().find(|(p, _)| *p == point).map(|(_, pos)| *pos)
    }
}

/// Top-level blocks stacked as rows of equal height. `y` snaps to the nearest gap
/// between rows; points left of zero or past the last row resolve to nothing.
#[derive(Debug, Clone, Copy)]
pub struct RowLayout {
    pub row_height: f64,
}

impl RowLayout {
    pub fn new(row_height: f64) -> Self {
        Self { row_height }
    }

    /// Point in the middle of the gap before row `index`.
    pub fn gap(&self, index: usize) -> Point {
        Point::new(0.0, index as f64 * self.row_height)
    }
}

impl PositionResolver for RowLayout {
    fn pos_at_coords(&self, doc: &Document, point: Point) -> Option<usize> {
        if point.x < 0.0 || point.y < 0.0 || self.row_height <= 0.0 {
            return None;
        }
        let gap = (point.y / self.row_height).round() as usize;
        if gap > doc.content().len() {
            return None;
        }
        Some(doc.content()[..gap].iter().map(Node::size).sum())
    }
}
