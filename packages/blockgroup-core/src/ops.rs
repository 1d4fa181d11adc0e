use crate::doc::Document;
use crate::error::{Error, Result};
use crate::node::Node;

/// A single position-addressed edit. Positions refer to the origin snapshot of the
/// batch the edit belongs to, never to intermediate states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    Insert { at: usize, nodes: Vec<Node> },
    Delete { from: usize, to: usize },
    Replace { from: usize, to: usize, nodes: Vec<Node> },
}

impl Edit {
    /// `(from, to)` covered in the origin snapshot. Inserts are empty ranges.
    pub fn range(&self) -> (usize, usize) {
        match self {
            Edit::Insert { at, .. } => (*at, *at),
            Edit::Delete { from, to } | Edit::Replace { from, to, .. } => (*from, *to),
        }
    }

    fn nodes(&self) -> &[Node] {
        match self {
            Edit::Insert { nodes, .. } | Edit::Replace { nodes, .. } => nodes,
            Edit::Delete { .. } => &[],
        }
    }
}

/// Ordered set of edits applied atomically by [`Document::apply`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Batch {
    edits: Vec<Edit>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edit: Edit) -> &mut Self {
        self.edits.push(edit);
        self
    }

    pub fn insert(&mut self, at: usize, nodes: Vec<Node>) -> &mut Self {
        self.push(Edit::Insert { at, nodes })
    }

    pub fn delete(&mut self, from: usize, to: usize) -> &mut Self {
        self.push(Edit::Delete { from, to })
    }

    pub fn replace(&mut self, from: usize, to: usize, nodes: Vec<Node>) -> &mut Self {
        self.push(Edit::Replace { from, to, nodes })
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

impl FromIterator<Edit> for Batch {
    fn from_iter<T: IntoIterator<Item = Edit>>(iter: T) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

/// An edit resolved to a splice of one container's child list.
struct Splice {
    seq: usize,
    from: usize,
    to: usize,
    path: Vec<usize>,
    start_index: usize,
    end_index: usize,
    nodes: Vec<Node>,
}

impl Document {
    /// Apply every edit of `batch` against this snapshot and return the new snapshot.
    ///
    /// Edits are applied in document order (ties keep batch order). Overlapping edits
    /// fail with [`Error::Conflict`]; ranges that do not cover whole nodes of a single
    /// container fail with [`Error::InvalidRange`]. On failure `self` is untouched.
    pub fn apply(&self, batch: &Batch) -> Result<Document> {
        if batch.is_empty() {
            return Ok(self.clone());
        }

        let mut splices = batch
            .edits()
            .iter()
            .enumerate()
            .map(|(seq, edit)| self.plan_splice(seq, edit))
            .collect::<Result<Vec<_>>>()?;
        splices.sort_by_key(|s| (s.from, s.to, s.seq));
        check_overlaps(&splices)?;

        let mut content = self.content().to_vec();
        // Highest positions first so the indices of earlier splices stay valid.
        for splice in splices.into_iter().rev() {
            let siblings = container_mut(&mut content, &splice.path).ok_or_else(|| {
                Error::InvalidRange(format!(
                    "container of {}..{} vanished during apply",
                    splice.from, splice.to
                ))
            })?;
            siblings.splice(splice.start_index..splice.end_index, splice.nodes);
        }

        let next = Document::with_version(content, self.version() + 1);
        if let Err(err) = next.validate_structure() {
            tracing::warn!(%err, "rejected batch");
            return Err(err);
        }
        tracing::debug!(
            edits = batch.len(),
            version = next.version(),
            size = next.size(),
            "applied batch"
        );
        Ok(next)
    }

    fn plan_splice(&self, seq: usize, edit: &Edit) -> Result<Splice> {
        let (from, to) = edit.range();
        if from > to {
            return Err(Error::InvalidRange(format!("range {from}..{to} is reversed")));
        }
        let start = self.resolve(from)?;
        if !start.is_boundary() {
            return Err(Error::InvalidRange(format!(
                "position {from} falls inside a block"
            )));
        }
        let end_index = if from == to {
            start.index()
        } else {
            let end = self.resolve(to)?;
            if !end.is_boundary() {
                return Err(Error::InvalidRange(format!(
                    "position {to} falls inside a block"
                )));
            }
            if end.path() != start.path() {
                return Err(Error::InvalidRange(format!(
                    "range {from}..{to} crosses a group boundary"
                )));
            }
            end.index()
        };
        Ok(Splice {
            seq,
            from,
            to,
            path: start.path().to_vec(),
            start_index: start.index(),
            end_index,
            nodes: edit.nodes().to_vec(),
        })
    }
}

fn check_overlaps(sorted: &[Splice]) -> Result<()> {
    let mut reach: Option<&Splice> = None;
    for splice in sorted {
        if let Some(prev) = reach {
            if splice.from < prev.to {
                tracing::debug!(
                    first = prev.seq,
                    second = splice.seq,
                    "overlapping edits in batch"
                );
                return Err(Error::Conflict(format!(
                    "edit #{} ({}..{}) overlaps edit #{} ({}..{})",
                    splice.seq, splice.from, splice.to, prev.seq, prev.from, prev.to
                )));
            }
        }
        if reach.map_or(true, |prev| splice.to > prev.to) {
            reach = Some(splice);
        }
    }
    Ok(())
}

fn container_mut<'a>(content: &'a mut Vec<Node>, path: &[usize]) -> Option<&'a mut Vec<Node>> {
    let mut siblings = content;
    for &index in path {
        match siblings.get_mut(index)? {
            Node::Group(group) => siblings = &mut group.children,
            _ => return None,
        }
    }
    Some(siblings)
}
