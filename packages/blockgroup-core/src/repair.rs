//! Normalization of groups that fell below two children.
//!
//! The pass is two-phase: [`scan`] walks a snapshot without touching it, [`plan`] turns
//! every violation into one batch. A valid document produces no batch at all.

use crate::doc::Document;
use crate::error::Result;
use crate::ids::GroupId;
use crate::node::Node;
use crate::ops::Batch;

/// A group that breaks the arity invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub id: GroupId,
    pub from: usize,
    pub to: usize,
    pub fix: Fix,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fix {
    /// Empty group: delete its whole range.
    Remove,
    /// Single child: replace the group with the child.
    Unwrap(Node),
}

pub fn scan(doc: &Document) -> Vec<Violation> {
    doc.descendants()
        .filter_map(|entry| {
            let group = entry.node.as_group()?;
            let fix = match group.children.as_slice() {
                [] => Fix::Remove,
                [only] => Fix::Unwrap(only.clone()),
                _ => return None,
            };
            Some(Violation {
                id: group.id.clone(),
                from: entry.pos,
                to: entry.end(),
                fix,
            })
        })
        .collect()
}

/// Batch fixing every violation of `doc`, or `None` when there is nothing to fix.
pub fn plan(doc: &Document) -> Option<Batch> {
    let violations = scan(doc);
    if violations.is_empty() {
        return None;
    }
    let mut batch = Batch::new();
    for violation in violations {
        match violation.fix {
            Fix::Remove => batch.delete(violation.from, violation.to),
            Fix::Unwrap(child) => batch.replace(violation.from, violation.to, vec![child]),
        };
    }
    Some(batch)
}

/// Run the pass. Returns the repaired snapshot, or `None` if `doc` was already valid.
pub fn repair(doc: &Document) -> Result<Option<Document>> {
    let Some(batch) = plan(doc) else {
        return Ok(None);
    };
    let repaired = doc.apply(&batch)?;
    tracing::debug!(fixed = batch.len(), version = repaired.version(), "repaired groups");
    Ok(Some(repaired))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Block, Group, Leaf};

    fn chat(label: &str) -> Node {
        Leaf::new("CHATGPT", label).into()
    }

    fn group(n: u64, children: Vec<Node>) -> Node {
        Group::new(GroupId::from_sequence(n), children).into()
    }

    #[test]
    fn scan_reports_empty_and_single_child_groups() {
        let doc = Document::new(vec![
            group(1, vec![]),
            group(2, vec![chat("A")]),
            group(3, vec![chat("B"), chat("C")]),
        ]);
        let violations = scan(&doc);
        assert_eq!(
            violations,
            vec![
                Violation {
                    id: GroupId::from_sequence(1),
                    from: 0,
                    to: 2,
                    fix: Fix::Remove,
                },
                Violation {
                    id: GroupId::from_sequence(2),
                    from: 2,
                    to: 5,
                    fix: Fix::Unwrap(chat("A")),
                },
            ]
        );
    }

    #[test]
    fn fixes_every_group_in_one_batch() {
        let doc = Document::new(vec![
            Block::paragraph("x").into(),
            group(1, vec![]),
            chat("A"),
            group(2, vec![chat("B")]),
            group(3, vec![chat("C"), chat("D")]),
        ]);
        let repaired = repair(&doc).unwrap().unwrap();
        assert_eq!(repaired.version(), doc.version() + 1);
        assert_eq!(
            repaired.content(),
            &[
                Block::paragraph("x").into(),
                chat("A"),
                chat("B"),
                group(3, vec![chat("C"), chat("D")]),
            ]
        );
        repaired.validate_invariants().unwrap();
    }

    #[test]
    fn valid_documents_are_left_alone() {
        let doc = Document::new(vec![chat("A"), group(1, vec![chat("B"), chat("C")])]);
        assert!(plan(&doc).is_none());
        assert!(repair(&doc).unwrap().is_none());
    }
}
