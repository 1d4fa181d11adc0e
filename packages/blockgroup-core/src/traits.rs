use crate::doc::Document;
use crate::ids::GroupId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pluggable source of group identifiers, counter-based or random.
pub trait GroupIdSource {
    fn next_id(&mut self) -> GroupId;
    /// Record an id that already exists so it is never handed out again.
    fn observe(&mut self, existing: &GroupId);
}

/// Monotonic `group-<n>` identifiers. Useful for tests and as the default.
#[derive(Clone, Debug, Default)]
pub struct SequentialGroupIds {
    counter: u64,
}

impl SequentialGroupIds {
    pub fn starting_after(counter: u64) -> Self {
        Self { counter }
    }

    pub fn last(&self) -> u64 {
        self.counter
    }
}

impl GroupIdSource for SequentialGroupIds {
    fn next_id(&mut self) -> GroupId {
        match self.counter.checked_add(1) {
            Some(next) => {
                self.counter = next;
                GroupId::from_sequence(next)
            }
            // sequence space exhausted by an observed id
            None => RandomGroupIds.next_id(),
        }
    }

    fn observe(&mut self, existing: &GroupId) {
        if let Some(n) = existing.sequence() {
            self.counter = self.counter.max(n);
        }
    }
}

/// Random UUID v4 identifiers, for hosts that merge documents from several editors.
#[derive(Clone, Debug, Default)]
pub struct RandomGroupIds;

impl GroupIdSource for RandomGroupIds {
    fn next_id(&mut self) -> GroupId {
        GroupId::new(format!("group-{}", uuid::Uuid::new_v4()))
    }

    fn observe(&mut self, _existing: &GroupId) {}
}

/// Pointer coordinates as delivered by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Host rendering layer hook mapping pointer coordinates to a document position.
pub trait PositionResolver {
    /// `None` when the coordinates do not map inside the document.
    fn pos_at_coords(&self, doc: &Document, point: Point) -> Option<usize>;
}

impl<F> PositionResolver for F
where
    F: Fn(&Document, Point) -> Option<usize>,
{
    fn pos_at_coords(&self, doc: &Document, point: Point) -> Option<usize> {
        self(doc, point)
    }
}
