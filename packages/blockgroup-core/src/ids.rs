use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Prefix shared by identifiers minted by [`crate::SequentialGroupIds`].
pub const GROUP_ID_PREFIX: &str = "group-";

/// Unique identifier of a group node. Never reused within a document's lifetime.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_sequence(n: u64) -> Self {
        Self(format!("{GROUP_ID_PREFIX}{n}"))
    }

    /// Sequence number for ids of the `group-<n>` form.
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(GROUP_ID_PREFIX)?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
