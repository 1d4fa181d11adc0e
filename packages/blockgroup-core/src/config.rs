#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Subtype that marks a block as groupable unless configured otherwise.
pub const DEFAULT_ELIGIBLE_SUBTYPE: &str = "CHATGPT";
pub const DEFAULT_MIN_SELECTION: usize = 2;
pub const DEFAULT_MAX_SELECTION: usize = 4;

/// Policy knobs for grouping. Only one subtype is groupable at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct GroupingPolicy {
    pub eligible_subtype: String,
    /// Fewest positions accepted by explicit grouping.
    pub min_selection: usize,
    /// Most positions accepted by explicit grouping.
    pub max_selection: usize,
}

impl Default for GroupingPolicy {
    fn default() -> Self {
        Self {
            eligible_subtype: DEFAULT_ELIGIBLE_SUBTYPE.to_string(),
            min_selection: DEFAULT_MIN_SELECTION,
            max_selection: DEFAULT_MAX_SELECTION,
        }
    }
}

impl GroupingPolicy {
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.eligible_subtype = subtype.into();
        self
    }

    pub fn with_max_selection(mut self, max: usize) -> Self {
        self.max_selection = max;
        self
    }

    pub fn accepts_selection_len(&self, len: usize) -> bool {
        len >= self.min_selection.max(2) && len <= self.max_selection
    }
}

#[cfg(feature = "serde")]
impl GroupingPolicy {
    /// Parse a policy from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::Error::InvalidOperation(e.to_string()))
    }
}
