use serde::{Deserialize, Serialize};
use std::fmt;
use strum::Display;

/// Opaque identifier issued by the backend on upload.
///
/// The client never inspects or mints these; the backend is the only
/// authority on their format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DatasetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One state slot per backend action. Each slot carries its own request
/// token so a stale response never overwrites a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Slot {
    Upload,
    Preview,
    Profile,
    Explain,
    Columns,
    ExplainColumn,
    FeatureIdeas,
}

impl Slot {
    pub const COUNT: usize = 7;

    pub fn index(self) -> usize {
        match self {
            Self::Upload => 0,
            Self::Preview => 1,
            Self::Profile => 2,
            Self::Explain => 3,
            Self::Columns => 4,
            Self::ExplainColumn => 5,
            Self::FeatureIdeas => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_id_is_opaque_passthrough() {
        let id = DatasetId::new("550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(id.as_str(), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_dataset_id_serializes_as_plain_string() {
        let id = DatasetId::new("abc-123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc-123\"");

        let restored: DatasetId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }

    #[test]
    fn test_slot_indices_are_distinct() {
        let slots = [
            Slot::Upload,
            Slot::Preview,
            Slot::Profile,
            Slot::Explain,
            Slot::Columns,
            Slot::ExplainColumn,
            Slot::FeatureIdeas,
        ];
        let mut seen = [false; Slot::COUNT];
        for slot in slots {
            assert!(!seen[slot.index()], "duplicate index for {}", slot);
            seen[slot.index()] = true;
        }
    }
}
