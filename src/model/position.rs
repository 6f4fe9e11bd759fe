use serde::{Deserialize, Serialize};

/// A survey question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Position {
    /// Create a position with a freshly generated identifier.
    pub fn new(name: String, description: String) -> Self {
        Self {
            id: generate_id("pos"),
            name,
            description,
        }
    }
}

/// Generate an identifier with the given prefix. Uniqueness is the only
/// requirement; IDs carry no ordering.
pub(crate) fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{:016x}", rand::random::<u64>())
}
