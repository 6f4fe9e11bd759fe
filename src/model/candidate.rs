use serde::{Deserialize, Serialize};

use super::position::generate_id;

/// A selectable answer option belonging to exactly one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub position_id: String,
    pub name: String,
}

impl Candidate {
    /// Create a candidate with a freshly generated identifier.
    pub fn new(position_id: String, name: String) -> Self {
        Self {
            id: generate_id("cand"),
            position_id,
            name,
        }
    }
}

// Every position additionally offers two synthetic options at vote time:
// "Abstain" and "Don't know". They are appended by the ballot UI and never
// persisted; only their IDs show up, inside vote selections.

pub const ABSTAIN_LABEL: &str = "Abstain";
pub const DONT_KNOW_LABEL: &str = "Don't know";

const ABSTAIN_PREFIX: &str = "none-";
const DONT_KNOW_PREFIX: &str = "dont-know-";

pub fn abstain_id(position_id: &str) -> String {
    format!("{ABSTAIN_PREFIX}{position_id}")
}

pub fn dont_know_id(position_id: &str) -> String {
    format!("{DONT_KNOW_PREFIX}{position_id}")
}

/// Whether `candidate_id` is one of the two synthetic options for
/// `position_id`.
pub fn is_synthetic(candidate_id: &str, position_id: &str) -> bool {
    candidate_id == abstain_id(position_id) || candidate_id == dont_know_id(position_id)
}

/// The display label of a synthetic option, if `candidate_id` is one.
pub fn synthetic_label(candidate_id: &str) -> Option<&'static str> {
    if candidate_id.starts_with(ABSTAIN_PREFIX) {
        Some(ABSTAIN_LABEL)
    } else if candidate_id.starts_with(DONT_KNOW_PREFIX) {
        Some(DONT_KNOW_LABEL)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_ids_match_their_position_only() {
        assert!(is_synthetic("none-pos-1", "pos-1"));
        assert!(is_synthetic("dont-know-pos-1", "pos-1"));
        assert!(!is_synthetic("none-pos-1", "pos-2"));
        assert!(!is_synthetic("cand-abc", "pos-1"));
    }

    #[test]
    fn synthetic_labels() {
        assert_eq!(Some(ABSTAIN_LABEL), synthetic_label("none-pos-1"));
        assert_eq!(Some(DONT_KNOW_LABEL), synthetic_label("dont-know-pos-1"));
        assert_eq!(None, synthetic_label("cand-abc"));
    }
}
