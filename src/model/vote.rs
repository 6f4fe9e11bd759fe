use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    candidate::{self, Candidate},
    participant::Email,
    position::Position,
};

/// One (position, candidate) pair within a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub position_id: String,
    pub candidate_id: String,
}

/// An append-only record of a cast ballot. Votes are never updated or
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub email: Email,
    pub selections: Vec<Selection>,
    pub cast_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(email: Email, selections: Vec<Selection>) -> Self {
        Self {
            email,
            selections,
            cast_at: Utc::now(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no selection for position '{0}'")]
    MissingPosition(String),
    #[error("more than one selection for position '{0}'")]
    DuplicatePosition(String),
    #[error("unknown position '{0}'")]
    UnknownPosition(String),
    #[error("unknown candidate '{candidate_id}' for position '{position_id}'")]
    UnknownCandidate {
        position_id: String,
        candidate_id: String,
    },
}

/// Check that `selections` covers exactly the current positions, one
/// selection each, and that every candidate is a real candidate of its
/// claimed position or one of the two synthetic options.
pub fn validate_selections(
    selections: &[Selection],
    positions: &[Position],
    candidates: &[Candidate],
) -> Result<(), SelectionError> {
    let mut seen = HashSet::new();
    for selection in selections {
        if !positions.iter().any(|p| p.id == selection.position_id) {
            return Err(SelectionError::UnknownPosition(
                selection.position_id.clone(),
            ));
        }
        if !seen.insert(selection.position_id.as_str()) {
            return Err(SelectionError::DuplicatePosition(
                selection.position_id.clone(),
            ));
        }
        let real = candidates
            .iter()
            .any(|c| c.position_id == selection.position_id && c.id == selection.candidate_id);
        if !real && !candidate::is_synthetic(&selection.candidate_id, &selection.position_id) {
            return Err(SelectionError::UnknownCandidate {
                position_id: selection.position_id.clone(),
                candidate_id: selection.candidate_id.clone(),
            });
        }
    }
    for position in positions {
        if !seen.contains(position.id.as_str()) {
            return Err(SelectionError::MissingPosition(position.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::candidate::{abstain_id, dont_know_id};

    fn catalog() -> (Vec<Position>, Vec<Candidate>) {
        let color = Position::new("Favorite color".to_string(), String::new());
        let pet = Position::new("Favorite pet".to_string(), String::new());
        let candidates = vec![
            Candidate::new(color.id.clone(), "Red".to_string()),
            Candidate::new(color.id.clone(), "Blue".to_string()),
            Candidate::new(pet.id.clone(), "Cat".to_string()),
        ];
        (vec![color, pet], candidates)
    }

    fn pick(position: &Position, candidate_id: impl Into<String>) -> Selection {
        Selection {
            position_id: position.id.clone(),
            candidate_id: candidate_id.into(),
        }
    }

    #[test]
    fn full_ballot_with_real_and_synthetic_options_is_valid() {
        let (positions, candidates) = catalog();
        let selections = vec![
            pick(&positions[0], candidates[0].id.clone()),
            pick(&positions[1], dont_know_id(&positions[1].id)),
        ];
        assert_eq!(
            Ok(()),
            validate_selections(&selections, &positions, &candidates)
        );
    }

    #[test]
    fn abstain_is_valid_for_its_own_position_only() {
        let (positions, candidates) = catalog();
        let selections = vec![
            // Abstain ID minted for the other position.
            pick(&positions[0], abstain_id(&positions[1].id)),
            pick(&positions[1], candidates[2].id.clone()),
        ];
        assert!(matches!(
            validate_selections(&selections, &positions, &candidates),
            Err(SelectionError::UnknownCandidate { .. })
        ));
    }

    #[test]
    fn missing_position_is_rejected() {
        let (positions, candidates) = catalog();
        let selections = vec![pick(&positions[0], candidates[0].id.clone())];
        assert_eq!(
            Err(SelectionError::MissingPosition(positions[1].id.clone())),
            validate_selections(&selections, &positions, &candidates)
        );
    }

    #[test]
    fn duplicate_selection_is_rejected() {
        let (positions, candidates) = catalog();
        let selections = vec![
            pick(&positions[0], candidates[0].id.clone()),
            pick(&positions[0], candidates[1].id.clone()),
            pick(&positions[1], candidates[2].id.clone()),
        ];
        assert_eq!(
            Err(SelectionError::DuplicatePosition(positions[0].id.clone())),
            validate_selections(&selections, &positions, &candidates)
        );
    }

    #[test]
    fn unknown_position_is_rejected() {
        let (positions, candidates) = catalog();
        let selections = vec![Selection {
            position_id: "pos-gone".to_string(),
            candidate_id: candidates[0].id.clone(),
        }];
        assert_eq!(
            Err(SelectionError::UnknownPosition("pos-gone".to_string())),
            validate_selections(&selections, &positions, &candidates)
        );
    }

    #[test]
    fn candidate_from_another_position_is_rejected() {
        let (positions, candidates) = catalog();
        let selections = vec![
            // "Cat" belongs to the pet position.
            pick(&positions[0], candidates[2].id.clone()),
            pick(&positions[1], candidates[2].id.clone()),
        ];
        assert!(matches!(
            validate_selections(&selections, &positions, &candidates),
            Err(SelectionError::UnknownCandidate { .. })
        ));
    }
}
