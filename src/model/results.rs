use serde::{Deserialize, Serialize};

use super::{
    candidate::{self, Candidate},
    participant::Participant,
    position::Position,
    vote::Vote,
};

/// A full dump of all four collections, as served by `GET /api/results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub participants: Vec<Participant>,
    pub positions: Vec<Position>,
    pub candidates: Vec<Candidate>,
    pub votes: Vec<Vote>,
}

/// Vote counts for one candidate within a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTally {
    pub candidate_id: String,
    pub name: String,
    pub count: u64,
    pub percent: f64,
}

/// Tallied results for one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionTally {
    #[serde(flatten)]
    pub position: Position,
    pub total: u64,
    pub candidates: Vec<CandidateTally>,
}

/// Tally the votes per position.
///
/// `total` counts votes whose selection list contains the position. Every
/// persisted candidate of the position appears in the breakdown, even with
/// zero votes; synthetic options appear only if someone picked them.
/// Percentages are of the position's total (0.0 when the total is 0), and
/// candidates are ordered by descending count, stable otherwise.
pub fn tally(
    positions: &[Position],
    candidates: &[Candidate],
    votes: &[Vote],
) -> Vec<PositionTally> {
    positions
        .iter()
        .map(|position| {
            let mut breakdown: Vec<CandidateTally> = candidates
                .iter()
                .filter(|c| c.position_id == position.id)
                .map(|c| CandidateTally {
                    candidate_id: c.id.clone(),
                    name: c.name.clone(),
                    count: 0,
                    percent: 0.0,
                })
                .collect();

            let mut total = 0;
            for vote in votes {
                // At most one selection per position counts per vote.
                let selection = match vote
                    .selections
                    .iter()
                    .find(|s| s.position_id == position.id)
                {
                    Some(selection) => selection,
                    None => continue,
                };
                total += 1;
                match breakdown
                    .iter_mut()
                    .find(|t| t.candidate_id == selection.candidate_id)
                {
                    Some(entry) => entry.count += 1,
                    None => breakdown.push(CandidateTally {
                        candidate_id: selection.candidate_id.clone(),
                        name: candidate::synthetic_label(&selection.candidate_id)
                            .unwrap_or(selection.candidate_id.as_str())
                            .to_string(),
                        count: 1,
                        percent: 0.0,
                    }),
                }
            }

            if total > 0 {
                for entry in &mut breakdown {
                    entry.percent = entry.count as f64 * 100.0 / total as f64;
                }
            }
            breakdown.sort_by(|a, b| b.count.cmp(&a.count));

            PositionTally {
                position: position.clone(),
                total,
                candidates: breakdown,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::candidate::dont_know_id;
    use crate::model::participant::Email;
    use crate::model::vote::Selection;

    fn vote_for(email: &str, position: &Position, candidate_id: impl Into<String>) -> Vote {
        Vote::new(
            email.parse::<Email>().unwrap(),
            vec![Selection {
                position_id: position.id.clone(),
                candidate_id: candidate_id.into(),
            }],
        )
    }

    #[test]
    fn zero_votes_yield_zero_totals_and_percentages() {
        let position = Position::new("Favorite color".to_string(), String::new());
        let candidates = vec![Candidate::new(position.id.clone(), "Red".to_string())];

        let tallies = tally(&[position], &candidates, &[]);

        assert_eq!(1, tallies.len());
        assert_eq!(0, tallies[0].total);
        assert_eq!(1, tallies[0].candidates.len());
        assert_eq!(0, tallies[0].candidates[0].count);
        assert_eq!(0.0, tallies[0].candidates[0].percent);
    }

    #[test]
    fn single_vote_tallies_to_one_hundred_percent() {
        let position = Position::new("Favorite color".to_string(), String::new());
        let red = Candidate::new(position.id.clone(), "Red".to_string());
        let blue = Candidate::new(position.id.clone(), "Blue".to_string());
        let votes = vec![vote_for("a@x.com", &position, red.id.clone())];

        let tallies = tally(
            std::slice::from_ref(&position),
            &[red.clone(), blue.clone()],
            &votes,
        );

        assert_eq!(1, tallies[0].total);
        // Sorted by descending count: Red first.
        assert_eq!(red.id, tallies[0].candidates[0].candidate_id);
        assert_eq!(1, tallies[0].candidates[0].count);
        assert_eq!(100.0, tallies[0].candidates[0].percent);
        assert_eq!(blue.id, tallies[0].candidates[1].candidate_id);
        assert_eq!(0, tallies[0].candidates[1].count);
        assert_eq!(0.0, tallies[0].candidates[1].percent);
    }

    #[test]
    fn synthetic_selections_appear_in_breakdown() {
        let position = Position::new("Favorite color".to_string(), String::new());
        let red = Candidate::new(position.id.clone(), "Red".to_string());
        let votes = vec![
            vote_for("a@x.com", &position, red.id.clone()),
            vote_for("b@x.com", &position, dont_know_id(&position.id)),
        ];

        let tallies = tally(std::slice::from_ref(&position), &[red], &votes);

        assert_eq!(2, tallies[0].total);
        let dont_know = tallies[0]
            .candidates
            .iter()
            .find(|t| t.candidate_id == dont_know_id(&position.id))
            .unwrap();
        assert_eq!("Don't know", dont_know.name);
        assert_eq!(1, dont_know.count);
        assert_eq!(50.0, dont_know.percent);
    }

    #[test]
    fn votes_for_other_positions_do_not_count() {
        let color = Position::new("Favorite color".to_string(), String::new());
        let pet = Position::new("Favorite pet".to_string(), String::new());
        let red = Candidate::new(color.id.clone(), "Red".to_string());
        let cat = Candidate::new(pet.id.clone(), "Cat".to_string());
        let votes = vec![vote_for("a@x.com", &pet, cat.id.clone())];

        let tallies = tally(&[color, pet], &[red, cat], &votes);

        assert_eq!(0, tallies[0].total);
        assert_eq!(1, tallies[1].total);
    }
}
