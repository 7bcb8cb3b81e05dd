//! Voter-candidate alignment scoring.
//!
//! This is the single authoritative implementation of the alignment
//! formula; the request path and the batch jobs must both call it.
//! Reimplementing it elsewhere is a correctness bug, not a variance.

use std::collections::BTreeSet;

use crate::model::db::{candidate::CandidatePosition, issue::IssueId};

/// Neutral score for a voter with no selected issues.
const NEUTRAL_SCORE: u8 = 50;
/// Low-confidence score for a candidate with no stated positions.
/// Deliberately below neutral: unstated positions must never outrank
/// stated ones.
const NO_POSITIONS_SCORE: u8 = 30;
/// Base score once both sides have data.
const BASE_SCORE: f64 = 20.0;
/// Weight of the issue overlap ratio.
const OVERLAP_WEIGHT: f64 = 50.0;
/// Total priority bonus is capped here.
const MAX_PRIORITY_BONUS: u32 = 30;
/// A position further than this from centre (either direction) trips a
/// dealbreaker.
const DEALBREAKER_SPECTRUM: i8 = 80;

/// The result of scoring one candidate against one voter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// 0-100 match score.
    pub score: u8,
    /// Issues the candidate takes a position on that the voter selected.
    pub matched_issues: BTreeSet<IssueId>,
    /// True iff some voter dealbreaker issue has an extreme candidate
    /// position.
    pub has_dealbreaker: bool,
}

/// Score a candidate's positions against a voter's preferences.
pub fn score(
    voter_issues: &BTreeSet<IssueId>,
    voter_dealbreakers: &BTreeSet<IssueId>,
    positions: &[CandidatePosition],
) -> Alignment {
    let matched_issues: BTreeSet<IssueId> = positions
        .iter()
        .filter(|p| voter_issues.contains(&p.issue_id))
        .map(|p| p.issue_id.clone())
        .collect();

    // Widen before abs so spectrum -128 can't overflow.
    let has_dealbreaker = positions.iter().any(|p| {
        voter_dealbreakers.contains(&p.issue_id)
            && i16::from(p.spectrum_position).abs() > i16::from(DEALBREAKER_SPECTRUM)
    });

    // Edge cases short-circuit the formula. A voter with no selected
    // issues sees neutral even for position-less candidates.
    if voter_issues.is_empty() {
        return Alignment {
            score: NEUTRAL_SCORE,
            matched_issues,
            has_dealbreaker,
        };
    }
    if positions.is_empty() {
        return Alignment {
            score: NO_POSITIONS_SCORE,
            matched_issues,
            has_dealbreaker,
        };
    }

    let overlap_ratio = matched_issues.len() as f64 / voter_issues.len() as f64;
    let priority_bonus: u32 = matched_issues
        .iter()
        .filter_map(|issue| positions.iter().find(|p| &p.issue_id == issue))
        .map(|p| match p.priority {
            0..=3 => 10,
            4..=5 => 5,
            _ => 0,
        })
        .sum();
    let capped_bonus = priority_bonus.min(MAX_PRIORITY_BONUS);

    let raw = BASE_SCORE + overlap_ratio * OVERLAP_WEIGHT + f64::from(capped_bonus);
    let score = raw.round().clamp(0.0, 100.0) as u8;

    Alignment {
        score,
        matched_issues,
        has_dealbreaker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issues(names: &[&str]) -> BTreeSet<IssueId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn position(issue: &str, priority: u32, spectrum: i8) -> CandidatePosition {
        CandidatePosition {
            issue_id: issue.to_string(),
            position: format!("position on {issue}"),
            priority,
            spectrum_position: spectrum,
        }
    }

    #[test]
    fn no_selected_issues_is_neutral() {
        let positions = vec![position("healthcare", 1, -50), position("climate", 2, 30)];
        let alignment = score(&issues(&[]), &issues(&[]), &positions);
        assert_eq!(alignment.score, 50);

        // Still neutral against a position-less candidate.
        let alignment = score(&issues(&[]), &issues(&[]), &[]);
        assert_eq!(alignment.score, 50);
    }

    #[test]
    fn no_positions_is_low_confidence() {
        let alignment = score(
            &issues(&["healthcare", "climate", "economy", "housing"]),
            &issues(&[]),
            &[],
        );
        assert_eq!(alignment.score, 30);
        assert!(alignment.matched_issues.is_empty());
        assert!(!alignment.has_dealbreaker);
    }

    #[test]
    fn worked_example_candidate_a() {
        // overlapRatio = 0.5, bonus = 10 => round(20 + 25 + 10) = 55.
        let alignment = score(
            &issues(&["healthcare", "climate"]),
            &issues(&[]),
            &[position("healthcare", 1, -50)],
        );
        assert_eq!(alignment.score, 55);
        assert_eq!(alignment.matched_issues, issues(&["healthcare"]));
    }

    #[test]
    fn worked_example_candidate_b() {
        // overlapRatio = 1.0, bonus = 10 + 10 = 20 => round(20 + 50 + 20) = 90.
        let alignment = score(
            &issues(&["healthcare", "climate"]),
            &issues(&[]),
            &[position("climate", 4, 10), position("healthcare", 1, 20)],
        );
        assert_eq!(alignment.score, 90);
        assert_eq!(alignment.matched_issues, issues(&["healthcare", "climate"]));
    }

    #[test]
    fn priority_bonus_tiers() {
        // Priority 4-5 earns the small bonus, 6+ earns none.
        let voter = issues(&["a", "b", "c", "d"]);
        let alignment = score(&voter, &issues(&[]), &[position("a", 5, 0)]);
        // 20 + 0.25*50 + 5 = 37.5 => 38.
        assert_eq!(alignment.score, 38);

        let alignment = score(&voter, &issues(&[]), &[position("a", 6, 0)]);
        // 20 + 12.5 + 0 = 32.5 => 33.
        assert_eq!(alignment.score, 33);
    }

    #[test]
    fn priority_bonus_caps_at_thirty() {
        // Four priority<=3 matches would earn 40; the cap holds it to 30.
        let voter = issues(&["a", "b", "c", "d"]);
        let positions = vec![
            position("a", 1, 0),
            position("b", 2, 0),
            position("c", 3, 0),
            position("d", 3, 0),
        ];
        let alignment = score(&voter, &issues(&[]), &positions);
        // 20 + 50 + 30 = 100.
        assert_eq!(alignment.score, 100);
    }

    #[test]
    fn dealbreaker_boundary() {
        let voter = issues(&["healthcare", "climate", "economy", "housing"]);
        let dealbreakers = issues(&["climate"]);

        // |80| does not trip.
        let alignment = score(&voter, &dealbreakers, &[position("climate", 1, 80)]);
        assert!(!alignment.has_dealbreaker);
        let alignment = score(&voter, &dealbreakers, &[position("climate", 1, -80)]);
        assert!(!alignment.has_dealbreaker);

        // |81| trips.
        let alignment = score(&voter, &dealbreakers, &[position("climate", 1, 81)]);
        assert!(alignment.has_dealbreaker);
        let alignment = score(&voter, &dealbreakers, &[position("climate", 1, -81)]);
        assert!(alignment.has_dealbreaker);
    }

    #[test]
    fn dealbreaker_ignores_non_dealbreaker_issues() {
        let voter = issues(&["healthcare", "climate", "economy", "housing"]);
        let dealbreakers = issues(&["climate"]);
        // Extreme position on a non-dealbreaker issue is fine.
        let alignment = score(&voter, &dealbreakers, &[position("economy", 1, 100)]);
        assert!(!alignment.has_dealbreaker);
    }

    #[test]
    fn dealbreaker_on_unselected_issue_still_trips() {
        // Dealbreakers are checked against the candidate's positions, not
        // against the selected-issue overlap.
        let voter = issues(&["healthcare", "economy", "housing", "education"]);
        let dealbreakers = issues(&["climate"]);
        let alignment = score(&voter, &dealbreakers, &[position("climate", 1, -100)]);
        assert!(alignment.has_dealbreaker);
    }

    #[test]
    fn extreme_negative_spectrum_does_not_overflow() {
        let voter = issues(&["a", "b", "c", "d"]);
        let alignment = score(&voter, &issues(&["a"]), &[position("a", 1, i8::MIN)]);
        assert!(alignment.has_dealbreaker);
    }

    #[test]
    fn score_stays_in_range() {
        let voter = issues(&["a", "b", "c", "d", "e", "f", "g"]);
        let positions: Vec<_> = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .enumerate()
            .map(|(i, issue)| position(issue, i as u32 + 1, 0))
            .collect();
        let alignment = score(&voter, &issues(&[]), &positions);
        assert!(alignment.score <= 100);
        // Full overlap with capped bonus: 20 + 50 + 30 = 100.
        assert_eq!(alignment.score, 100);
    }
}
