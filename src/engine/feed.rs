//! Feed assembly: score, filter, order, paginate.
//!
//! A pure read path. Assembly never mutates counters, ranks, or views;
//! candidates are scored fresh for every request and nothing is cached
//! across voters.

use crate::engine::alignment;
use crate::model::{
    api::feed::{FeedFilters, FeedItem, FeedPage},
    db::{
        candidate::{Candidate, CandidateStatus},
        preferences::VoterPreferences,
    },
};

/// Assemble one voter's feed page from the candidate pool.
///
/// Only approved candidates are eligible. The full filtered set is sorted
/// before slicing, so page boundaries stay stable as the caller walks
/// through `offset`.
pub fn assemble(
    prefs: &VoterPreferences,
    pool: &[Candidate],
    filters: &FeedFilters,
    limit: usize,
    offset: usize,
) -> FeedPage {
    let mut items: Vec<FeedItem> = pool
        .iter()
        .filter(|candidate| candidate.status == CandidateStatus::Approved)
        .filter(|candidate| matches_issue_filter(candidate, filters))
        .map(|candidate| {
            let alignment = alignment::score(
                &prefs.selected_issues,
                &prefs.dealbreakers,
                &candidate.positions,
            );
            FeedItem {
                candidate_id: candidate.id,
                alignment_score: alignment.score,
                matched_issues: alignment.matched_issues,
                has_dealbreaker: alignment.has_dealbreaker,
            }
        })
        .filter(|item| {
            filters
                .min_alignment
                .map_or(true, |min| item.alignment_score >= min)
        })
        .filter(|item| !(filters.exclude_dealbreakers && item.has_dealbreaker))
        .collect();

    // Primary: non-dealbreakers first. Secondary: score descending.
    // Candidate ID breaks ties so pagination is deterministic.
    items.sort_by(|a, b| {
        a.has_dealbreaker
            .cmp(&b.has_dealbreaker)
            .then(b.alignment_score.cmp(&a.alignment_score))
            .then(a.candidate_id.cmp(&b.candidate_id))
    });

    let total = items.len();
    let has_more = offset + limit < total;
    let items = items.into_iter().skip(offset).take(limit).collect();

    FeedPage {
        items,
        total: total as u64,
        has_more,
    }
}

/// Does the candidate take a position on at least one filter issue?
/// No issue filter means everything passes.
fn matches_issue_filter(candidate: &Candidate, filters: &FeedFilters) -> bool {
    match &filters.issue_ids {
        Some(wanted) => candidate
            .positions
            .iter()
            .any(|p| wanted.contains(&p.issue_id)),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    use crate::model::db::candidate::{CandidateCore, CandidatePosition};
    use crate::model::db::issue::IssueId;
    use crate::model::mongodb::Id;

    fn issues(names: &[&str]) -> BTreeSet<IssueId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn position(issue: &str, priority: u32, spectrum: i8) -> CandidatePosition {
        CandidatePosition {
            issue_id: issue.to_string(),
            position: String::new(),
            priority,
            spectrum_position: spectrum,
        }
    }

    fn candidate(status: CandidateStatus, positions: Vec<CandidatePosition>) -> Candidate {
        let mut core = CandidateCore::new(Id::new(), positions);
        core.status = status;
        Candidate {
            id: Id::new(),
            candidate: core,
        }
    }

    fn prefs(selected: &[&str], dealbreakers: &[&str]) -> VoterPreferences {
        VoterPreferences::new(Id::new(), issues(selected), issues(dealbreakers))
    }

    fn assert_feed_order(page: &FeedPage) {
        for pair in page.items.windows(2) {
            assert!(pair[0].has_dealbreaker <= pair[1].has_dealbreaker);
            if pair[0].has_dealbreaker == pair[1].has_dealbreaker {
                assert!(pair[0].alignment_score >= pair[1].alignment_score);
            }
        }
    }

    #[test]
    fn only_approved_candidates_appear() {
        let pool = vec![
            candidate(CandidateStatus::Approved, vec![position("healthcare", 1, 0)]),
            candidate(CandidateStatus::Pending, vec![position("healthcare", 1, 0)]),
            candidate(CandidateStatus::Denied, vec![position("healthcare", 1, 0)]),
            candidate(
                CandidateStatus::Eliminated,
                vec![position("healthcare", 1, 0)],
            ),
        ];
        let page = assemble(
            &prefs(&["healthcare", "climate", "economy", "housing"], &[]),
            &pool,
            &FeedFilters::default(),
            50,
            0,
        );
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].candidate_id, pool[0].id);
    }

    #[test]
    fn dealbreakers_sort_last_regardless_of_score() {
        // The dealbreaker candidate scores far higher, but still sorts last.
        let strong_but_extreme = candidate(
            CandidateStatus::Approved,
            vec![
                position("healthcare", 1, 0),
                position("climate", 2, 95),
                position("economy", 3, 0),
                position("housing", 4, 0),
            ],
        );
        let weak_but_moderate =
            candidate(CandidateStatus::Approved, vec![position("housing", 6, 10)]);
        let pool = vec![strong_but_extreme, weak_but_moderate];

        let page = assemble(
            &prefs(
                &["healthcare", "climate", "economy", "housing"],
                &["climate"],
            ),
            &pool,
            &FeedFilters::default(),
            50,
            0,
        );
        assert_eq!(page.total, 2);
        assert!(!page.items[0].has_dealbreaker);
        assert!(page.items[1].has_dealbreaker);
        assert!(page.items[1].alignment_score > page.items[0].alignment_score);
        assert_feed_order(&page);
    }

    #[test]
    fn equal_scores_tie_break_on_candidate_id() {
        let a = candidate(CandidateStatus::Approved, vec![position("healthcare", 1, 0)]);
        let b = candidate(CandidateStatus::Approved, vec![position("healthcare", 1, 0)]);
        let pool = vec![a, b];
        let expected_first = pool.iter().map(|c| c.id).min().unwrap();

        let page = assemble(
            &prefs(&["healthcare", "climate", "economy", "housing"], &[]),
            &pool,
            &FeedFilters::default(),
            50,
            0,
        );
        assert_eq!(page.items[0].candidate_id, expected_first);
    }

    #[test]
    fn min_alignment_filter_drops_low_scores() {
        let matching = candidate(
            CandidateStatus::Approved,
            vec![
                position("healthcare", 1, 0),
                position("climate", 2, 0),
                position("economy", 3, 0),
                position("housing", 4, 0),
            ],
        );
        let positionless = candidate(CandidateStatus::Approved, vec![]);
        let pool = vec![matching, positionless];

        let filters = FeedFilters {
            min_alignment: Some(40),
            ..Default::default()
        };
        let page = assemble(
            &prefs(&["healthcare", "climate", "economy", "housing"], &[]),
            &pool,
            &filters,
            50,
            0,
        );
        // The position-less candidate scores 30 and is dropped.
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].candidate_id, pool[0].id);
    }

    #[test]
    fn issue_filter_requires_nonempty_intersection() {
        let healthcare = candidate(CandidateStatus::Approved, vec![position("healthcare", 1, 0)]);
        let economy = candidate(CandidateStatus::Approved, vec![position("economy", 1, 0)]);
        let pool = vec![healthcare, economy];

        let filters = FeedFilters {
            issue_ids: Some(issues(&["healthcare"])),
            ..Default::default()
        };
        let page = assemble(
            &prefs(&["healthcare", "climate", "economy", "housing"], &[]),
            &pool,
            &filters,
            50,
            0,
        );
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].candidate_id, pool[0].id);
    }

    #[test]
    fn exclude_dealbreakers_drops_flagged_items() {
        let extreme = candidate(CandidateStatus::Approved, vec![position("climate", 1, -90)]);
        let moderate = candidate(CandidateStatus::Approved, vec![position("climate", 1, -10)]);
        let pool = vec![extreme, moderate];

        let filters = FeedFilters {
            exclude_dealbreakers: true,
            ..Default::default()
        };
        let page = assemble(
            &prefs(
                &["healthcare", "climate", "economy", "housing"],
                &["climate"],
            ),
            &pool,
            &filters,
            50,
            0,
        );
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].candidate_id, pool[1].id);
    }

    #[test]
    fn pagination_slices_after_the_full_sort() {
        // Distinct overlap counts give distinct scores.
        let mut pool = Vec::new();
        for issue_count in 1..=4 {
            let positions = ["healthcare", "climate", "economy", "housing"]
                .iter()
                .take(issue_count)
                .map(|issue| position(issue, 6, 0))
                .collect();
            pool.push(candidate(CandidateStatus::Approved, positions));
        }

        let voter = prefs(&["healthcare", "climate", "economy", "housing"], &[]);
        let full = assemble(&voter, &pool, &FeedFilters::default(), 50, 0);
        assert_eq!(full.total, 4);
        assert!(!full.has_more);
        assert_feed_order(&full);

        let first = assemble(&voter, &pool, &FeedFilters::default(), 2, 0);
        let second = assemble(&voter, &pool, &FeedFilters::default(), 2, 2);
        assert!(first.has_more);
        assert!(!second.has_more);
        assert_eq!(first.items, full.items[..2]);
        assert_eq!(second.items, full.items[2..]);
    }

    #[test]
    fn offset_past_the_end_is_empty_not_an_error() {
        let pool = vec![candidate(
            CandidateStatus::Approved,
            vec![position("healthcare", 1, 0)],
        )];
        let page = assemble(
            &prefs(&["healthcare", "climate", "economy", "housing"], &[]),
            &pool,
            &FeedFilters::default(),
            10,
            100,
        );
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
        assert!(!page.has_more);
    }

    #[test]
    fn missing_position_data_scores_low_but_stays_in() {
        // Degraded candidates are scored 30, not excluded.
        let positionless = candidate(CandidateStatus::Approved, vec![]);
        let pool = vec![positionless];
        let page = assemble(
            &prefs(&["healthcare", "climate", "economy", "housing"], &[]),
            &pool,
            &FeedFilters::default(),
            50,
            0,
        );
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].alignment_score, 30);
    }
}
