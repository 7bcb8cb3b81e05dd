use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{db::issue::IssueId, mongodb::Id};

/// One candidate entry in a voter's feed.
///
/// Derived per request from the voter's preferences and the candidate's
/// positions; never persisted and never shared between voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub candidate_id: Id,
    pub alignment_score: u8,
    pub matched_issues: BTreeSet<IssueId>,
    pub has_dealbreaker: bool,
}

/// A page of the assembled feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub total: u64,
    pub has_more: bool,
}

/// Optional narrowing filters applied before pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedFilters {
    /// Keep only candidates taking a position on at least one of these issues.
    pub issue_ids: Option<BTreeSet<IssueId>>,
    /// Keep only items scoring at least this much.
    pub min_alignment: Option<u8>,
    /// Drop items that trip one of the voter's dealbreakers.
    pub exclude_dealbreakers: bool,
}
