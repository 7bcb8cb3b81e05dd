use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{db::issue::IssueId, mongodb::Id};

/// Allowed cardinality of `selected_issues`.
pub const MIN_SELECTED_ISSUES: usize = 4;
pub const MAX_SELECTED_ISSUES: usize = 7;
/// Allowed cardinality of `dealbreakers`.
pub const MAX_DEALBREAKERS: usize = 3;

/// A voter's issue preferences, keyed by voter ID.
///
/// Mutated only by the voter themselves; batch jobs never write here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterPreferences {
    #[serde(rename = "_id")]
    pub voter_id: Id,
    pub selected_issues: BTreeSet<IssueId>,
    pub dealbreakers: BTreeSet<IssueId>,
    pub updated_at: DateTime<Utc>,
}

impl VoterPreferences {
    pub fn new(
        voter_id: Id,
        selected_issues: BTreeSet<IssueId>,
        dealbreakers: BTreeSet<IssueId>,
    ) -> Self {
        Self {
            voter_id,
            selected_issues,
            dealbreakers,
            updated_at: Utc::now(),
        }
    }

    /// Preferences for a voter who has never saved any.
    /// Scoring treats the empty issue set as neutral.
    pub fn empty(voter_id: Id) -> Self {
        Self::new(voter_id, BTreeSet::new(), BTreeSet::new())
    }

    /// Validate the cardinality invariants. Called before every write;
    /// out-of-range preferences are rejected, never persisted.
    pub fn validate(&self) -> Result<()> {
        let selected = self.selected_issues.len();
        if !(MIN_SELECTED_ISSUES..=MAX_SELECTED_ISSUES).contains(&selected) {
            return Err(Error::InvalidPreferenceCardinality(format!(
                "expected {MIN_SELECTED_ISSUES}-{MAX_SELECTED_ISSUES} selected issues, got {selected}"
            )));
        }
        let dealbreakers = self.dealbreakers.len();
        if dealbreakers > MAX_DEALBREAKERS {
            return Err(Error::InvalidPreferenceCardinality(format!(
                "expected at most {MAX_DEALBREAKERS} dealbreakers, got {dealbreakers}"
            )));
        }
        Ok(())
    }
}
