use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::db::{issue::IssueId, preferences::VoterPreferences};
use crate::model::mongodb::Id;

/// Request body for saving a voter's preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesRequest {
    pub selected_issues: BTreeSet<IssueId>,
    #[serde(default)]
    pub dealbreakers: BTreeSet<IssueId>,
}

impl PreferencesRequest {
    /// Bind the request to a voter, producing the DB representation.
    /// The result still needs `validate()` before persistence.
    pub fn into_preferences(self, voter_id: Id) -> VoterPreferences {
        VoterPreferences::new(voter_id, self.selected_issues, self.dealbreakers)
    }
}

/// API-friendly preferences representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesResponse {
    pub voter_id: Id,
    pub selected_issues: BTreeSet<IssueId>,
    pub dealbreakers: BTreeSet<IssueId>,
}

impl From<VoterPreferences> for PreferencesResponse {
    fn from(prefs: VoterPreferences) -> Self {
        Self {
            voter_id: prefs.voter_id,
            selected_issues: prefs.selected_issues,
            dealbreakers: prefs.dealbreakers,
        }
    }
}
