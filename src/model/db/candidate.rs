use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

use crate::model::{db::issue::IssueId, mongodb::Id};

/// States in the candidate lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateStatus {
    /// Submitted, awaiting admin review. Invisible to voters.
    Pending,
    /// Reviewed and admitted to the race. Visible in feeds and leaderboards.
    Approved,
    /// Rejected by admin review. Terminal.
    Denied,
    /// Fell below an endorsement cutoff. Terminal, set only by the
    /// elimination pass.
    Eliminated,
}

impl CandidateStatus {
    /// Is the transition from `self` to `to` legal?
    ///
    /// Pending candidates are approved or denied by admin action (outside
    /// this service); approved candidates can only be eliminated, and only
    /// by the cutoff pass. Everything else is rejected.
    pub fn can_transition_to(self, to: CandidateStatus) -> bool {
        matches!(
            (self, to),
            (CandidateStatus::Pending, CandidateStatus::Approved)
                | (CandidateStatus::Pending, CandidateStatus::Denied)
                | (CandidateStatus::Approved, CandidateStatus::Eliminated)
        )
    }
}

impl From<CandidateStatus> for Bson {
    fn from(status: CandidateStatus) -> Self {
        to_bson(&status).expect("Serialisation is infallible")
    }
}

/// A candidate's stance on a single issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePosition {
    pub issue_id: IssueId,
    /// Free-text statement of the position.
    pub position: String,
    /// 1 = most important to the candidate. Unique within one candidate.
    pub priority: u32,
    /// Self-described ideological placement on this issue,
    /// -100 (most progressive) to 100 (most conservative).
    pub spectrum_position: i8,
}

/// Why and when a candidate was eliminated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminationRecord {
    pub stage: u32,
    pub threshold: u64,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Core candidate data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateCore {
    /// The user who owns this candidate profile.
    pub user_id: Id,
    pub status: CandidateStatus,
    /// Authoritative live endorsement counter, moved only by the ledger.
    pub endorsement_count: u64,
    /// Derived by the trending job; may be stale between runs.
    pub trending_score: i64,
    /// Derived ranks; absent until the first recompute touches this candidate.
    pub endorsement_rank: Option<u32>,
    pub trending_rank: Option<u32>,
    /// Positions ordered by priority. May cover some or all issues.
    pub positions: Vec<CandidatePosition>,
    pub eliminated: Option<EliminationRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CandidateCore {
    /// A freshly submitted candidate with the given positions.
    pub fn new(user_id: Id, positions: Vec<CandidatePosition>) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            status: CandidateStatus::Pending,
            endorsement_count: 0,
            trending_score: 0,
            endorsement_rank: None,
            trending_rank: None,
            positions,
            eliminated: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A candidate without an ID, ready for DB insertion.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        use CandidateStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Denied));
        assert!(Approved.can_transition_to(Eliminated));
    }

    #[test]
    fn illegal_transitions() {
        use CandidateStatus::*;
        // Elimination is one-way and approved-only.
        assert!(!Eliminated.can_transition_to(Approved));
        assert!(!Pending.can_transition_to(Eliminated));
        assert!(!Denied.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Denied));
    }
}
