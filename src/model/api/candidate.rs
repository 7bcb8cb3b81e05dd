use serde::{Deserialize, Serialize};

use crate::model::{
    db::candidate::{Candidate, CandidateStatus},
    mongodb::Id,
};

/// API-friendly candidate representation for leaderboard views.
/// Exposes counters and ranks, not positions or ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: Id,
    pub status: CandidateStatus,
    pub endorsement_count: u64,
    pub trending_score: i64,
    pub endorsement_rank: Option<u32>,
    pub trending_rank: Option<u32>,
}

impl From<Candidate> for CandidateSummary {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            status: candidate.candidate.status,
            endorsement_count: candidate.candidate.endorsement_count,
            trending_score: candidate.candidate.trending_score,
            endorsement_rank: candidate.candidate.endorsement_rank,
            trending_rank: candidate.candidate.trending_rank,
        }
    }
}
