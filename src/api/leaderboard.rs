use mongodb::{
    bson::{doc, Bson, Document},
    options::FindOptions,
};
use rocket::{futures::TryStreamExt, serde::json::Json, FromFormField, Route};

use crate::error::Result;
use crate::model::{
    api::{
        candidate::CandidateSummary,
        pagination::{Paginated, PaginationRequest},
    },
    db::candidate::{Candidate, CandidateStatus},
    mongodb::Coll,
};

pub fn routes() -> Vec<Route> {
    routes![leaderboard]
}

/// Which ranking to order the leaderboard by.
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromFormField)]
pub enum LeaderboardSort {
    Trending,
    Endorsements,
}

impl LeaderboardSort {
    /// The persisted rank field backing this ordering.
    fn rank_field(self) -> &'static str {
        match self {
            Self::Trending => "trending_rank",
            Self::Endorsements => "endorsement_rank",
        }
    }
}

/// The candidate leaderboard, ordered by the last-computed ranks.
///
/// Reads the ranks the trending job persisted; candidates not yet ranked
/// (or no longer approved) don't appear. Ranks may be up to a day stale
/// between job runs, which is acceptable for discovery.
#[get("/leaderboard?<by>&<pagination..>")]
async fn leaderboard(
    by: Option<LeaderboardSort>,
    pagination: PaginationRequest,
    candidates: Coll<Candidate>,
) -> Result<Json<Paginated<CandidateSummary>>> {
    let by = by.unwrap_or(LeaderboardSort::Trending);
    let mut filter: Document = doc! { "status": CandidateStatus::Approved };
    filter.insert(by.rank_field(), doc! { "$ne": Bson::Null });

    let mut sort = Document::new();
    sort.insert(by.rank_field(), 1);
    let options = FindOptions::builder()
        .sort(sort)
        .skip(u64::from(pagination.skip()))
        .limit(i64::from(pagination.page_size()))
        .build();

    let page: Vec<CandidateSummary> = candidates
        .find(filter.clone(), options)
        .await?
        .map_ok(CandidateSummary::from)
        .try_collect()
        .await?;
    let total = candidates.count_documents(filter, None).await?;

    Ok(Json(pagination.to_paginated(total, page)))
}
