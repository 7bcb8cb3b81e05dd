use std::collections::BTreeSet;

use mongodb::bson::doc;
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};

use crate::config::Config;
use crate::engine::feed::assemble;
use crate::error::Result;
use crate::model::{
    api::feed::{FeedFilters, FeedPage},
    db::{
        candidate::{Candidate, CandidateStatus},
        issue::IssueId,
        preferences::VoterPreferences,
    },
    mongodb::{Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![get_feed]
}

/// Assemble one voter's candidate feed.
///
/// Identity verification happens upstream; the voter is named explicitly.
/// This is a pure read path: nothing here mutates counters or ranks.
#[get("/feed?<voter_id>&<limit>&<offset>&<issues>&<min_alignment>&<exclude_dealbreakers>")]
#[allow(clippy::too_many_arguments)]
async fn get_feed(
    voter_id: Id,
    limit: Option<u32>,
    offset: Option<u32>,
    issues: Option<Vec<IssueId>>,
    min_alignment: Option<u8>,
    exclude_dealbreakers: Option<bool>,
    preferences: Coll<VoterPreferences>,
    candidates: Coll<Candidate>,
    config: &State<Config>,
) -> Result<Json<FeedPage>> {
    // A voter who never saved preferences gets the neutral feed.
    let prefs = preferences
        .find_one(voter_id.as_doc(), None)
        .await?
        .unwrap_or_else(|| VoterPreferences::empty(voter_id));

    // Indexed equality query: only approved candidates are ever fetched.
    // Eliminated candidates drop out of the feed on the very next read.
    let filter = doc! { "status": CandidateStatus::Approved };
    let pool: Vec<Candidate> = candidates.find(filter, None).await?.try_collect().await?;

    let filters = FeedFilters {
        issue_ids: issues.map(|list| list.into_iter().collect::<BTreeSet<_>>()),
        min_alignment,
        exclude_dealbreakers: exclude_dealbreakers.unwrap_or(false),
    };
    let limit = limit
        .unwrap_or_else(|| config.feed_default_limit())
        .min(config.feed_max_limit());
    let offset = offset.unwrap_or(0);

    let page = assemble(&prefs, &pool, &filters, limit as usize, offset as usize);
    Ok(Json(page))
}
