//! Trending score recomputation.
//!
//! Runs daily: for every approved candidate, sums the rolling window of
//! profile views and endorsements received, derives a trending score, and
//! re-ranks the whole approved pool. Each candidate's score and rank are
//! written in one `$set`, so a crash mid-run leaves stale rows, never a
//! candidate with a rank but no score.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Timelike, Utc};
use mongodb::{bson::doc, Database};
use rocket::{
    fairing::{Fairing, Info, Kind},
    futures::TryStreamExt,
    Build, Rocket,
};

use crate::error::Result;
use crate::model::{
    db::{
        candidate::{Candidate, CandidateStatus},
        metrics::ProfileMetricsDay,
    },
    mongodb::{Coll, Id},
};
use crate::scheduled_task::ScheduledTask;
use crate::Config;

/// Weight of a profile view in the trending score.
const VIEW_WEIGHT: i64 = 1;
/// Weight of an endorsement received in the trending score.
const ENDORSEMENT_WEIGHT: i64 = 5;

/// What one recompute run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct RecomputeOutcome {
    /// Candidates scored and ranked.
    pub ranked: u64,
    /// Candidates skipped because their metrics or write failed.
    pub skipped: u64,
}

/// Combine a window's engagement totals into a trending score.
pub fn trending_score(views: u64, endorsements: u64) -> i64 {
    views as i64 * VIEW_WEIGHT + endorsements as i64 * ENDORSEMENT_WEIGHT
}

/// First day of the rolling window: `today - window_days`, inclusive.
pub fn window_start(today: NaiveDate, window_days: u32) -> NaiveDate {
    today - ChronoDuration::days(i64::from(window_days))
}

/// Assign 1-based ranks by key descending, candidate ID ascending on ties.
/// Returns `(candidate, rank)` pairs in rank order.
pub fn assign_ranks(mut scored: Vec<(Id, i64)>) -> Vec<(Id, u32)> {
    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scored
        .into_iter()
        .zip(1u32..)
        .map(|((id, _), rank)| (id, rank))
        .collect()
}

/// Recompute trending scores and both leaderboard rankings.
///
/// Safely interruptible: every write is per-candidate and the next run
/// recomputes everything from the metrics, so a crashed run is repaired by
/// simply running again. Per-candidate failures are logged and skipped; the
/// run only fails outright if the candidate pool cannot be read.
pub async fn run_trending_recompute(
    candidates: &Coll<Candidate>,
    metrics: &Coll<ProfileMetricsDay>,
    window_days: u32,
) -> Result<RecomputeOutcome> {
    let today = Utc::now().date_naive();
    let start = window_start(today, window_days);
    info!("Recomputing trending scores over window {start} to {today}");

    let filter = doc! { "status": CandidateStatus::Approved };
    let pool: Vec<Candidate> = candidates.find(filter, None).await?.try_collect().await?;

    let mut outcome = RecomputeOutcome::default();
    let mut trending: Vec<(Id, i64)> = Vec::with_capacity(pool.len());
    let mut by_endorsements: Vec<(Id, i64)> = Vec::with_capacity(pool.len());

    for candidate in &pool {
        match window_totals(metrics, candidate.id, start, today).await {
            Ok((views, endorsements)) => {
                trending.push((candidate.id, trending_score(views, endorsements)));
                by_endorsements.push((candidate.id, candidate.endorsement_count as i64));
            }
            Err(err) => {
                error!("Failed to read metrics for candidate {}: {err}", candidate.id);
                outcome.skipped += 1;
            }
        }
    }

    let scores: std::collections::HashMap<Id, i64> = trending.iter().cloned().collect();
    let trending_ranks = assign_ranks(trending);
    let endorsement_ranks: std::collections::HashMap<Id, u32> =
        assign_ranks(by_endorsements).into_iter().collect();

    for (candidate_id, trending_rank) in trending_ranks {
        let update = doc! {
            "$set": {
                "trending_score": scores[&candidate_id],
                "trending_rank": trending_rank,
                "endorsement_rank": endorsement_ranks[&candidate_id],
            }
        };
        // Re-check status so a candidate eliminated mid-run doesn't get
        // ranked back into the leaderboard.
        let filter = doc! {
            "_id": candidate_id,
            "status": CandidateStatus::Approved,
        };
        match candidates.update_one(filter, update, None).await {
            Ok(result) if result.matched_count == 1 => outcome.ranked += 1,
            Ok(_) => {
                debug!("Candidate {candidate_id} left the pool mid-run; skipped");
                outcome.skipped += 1;
            }
            Err(err) => {
                error!("Failed to write ranking for candidate {candidate_id}: {err}");
                outcome.skipped += 1;
            }
        }
    }

    info!(
        "Trending recompute complete: {} ranked, {} skipped",
        outcome.ranked, outcome.skipped
    );
    Ok(outcome)
}

/// Sum the candidate's views and endorsements received over the window.
/// Missing days simply contribute nothing.
async fn window_totals(
    metrics: &Coll<ProfileMetricsDay>,
    candidate_id: Id,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(u64, u64)> {
    let filter = doc! {
        "candidate_id": candidate_id,
        // NaiveDate serialises as ISO `YYYY-MM-DD`, so string range
        // comparison matches date order.
        "date": { "$gte": start.to_string(), "$lte": end.to_string() },
    };
    let days: Vec<ProfileMetricsDay> = metrics.find(filter, None).await?.try_collect().await?;
    let views = days.iter().map(|d| d.profile_views).sum();
    let endorsements = days.iter().map(|d| d.endorsements_received).sum();
    Ok((views, endorsements))
}

/// When should the next daily run happen?
/// Today at `hour_utc` if that's still ahead, otherwise tomorrow.
pub fn next_run_at(now: DateTime<Utc>, hour_utc: u32) -> DateTime<Utc> {
    let today_run = now
        .with_hour(hour_utc)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .expect("valid schedule hour");
    if today_run > now {
        today_run
    } else {
        today_run + ChronoDuration::days(1)
    }
}

/// A fairing that runs the trending recompute on a daily schedule.
/// Depends on the database and config fairings having run first.
pub struct TrendingSchedulerFairing;

#[rocket::async_trait]
impl Fairing for TrendingSchedulerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Trending Scheduler",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let Some(db) = rocket.state::<Database>().cloned() else {
            error!("Database was not available when scheduling the trending job");
            return Err(rocket);
        };
        let Some(config) = rocket.state::<Config>() else {
            error!("Config was not available when scheduling the trending job");
            return Err(rocket);
        };
        let window_days = config.trending_window_days();
        let hour_utc = config.trending_hour_utc();

        rocket::tokio::spawn(async move {
            loop {
                let run_at = next_run_at(Utc::now(), hour_utc);
                info!("Next trending recompute scheduled for {run_at}");
                let candidates = Coll::<Candidate>::from_db(&db);
                let metrics = Coll::<ProfileMetricsDay>::from_db(&db);
                let task = ScheduledTask::new(
                    async move { run_trending_recompute(&candidates, &metrics, window_days).await },
                    run_at,
                );
                match task.await {
                    Ok(Ok(_)) => {}
                    Ok(Err(err)) => {
                        // The next scheduled run is the retry.
                        error!("Trending recompute failed: {err}");
                    }
                    Err(err) => {
                        error!("Trending recompute panicked or was aborted: {err}");
                    }
                }
            }
        });

        info!("Daily trending recompute scheduled (hour {hour_utc} UTC)");
        Ok(rocket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    #[test]
    fn score_weights_views_and_endorsements() {
        assert_eq!(trending_score(0, 0), 0);
        assert_eq!(trending_score(10, 0), 10);
        assert_eq!(trending_score(0, 10), 50);
        assert_eq!(trending_score(100, 20), 200);
    }

    #[test]
    fn window_start_is_inclusive_days_back() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert_eq!(
            window_start(today, 7),
            NaiveDate::from_ymd_opt(2026, 8, 22).unwrap()
        );
    }

    #[test]
    fn ranks_sort_by_score_desc() {
        let a = Id::new();
        let b = Id::new();
        let c = Id::new();
        let ranks = assign_ranks(vec![(a, 10), (b, 50), (c, 30)]);
        assert_eq!(ranks, vec![(b, 1), (c, 2), (a, 3)]);
    }

    #[test]
    fn rank_ties_break_on_candidate_id() {
        let mut ids = vec![Id::new(), Id::new()];
        ids.sort();
        let ranks = assign_ranks(vec![(ids[1], 25), (ids[0], 25)]);
        assert_eq!(ranks, vec![(ids[0], 1), (ids[1], 2)]);
    }

    #[test]
    fn next_run_today_if_hour_ahead() {
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 1, 30, 0).unwrap();
        let run_at = next_run_at(now, 3);
        assert_eq!(run_at, Utc.with_ymd_and_hms(2026, 8, 29, 3, 0, 0).unwrap());
    }

    #[test]
    fn next_run_tomorrow_if_hour_passed() {
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 3, 0, 1).unwrap();
        let run_at = next_run_at(now, 3);
        assert_eq!(run_at, Utc.with_ymd_and_hms(2026, 8, 30, 3, 0, 0).unwrap());
    }
}
