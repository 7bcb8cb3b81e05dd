//! Scheduler-facing job entry points.
//!
//! The external job scheduler calls these on stage-change events and for
//! manual reruns; the daily trending fairing uses the same recompute entry
//! point internally, so both paths share one implementation.

use rocket::{serde::json::Json, Route, State};
use serde::Serialize;

use crate::config::Config;
use crate::engine::{
    cutoff::run_cutoff_elimination,
    trending::{run_trending_recompute, RecomputeOutcome},
};
use crate::error::Result;
use crate::events::EventBus;
use crate::model::{
    db::{candidate::Candidate, metrics::ProfileMetricsDay},
    mongodb::Coll,
};

pub fn routes() -> Vec<Route> {
    routes![stage_transition, trending_run]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EliminationSummary {
    pub eliminated: u64,
}

/// Stage-transition hook: apply the configured first-stage endorsement
/// cutoff. Safe to retry; already-eliminated candidates are skipped.
#[post("/stages/transition")]
async fn stage_transition(
    candidates: Coll<Candidate>,
    events: &State<EventBus>,
    config: &State<Config>,
) -> Result<Json<EliminationSummary>> {
    let eliminated =
        run_cutoff_elimination(&candidates, events, config.endorsement_cutoffs()).await?;
    Ok(Json(EliminationSummary { eliminated }))
}

/// Manual trigger for the trending recompute; the daily schedule calls the
/// same entry point.
#[post("/jobs/trending/run")]
async fn trending_run(
    candidates: Coll<Candidate>,
    metrics: Coll<ProfileMetricsDay>,
    config: &State<Config>,
) -> Result<Json<RecomputeOutcome>> {
    let outcome =
        run_trending_recompute(&candidates, &metrics, config.trending_window_days()).await?;
    Ok(Json(outcome))
}
