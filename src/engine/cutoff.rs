//! Endorsement-cutoff elimination.
//!
//! Runs when the race moves between stages, not on a timer. Approved
//! candidates whose live endorsement count is strictly below the first
//! configured cutoff threshold are transitioned to `Eliminated`, one-way.
//! Re-running the pass with the same threshold is a no-op for candidates
//! it already eliminated, so a partially-failed run can simply be retried.

use chrono::Utc;
use mongodb::bson::{doc, to_bson};
use rocket::futures::TryStreamExt;
use serde::Deserialize;

use crate::error::Result;
use crate::events::{DomainEvent, EventBus};
use crate::model::{
    db::candidate::{Candidate, CandidateStatus, EliminationRecord},
    mongodb::{Coll, Id},
};

/// One stage's elimination threshold from the party configuration.
/// Stage 1 comes first; later stages are reserved for future phases.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EndorsementCutoff {
    pub stage: u32,
    pub threshold: u64,
}

/// Which candidates fall below the cutoff? Strict comparison: a count
/// equal to the threshold survives.
pub fn select_eliminations(pool: &[(Id, u64)], threshold: u64) -> Vec<Id> {
    pool.iter()
        .filter(|(_, count)| *count < threshold)
        .map(|(id, _)| *id)
        .collect()
}

/// Apply the first-stage cutoff to the approved candidate pool.
/// Returns the number of candidates eliminated by this run.
///
/// Per-candidate write failures are logged and skipped; the run only fails
/// outright if the pool itself cannot be read.
pub async fn run_cutoff_elimination(
    candidates: &Coll<Candidate>,
    events: &EventBus,
    cutoffs: &[EndorsementCutoff],
) -> Result<u64> {
    let Some(cutoff) = cutoffs.first() else {
        warn!("No endorsement cutoffs configured; elimination pass skipped");
        return Ok(0);
    };
    info!(
        "Running cutoff elimination: stage {}, threshold {}",
        cutoff.stage, cutoff.threshold
    );

    // The pool scan is the only fatal failure point.
    let filter = doc! {
        "status": CandidateStatus::Approved,
        "endorsement_count": { "$lt": cutoff.threshold as i64 },
    };
    let below: Vec<Candidate> = candidates.find(filter, None).await?.try_collect().await?;

    let mut eliminated = 0u64;
    for candidate in below {
        // The scan already restricts to approved candidates; this is the
        // state machine speaking for itself.
        if !candidate
            .status
            .can_transition_to(CandidateStatus::Eliminated)
        {
            warn!(
                "Candidate {} is {:?}, not eligible for elimination; skipped",
                candidate.id, candidate.status
            );
            continue;
        }
        match eliminate(candidates, candidate.id, cutoff).await {
            Ok(true) => {
                eliminated += 1;
                events.publish(DomainEvent::CandidateEliminated {
                    candidate_id: candidate.id,
                    stage: cutoff.stage,
                    threshold: cutoff.threshold,
                });
            }
            // Lost a race with a concurrent run, or the count moved above
            // the threshold since the scan. Either way: nothing to do.
            Ok(false) => {
                debug!("Candidate {} no longer qualifies; skipped", candidate.id);
            }
            Err(err) => {
                error!("Failed to eliminate candidate {}: {err}", candidate.id);
            }
        }
    }

    info!("Cutoff elimination complete: {eliminated} candidates eliminated");
    Ok(eliminated)
}

/// Transition a single candidate to `Eliminated`.
///
/// The filter re-checks status and count, so the update is the legality
/// check: anything other than an under-threshold approved candidate is
/// left untouched and reported as `Ok(false)`.
async fn eliminate(
    candidates: &Coll<Candidate>,
    candidate_id: Id,
    cutoff: &EndorsementCutoff,
) -> Result<bool> {
    let record = EliminationRecord {
        stage: cutoff.stage,
        threshold: cutoff.threshold,
        reason: format!(
            "endorsement count below stage {} cutoff of {}",
            cutoff.stage, cutoff.threshold
        ),
        at: Utc::now(),
    };
    let filter = doc! {
        "_id": candidate_id,
        "status": CandidateStatus::Approved,
        "endorsement_count": { "$lt": cutoff.threshold as i64 },
    };
    let update = doc! {
        "$set": {
            "status": CandidateStatus::Eliminated,
            "eliminated": to_bson(&record).expect("Serialisation is infallible"),
            "updated_at": to_bson(&record.at).expect("Serialisation is infallible"),
        }
    };
    let result = candidates.update_one(filter, update, None).await?;
    Ok(result.modified_count == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_example_threshold_1000() {
        // Counts [1200, 900, 1000, 500]: exactly 900 and 500 fall.
        let pool: Vec<(Id, u64)> = [1200, 900, 1000, 500]
            .into_iter()
            .map(|count| (Id::new(), count))
            .collect();

        let eliminated = select_eliminations(&pool, 1000);
        assert_eq!(eliminated, vec![pool[1].0, pool[3].0]);
    }

    #[test]
    fn threshold_is_an_exclusive_lower_bound() {
        let at_threshold = vec![(Id::new(), 1000)];
        assert!(select_eliminations(&at_threshold, 1000).is_empty());

        let just_below = vec![(Id::new(), 999)];
        assert_eq!(select_eliminations(&just_below, 1000).len(), 1);
    }

    #[test]
    fn selection_is_idempotent() {
        // A second pass over the survivors eliminates nobody new.
        let pool: Vec<(Id, u64)> = [1200, 900, 1000, 500]
            .into_iter()
            .map(|count| (Id::new(), count))
            .collect();
        let first = select_eliminations(&pool, 1000);

        let survivors: Vec<(Id, u64)> = pool
            .iter()
            .filter(|(id, _)| !first.contains(id))
            .cloned()
            .collect();
        assert!(select_eliminations(&survivors, 1000).is_empty());
    }

    #[test]
    fn zero_threshold_eliminates_nobody() {
        let pool = vec![(Id::new(), 0)];
        assert!(select_eliminations(&pool, 0).is_empty());
    }
}
