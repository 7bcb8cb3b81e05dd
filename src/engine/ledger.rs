//! The endorsement ledger.
//!
//! Maintains the set of active voter-to-candidate endorsements and the
//! authoritative `endorsement_count` on each candidate. The record and the
//! counter always move together inside one client-session transaction, and
//! the counter itself only ever moves by `$inc`, never by read-modify-write
//! in application code.

use chrono::Utc;
use mongodb::{
    bson::{doc, to_bson, Document},
    Client,
};

use crate::error::{Error, Result};
use crate::events::{DomainEvent, EventBus};
use crate::model::{
    db::{
        candidate::{Candidate, CandidateStatus},
        endorsement::{Endorsement, NewEndorsement},
    },
    mongodb::{write_error_code, Coll, Id, DUPLICATE_KEY},
};

/// Ledger operations over the endorsement and candidate collections.
pub struct EndorsementLedger {
    client: Client,
    endorsements: Coll<NewEndorsement>,
    active: Coll<Endorsement>,
    candidates: Coll<Candidate>,
    events: EventBus,
}

impl EndorsementLedger {
    pub fn new(
        client: Client,
        endorsements: Coll<NewEndorsement>,
        active: Coll<Endorsement>,
        candidates: Coll<Candidate>,
        events: EventBus,
    ) -> Self {
        Self {
            client,
            endorsements,
            active,
            candidates,
            events,
        }
    }

    /// Record a voter's endorsement of a candidate.
    ///
    /// Fails with [`Error::AlreadyEndorsed`] if the pair already has an
    /// active endorsement. The uniqueness race between concurrent calls is
    /// arbitrated by the partial unique index, not by a read-then-write
    /// check in here.
    pub async fn endorse(&self, voter_id: Id, candidate_id: Id) -> Result<()> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let endorsement = NewEndorsement::new(voter_id, candidate_id);
        let inserted = self
            .endorsements
            .insert_one_with_session(&endorsement, None, &mut session)
            .await;
        if let Err(ref err) = inserted {
            if let Some(conflict) = duplicate_conflict(write_error_code(err), voter_id, candidate_id)
            {
                session.abort_transaction().await?;
                return Err(conflict);
            }
        }
        inserted?;

        let result = self
            .candidates
            .update_one_with_session(
                increment_filter(candidate_id),
                increment_update(),
                None,
                &mut session,
            )
            .await?;
        if let Err(err) = increment_outcome(result.matched_count, candidate_id) {
            session.abort_transaction().await?;
            return Err(err);
        }

        session.commit_transaction().await?;

        self.events.publish(DomainEvent::EndorsementChanged {
            candidate_id,
            voter_id,
            active: true,
        });
        info!("Voter {voter_id} endorsed candidate {candidate_id}");
        Ok(())
    }

    /// Revoke a voter's endorsement of a candidate.
    ///
    /// A revoke with no active endorsement is a successful no-op. The
    /// endorsement row is kept (deactivated) as history. If the decrement
    /// would drive the counter negative the whole operation is refused as a
    /// [`Error::CounterUnderflow`] rather than corrupting state.
    pub async fn revoke(&self, voter_id: Id, candidate_id: Id) -> Result<()> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let filter = doc! {
            "voter_id": voter_id,
            "candidate_id": candidate_id,
            "is_active": true,
        };
        let update = doc! {
            "$set": {
                "is_active": false,
                "revoked_at": to_bson(&Utc::now()).expect("Serialisation is infallible"),
            }
        };
        let deactivated = self
            .active
            .find_one_and_update_with_session(filter, update, None, &mut session)
            .await?;
        if deactivated.is_none() {
            session.abort_transaction().await?;
            return Ok(());
        }

        let result = self
            .candidates
            .update_one_with_session(
                decrement_filter(candidate_id),
                decrement_update(),
                None,
                &mut session,
            )
            .await?;
        if let Err(err) = decrement_outcome(result.matched_count, candidate_id) {
            // An active endorsement existed but the counter was already
            // zero (or the candidate vanished): data-integrity fault.
            session.abort_transaction().await?;
            error!("Refusing endorsement revoke that would underflow candidate {candidate_id}");
            return Err(err);
        }

        session.commit_transaction().await?;

        self.events.publish(DomainEvent::EndorsementChanged {
            candidate_id,
            voter_id,
            active: false,
        });
        info!("Voter {voter_id} revoked endorsement of candidate {candidate_id}");
        Ok(())
    }

    /// Does the voter currently have an active endorsement of the candidate?
    ///
    /// Served by the same index that enforces uniqueness, so a completed
    /// `endorse` is immediately visible to this check.
    pub async fn has_active(&self, voter_id: Id, candidate_id: Id) -> Result<bool> {
        let filter = doc! {
            "voter_id": voter_id,
            "candidate_id": candidate_id,
            "is_active": true,
        };
        let endorsement = self.active.find_one(filter, None).await?;
        Ok(endorsement.is_some())
    }
}

/// Interpret a failed endorsement insert. A duplicate key on the
/// active-pair index means this voter already endorses this candidate;
/// anything else is not the ledger's to name.
fn duplicate_conflict(code: Option<i32>, voter_id: Id, candidate_id: Id) -> Option<Error> {
    (code == Some(DUPLICATE_KEY)).then(|| Error::AlreadyEndorsed {
        voter_id,
        candidate_id,
    })
}

/// Only approved candidates collect endorsements.
fn increment_filter(candidate_id: Id) -> Document {
    doc! {
        "_id": candidate_id,
        "status": CandidateStatus::Approved,
    }
}

fn increment_update() -> Document {
    doc! {
        "$inc": { "endorsement_count": 1 },
        "$set": { "updated_at": to_bson(&Utc::now()).expect("Serialisation is infallible") },
    }
}

fn increment_outcome(matched_count: u64, candidate_id: Id) -> Result<()> {
    if matched_count == 1 {
        Ok(())
    } else {
        Err(Error::not_found(format!(
            "Approved candidate with ID '{candidate_id}'"
        )))
    }
}

/// The `$gt` guard keeps the counter from going negative: a zero counter
/// simply doesn't match, and the revoke is refused.
fn decrement_filter(candidate_id: Id) -> Document {
    doc! {
        "_id": candidate_id,
        "endorsement_count": { "$gt": 0 },
    }
}

fn decrement_update() -> Document {
    doc! {
        "$inc": { "endorsement_count": -1 },
        "$set": { "updated_at": to_bson(&Utc::now()).expect("Serialisation is infallible") },
    }
}

fn decrement_outcome(matched_count: u64, candidate_id: Id) -> Result<()> {
    if matched_count == 1 {
        Ok(())
    } else {
        Err(Error::CounterUnderflow(candidate_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_means_already_endorsed() {
        let voter = Id::new();
        let candidate = Id::new();
        let conflict = duplicate_conflict(Some(DUPLICATE_KEY), voter, candidate);
        assert!(matches!(
            conflict,
            Some(Error::AlreadyEndorsed {
                voter_id,
                candidate_id,
            }) if voter_id == voter && candidate_id == candidate
        ));
    }

    #[test]
    fn other_write_errors_are_not_endorsement_conflicts() {
        // 121 is a document validation failure.
        assert!(duplicate_conflict(Some(121), Id::new(), Id::new()).is_none());
        assert!(duplicate_conflict(None, Id::new(), Id::new()).is_none());
    }

    #[test]
    fn endorse_and_revoke_are_count_neutral() {
        let inc = increment_update()
            .get_document("$inc")
            .unwrap()
            .get_i32("endorsement_count")
            .unwrap();
        let dec = decrement_update()
            .get_document("$inc")
            .unwrap()
            .get_i32("endorsement_count")
            .unwrap();
        assert_eq!(inc, 1);
        assert_eq!(inc + dec, 0);
    }

    #[test]
    fn decrement_refuses_underflow() {
        let candidate = Id::new();
        let guard = decrement_filter(candidate)
            .get_document("endorsement_count")
            .unwrap()
            .get_i32("$gt")
            .unwrap();
        assert_eq!(guard, 0);
        assert!(matches!(
            decrement_outcome(0, candidate),
            Err(Error::CounterUnderflow(id)) if id == candidate
        ));
        assert!(decrement_outcome(1, candidate).is_ok());
    }

    #[test]
    fn increment_targets_approved_candidates_only() {
        let candidate = Id::new();
        let filter = increment_filter(candidate);
        assert_eq!(filter.get_str("status").unwrap(), "Approved");
        assert!(matches!(
            increment_outcome(0, candidate),
            Err(Error::NotFound(_))
        ));
        assert!(increment_outcome(1, candidate).is_ok());
    }
}
