use mongodb::Client;
use rocket::{serde::json::Json, Route, State};

use crate::engine::ledger::EndorsementLedger;
use crate::error::Result;
use crate::events::EventBus;
use crate::model::{
    db::{
        candidate::Candidate,
        endorsement::{Endorsement, NewEndorsement},
    },
    mongodb::{Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![endorse, revoke, has_endorsed]
}

/// Construct the ledger from request-local collection guards.
fn ledger(
    client: &State<Client>,
    new_endorsements: Coll<NewEndorsement>,
    endorsements: Coll<Endorsement>,
    candidates: Coll<Candidate>,
    events: &State<EventBus>,
) -> EndorsementLedger {
    EndorsementLedger::new(
        client.inner().clone(),
        new_endorsements,
        endorsements,
        candidates,
        events.inner().clone(),
    )
}

/// Endorse a candidate. 409 if this voter already endorsed them.
#[post("/candidates/<candidate_id>/endorsements?<voter_id>")]
async fn endorse(
    candidate_id: Id,
    voter_id: Id,
    client: &State<Client>,
    new_endorsements: Coll<NewEndorsement>,
    endorsements: Coll<Endorsement>,
    candidates: Coll<Candidate>,
    events: &State<EventBus>,
) -> Result<()> {
    ledger(client, new_endorsements, endorsements, candidates, events)
        .endorse(voter_id, candidate_id)
        .await
}

/// Revoke an endorsement. Succeeds even if there was nothing to revoke.
#[delete("/candidates/<candidate_id>/endorsements?<voter_id>")]
async fn revoke(
    candidate_id: Id,
    voter_id: Id,
    client: &State<Client>,
    new_endorsements: Coll<NewEndorsement>,
    endorsements: Coll<Endorsement>,
    candidates: Coll<Candidate>,
    events: &State<EventBus>,
) -> Result<()> {
    ledger(client, new_endorsements, endorsements, candidates, events)
        .revoke(voter_id, candidate_id)
        .await
}

/// Does this voter currently endorse this candidate?
#[get("/candidates/<candidate_id>/endorsements?<voter_id>")]
async fn has_endorsed(
    candidate_id: Id,
    voter_id: Id,
    client: &State<Client>,
    new_endorsements: Coll<NewEndorsement>,
    endorsements: Coll<Endorsement>,
    candidates: Coll<Candidate>,
    events: &State<EventBus>,
) -> Result<Json<bool>> {
    let active = ledger(client, new_endorsements, endorsements, candidates, events)
        .has_active(voter_id, candidate_id)
        .await?;
    Ok(Json(active))
}
