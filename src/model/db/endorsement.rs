use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core endorsement data, as stored in the database.
///
/// An endorsement is never physically deleted: revocation flips `is_active`
/// and the row stays behind as history. The unique partial index on
/// `(voter_id, candidate_id)` where `is_active == true` guarantees at most
/// one active endorsement per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndorsementCore {
    pub voter_id: Id,
    pub candidate_id: Id,
    pub is_active: bool,
    pub endorsed_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl EndorsementCore {
    /// A fresh, active endorsement.
    pub fn new(voter_id: Id, candidate_id: Id) -> Self {
        Self {
            voter_id,
            candidate_id,
            is_active: true,
            endorsed_at: Utc::now(),
            revoked_at: None,
        }
    }
}

/// An endorsement without an ID, ready for DB insertion.
pub type NewEndorsement = EndorsementCore;

/// An endorsement from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endorsement {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub endorsement: EndorsementCore,
}

impl Deref for Endorsement {
    type Target = EndorsementCore;

    fn deref(&self) -> &Self::Target {
        &self.endorsement
    }
}

impl DerefMut for Endorsement {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.endorsement
    }
}
