use mongodb::error::Error as DbError;
use rocket::{http::Status, response::Responder};
use thiserror::Error;

use crate::model::mongodb::Id;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transient store failure; callers retry with backoff.
    #[error(transparent)]
    Db(#[from] DbError),
    /// The (voter, candidate) pair already has an active endorsement.
    #[error("Voter {voter_id} has already endorsed candidate {candidate_id}")]
    AlreadyEndorsed { voter_id: Id, candidate_id: Id },
    /// A revoke would drive the endorsement counter negative.
    /// Data-integrity fault: refused, never applied.
    #[error("Endorsement counter underflow for candidate {0}")]
    CounterUnderflow(Id),
    /// Voter preferences outside the allowed cardinality ranges.
    #[error("Invalid preference cardinality: {0}")]
    InvalidPreferenceCardinality(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::Status(Status::BadRequest, msg.into())
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = match self {
            Self::AlreadyEndorsed { .. } => Status::Conflict,
            Self::InvalidPreferenceCardinality(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::Db(_) | Self::CounterUnderflow(_) => Status::InternalServerError,
            Self::Status(status, _) => status,
        };
        match status.class() {
            rocket::http::StatusClass::ServerError => error!("{self}"),
            _ => warn!("{self}"),
        }
        Err(status)
    }
}
