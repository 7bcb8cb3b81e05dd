use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};
use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::model::db::{
    candidate::{Candidate, NewCandidate},
    endorsement::{Endorsement, NewEndorsement},
    issue::Issue,
    metrics::ProfileMetricsDay,
    preferences::VoterPreferences,
};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `derive(Clone)` would require `T: Clone`, which we don't need.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Get the database connection from the managed state and wrap it in a collection.
    ///
    /// Panics iff the [`Database`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = req.guard::<&State<Database>>().await.unwrap();
        request::Outcome::Success(Coll::from_db(db))
    }
}

// Candidate collection.
const CANDIDATES: &str = "candidates";
impl MongoCollection for Candidate {
    const NAME: &'static str = CANDIDATES;
}
impl MongoCollection for NewCandidate {
    const NAME: &'static str = CANDIDATES;
}

// Endorsement collection.
const ENDORSEMENTS: &str = "endorsements";
impl MongoCollection for Endorsement {
    const NAME: &'static str = ENDORSEMENTS;
}
impl MongoCollection for NewEndorsement {
    const NAME: &'static str = ENDORSEMENTS;
}

// Voter preferences collection.
const VOTER_PREFERENCES: &str = "voter_preferences";
impl MongoCollection for VoterPreferences {
    const NAME: &'static str = VOTER_PREFERENCES;
}

// Issue reference data collection.
const ISSUES: &str = "issues";
impl MongoCollection for Issue {
    const NAME: &'static str = ISSUES;
}

// Daily profile metrics collection (written by the external collector).
const PROFILE_METRICS: &str = "profile_metrics";
impl MongoCollection for ProfileMetricsDay {
    const NAME: &'static str = PROFILE_METRICS;
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // At most one *active* endorsement per (voter, candidate) pair.
    // The partial index is what arbitrates concurrent endorse calls;
    // revoked endorsements stay behind as history and don't collide.
    let active_unique = IndexOptions::builder()
        .unique(true)
        .partial_filter_expression(doc! { "is_active": true })
        .build();
    let endorsement_index = IndexModel::builder()
        .keys(doc! { "voter_id": 1, "candidate_id": 1 })
        .options(active_unique)
        .build();
    Coll::<Endorsement>::from_db(db)
        .create_index(endorsement_index, None)
        .await?;

    // Candidate pool scans filter on status and range on endorsement_count.
    let candidate_index = IndexModel::builder()
        .keys(doc! { "status": 1, "endorsement_count": 1 })
        .build();
    Coll::<Candidate>::from_db(db)
        .create_index(candidate_index, None)
        .await?;

    // Trending window reads: equality on candidate, range on date.
    let metrics_index = IndexModel::builder()
        .keys(doc! { "candidate_id": 1, "date": 1 })
        .options(unique)
        .build();
    Coll::<ProfileMetricsDay>::from_db(db)
        .create_index(metrics_index, None)
        .await?;

    Ok(())
}
