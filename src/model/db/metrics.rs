use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// One day's engagement aggregate for one candidate.
///
/// Append-only, written by the external metrics collector; this service
/// only reads it when recomputing trending scores. The date serialises as
/// an ISO `YYYY-MM-DD` string, so range filters compare correctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMetricsDay {
    #[serde(rename = "_id")]
    pub id: Id,
    pub candidate_id: Id,
    pub date: NaiveDate,
    pub profile_views: u64,
    pub endorsements_received: u64,
}
