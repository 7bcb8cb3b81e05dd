use serde::{Deserialize, Serialize};

/// Issues are stable reference data, identified by a well-known slug
/// (e.g. `healthcare`) rather than a generated object ID.
pub type IssueId = String;

/// A political issue a voter can prioritise and a candidate can take a
/// position on. Immutable reference data, seeded outside this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: IssueId,
    pub category: String,
    /// Position in client-facing issue pickers.
    pub display_order: u32,
}
