//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way and never
//! expose internal fields the client has no business seeing.

pub mod candidate;
pub mod feed;
pub mod pagination;
pub mod preferences;
