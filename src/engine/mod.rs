//! The alignment and ranking engine.
//!
//! The interactive pieces (scorer, feed assembly, endorsement ledger) are
//! invoked per request; the two batch jobs (cutoff elimination, trending
//! recompute) run as background passes and share nothing with the request
//! path except the persisted records.

pub mod alignment;
pub mod cutoff;
pub mod feed;
pub mod ledger;
pub mod trending;
