pub mod candidate;
pub mod endorsement;
pub mod issue;
pub mod metrics;
pub mod preferences;
