//! The mongodb crate doesn't provide error code constants.
//! This module fills in the gaps.

use mongodb::error::{Error as DbError, ErrorKind, WriteFailure};

pub const DUPLICATE_KEY: i32 = 11000;

/// The server-side code of a write error, if the given error is one.
pub fn write_error_code(err: &DbError) -> Option<i32> {
    if let ErrorKind::Write(WriteFailure::WriteError(ref e)) = *err.kind {
        Some(e.code)
    } else {
        None
    }
}
