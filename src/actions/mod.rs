//! Request orchestration: each action takes the incoming session by value, drives the
//! services, and returns an [`Outcome`](crate::response::Outcome) describing the next session
//! and the response intent. Nothing here knows about HTTP.
//!
//! Store outages are the only errors that escape; every business outcome, including missing
//! records and rejected input, is expressed as an intent.

pub mod user;
pub mod work;

/// Parse a path id. Anything that is not a positive integer cannot name a record.
pub fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok().filter(|id| *id > 0)
}
