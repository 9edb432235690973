//! ICS feed parsing.
//!
//! Turns the text of a calendar subscription (RFC 5545) into `RawEvent`s.

mod parse;

pub use parse::parse_feed;
pub(crate) use parse::start_of_day;
