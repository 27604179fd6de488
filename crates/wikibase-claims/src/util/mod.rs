//! Utility modules for the claim codec.

pub mod datetime;

pub use datetime::{format_wire_time, parse_wire_time, DateTimeParseError, WireTime};
