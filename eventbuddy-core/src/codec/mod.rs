//! Encoding helpers shared by the feed and backup surfaces.

pub mod csv;
pub mod dates;
