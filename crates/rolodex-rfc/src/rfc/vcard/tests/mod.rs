//! Document-level tests over realistic exports.

mod round_trip;
