//! End-to-end tests
//!
//! Full sessions saved to bytes or files and loaded back, with scripts
//! holding references across the round trip.

mod identity;
