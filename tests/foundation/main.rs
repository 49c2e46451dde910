//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: BodyId, Error, and the record Writer/Reader.

mod errors;
mod records;
