//! Starbridge - Script-side entity handles for a space simulation
//!
//! This crate re-exports all layers of the Starbridge system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: starbridge_script     — Live handles, reference codec, Lua bindings, sessions, saves
//! Layer 1: starbridge_space      — Bodies, deletion signals, star systems, body index
//! Layer 0: starbridge_foundation — Core types (BodyId, Error, record Writer/Reader)
//! ```

pub use starbridge_foundation as foundation;
pub use starbridge_script as script;
pub use starbridge_space as space;
