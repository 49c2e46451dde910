//! Core identifiers, errors, and record encoding for Starbridge.
//!
//! This crate provides:
//! - [`BodyId`] - Generational body identifiers
//! - [`Error`] - Rich error types with context
//! - [`SerializationError`] - Failures of the tagged reference codec
//! - [`Writer`] / [`Reader`] - The newline-delimited record format used for saves

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entity;
pub mod error;
pub mod wire;

pub use entity::BodyId;
pub use error::{Error, ErrorContext, ErrorKind, SerializationError};
pub use wire::{Reader, Writer};

/// Result type alias using the Starbridge [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
